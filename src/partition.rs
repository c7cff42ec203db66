//! Partitioner
//!
//! Splits the item collection into one contiguous shard per worker and picks
//! the initial representatives. Runs once, on the leader, before round 1.
//!
//! Worker `r` owns `[r * shard_size, (r + 1) * shard_size)` with
//! `shard_size = N / P`. What happens to the `N % P` tail items depends on the
//! [`RemainderPolicy`]:
//!
//! - `Reject`: configuration error unless P divides N
//! - `Drop`: the tail is never processed
//! - `Last`: the last worker's range is extended to N

use crate::config::{RemainderPolicy, RunConfig};
use crate::error::MeshError;
use crate::model::ClusterModel;
use crate::Result;
use std::ops::Range;
use tracing::{info, warn};

/// Index ranges of every worker's shard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardPlan {
    ranges: Vec<Range<usize>>,
    dropped: usize,
}

impl ShardPlan {
    /// Compute shard ranges for `total` items over `workers` workers
    pub fn new(total: usize, workers: usize, policy: RemainderPolicy) -> Result<Self> {
        if workers == 0 {
            return Err(MeshError::config("workers must be at least 1").into());
        }

        let shard_size = total / workers;
        let remainder = total % workers;

        if shard_size == 0 {
            return Err(MeshError::config(format!(
                "{} items cannot fill {} worker shards",
                total, workers
            ))
            .into());
        }

        if remainder != 0 && policy == RemainderPolicy::Reject {
            return Err(MeshError::config(format!(
                "{} workers do not evenly divide {} items ({} left over); \
                 use --remainder drop or --remainder last",
                workers, total, remainder
            ))
            .into());
        }

        let mut ranges: Vec<Range<usize>> = (0..workers)
            .map(|rank| rank * shard_size..(rank + 1) * shard_size)
            .collect();

        let dropped = match policy {
            RemainderPolicy::Last => {
                if let Some(last) = ranges.last_mut() {
                    last.end = total;
                }
                0
            }
            _ => remainder,
        };

        Ok(Self { ranges, dropped })
    }

    /// Range owned by `rank`
    pub fn range(&self, rank: usize) -> Range<usize> {
        self.ranges[rank].clone()
    }

    pub fn ranges(&self) -> &[Range<usize>] {
        &self.ranges
    }

    pub fn workers(&self) -> usize {
        self.ranges.len()
    }

    /// Items no shard covers
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Items covered by some shard
    pub fn processed(&self) -> usize {
        self.ranges.last().map(|r| r.end).unwrap_or(0)
    }
}

/// Result of partitioning: per-worker shards plus the initial representatives
#[derive(Debug, Clone)]
pub struct Partition<I> {
    /// `shards[r]` is owned by rank `r`
    pub shards: Vec<Vec<I>>,
    /// K initial representatives
    pub representatives: Vec<I>,
    /// Items left unprocessed by the remainder policy
    pub dropped: usize,
}

/// Split `items` into shards and seed the representatives
///
/// `items` must already be trimmed to the run's item count; seeding looks at
/// the whole collection, including any tail the shards do not cover.
pub fn partition<M: ClusterModel>(
    model: &M,
    items: Vec<M::Item>,
    run: &RunConfig,
) -> Result<Partition<M::Item>> {
    if items.len() < run.clusters || run.clusters == 0 {
        return Err(MeshError::config(format!(
            "cannot seed {} clusters from {} items",
            run.clusters,
            items.len()
        ))
        .into());
    }

    let plan = ShardPlan::new(items.len(), run.workers, run.remainder)?;
    let representatives = model.seed(&items, run.clusters);

    if plan.dropped() > 0 {
        warn!(
            dropped = plan.dropped(),
            total = items.len(),
            "remainder items are not assigned to any shard"
        );
    }

    let mut remaining = items;
    remaining.truncate(plan.processed());

    // Split back to front so each shard is a single move out of the vector
    let mut shards = Vec::with_capacity(plan.workers());
    for range in plan.ranges().iter().rev() {
        shards.push(remaining.split_off(range.start));
    }
    shards.reverse();

    info!(
        workers = plan.workers(),
        clusters = run.clusters,
        processed = plan.processed(),
        "partitioned dataset"
    );

    Ok(Partition {
        shards,
        representatives,
        dropped: plan.dropped(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Point, PointModel, Strand, StrandModel};

    fn points(n: usize) -> Vec<Point> {
        (0..n).map(|i| Point::new(i as f64, 0.0)).collect()
    }

    fn run(workers: usize, clusters: usize, remainder: RemainderPolicy) -> RunConfig {
        RunConfig {
            workers,
            clusters,
            remainder,
            ..RunConfig::default()
        }
    }

    #[test]
    fn test_even_split() {
        let plan = ShardPlan::new(12, 3, RemainderPolicy::Reject).unwrap();
        assert_eq!(plan.ranges(), &[0..4, 4..8, 8..12]);
        assert_eq!(plan.dropped(), 0);
        assert_eq!(plan.processed(), 12);
    }

    #[test]
    fn test_reject_uneven() {
        let err = ShardPlan::new(10, 3, RemainderPolicy::Reject).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<MeshError>(),
            Some(MeshError::Configuration(_))
        ));
    }

    #[test]
    fn test_drop_uneven() {
        let plan = ShardPlan::new(10, 3, RemainderPolicy::Drop).unwrap();
        assert_eq!(plan.ranges(), &[0..3, 3..6, 6..9]);
        assert_eq!(plan.dropped(), 1);
        assert_eq!(plan.processed(), 9);
    }

    #[test]
    fn test_last_absorbs_remainder() {
        let plan = ShardPlan::new(10, 3, RemainderPolicy::Last).unwrap();
        assert_eq!(plan.ranges(), &[0..3, 3..6, 6..10]);
        assert_eq!(plan.dropped(), 0);
    }

    #[test]
    fn test_more_workers_than_items() {
        assert!(ShardPlan::new(2, 3, RemainderPolicy::Last).is_err());
    }

    #[test]
    fn test_partition_points() {
        let part = partition(&PointModel, points(6), &run(2, 2, RemainderPolicy::Reject)).unwrap();
        assert_eq!(part.shards.len(), 2);
        assert_eq!(part.shards[0], points(3));
        assert_eq!(part.shards[1], points(6)[3..].to_vec());
        assert_eq!(part.representatives, points(2));
    }

    #[test]
    fn test_partition_drop_keeps_seeds_from_full_collection() {
        let part = partition(&PointModel, points(7), &run(2, 7, RemainderPolicy::Drop)).unwrap();
        assert_eq!(part.dropped, 1);
        assert_eq!(part.shards.iter().map(Vec::len).sum::<usize>(), 6);
        assert_eq!(part.representatives.len(), 7);
    }

    #[test]
    fn test_partition_strands_seeds_block_middles() {
        let items: Vec<Strand> = ["aaaa", "aaat", "aaac", "gggg", "gggt", "gggc"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();
        let mut config = run(3, 2, RemainderPolicy::Reject);
        config.kind = crate::model::ItemKind::Strands;
        config.strand_length = 4;

        let part = partition(&StrandModel::new(4), items.clone(), &config).unwrap();
        assert_eq!(part.representatives, vec![items[1].clone(), items[4].clone()]);
        assert_eq!(part.shards[2], items[4..].to_vec());
    }

    #[test]
    fn test_partition_too_few_items() {
        assert!(partition(&PointModel, points(1), &run(1, 2, RemainderPolicy::Reject)).is_err());
    }
}
