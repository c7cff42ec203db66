//! Reducer (leader only)
//!
//! Collects per-cluster partial aggregates from every worker and sums them
//! into the global aggregate of each cluster.
//!
//! # Matching
//!
//! Every contribution is keyed by `(rank, cluster)`. A round is complete
//! once the leader's own K partials plus `(P - 1) × K` worker partials have
//! been absorbed; duplicates and out-of-range keys are protocol errors.
//!
//! Contributions are stored, not summed on arrival, and merged in rank order
//! by [`Reduction::finish`]. Floating-point sums therefore do not depend on
//! the order in which workers' messages happened to arrive.

use crate::error::MeshError;
use crate::model::ClusterModel;
use crate::Result;

/// Reduction state for one round
#[derive(Debug)]
pub struct Reduction<'m, M: ClusterModel> {
    model: &'m M,

    /// Round this reduction belongs to (for error messages)
    round: usize,

    /// contributions[rank][cluster]
    contributions: Vec<Vec<Option<M::Aggregate>>>,

    /// Worker partials still expected
    pending: usize,
}

impl<'m, M: ClusterModel> Reduction<'m, M> {
    /// Start a round's reduction from the leader's own partials
    ///
    /// # Arguments
    ///
    /// * `workers` - P, leader included
    /// * `own` - the leader's K partial aggregates (rank 0)
    pub fn new(model: &'m M, round: usize, workers: usize, own: Vec<M::Aggregate>) -> Self {
        let clusters = own.len();
        let mut contributions = Vec::with_capacity(workers);
        contributions.push(own.into_iter().map(Some).collect());
        for _ in 1..workers {
            contributions.push(vec![None; clusters]);
        }

        Self {
            model,
            round,
            contributions,
            pending: workers.saturating_sub(1) * clusters,
        }
    }

    pub fn clusters(&self) -> usize {
        self.contributions[0].len()
    }

    pub fn workers(&self) -> usize {
        self.contributions.len()
    }

    /// Number of worker partials not yet received
    pub fn pending(&self) -> usize {
        self.pending
    }

    pub fn is_complete(&self) -> bool {
        self.pending == 0
    }

    /// Record the partial aggregate of `cluster` sent by worker `rank`
    pub fn absorb(&mut self, rank: usize, cluster: usize, aggregate: M::Aggregate) -> Result<()> {
        let clusters = self.clusters();
        if rank == 0 || rank >= self.workers() {
            return Err(MeshError::Protocol {
                expected: format!("partial from a worker rank in 1..{}", self.workers()),
                got: format!("rank {}", rank),
            }
            .into());
        }
        if cluster >= clusters {
            return Err(MeshError::Protocol {
                expected: format!("cluster index below {}", clusters),
                got: format!("cluster {} from rank {}", cluster, rank),
            }
            .into());
        }

        let slot = &mut self.contributions[rank][cluster];
        if slot.is_some() {
            return Err(MeshError::Protocol {
                expected: format!("one partial per cluster in round {}", self.round),
                got: format!("duplicate partial for cluster {} from rank {}", cluster, rank),
            }
            .into());
        }

        *slot = Some(aggregate);
        self.pending -= 1;
        Ok(())
    }

    /// Sum all contributions into one global aggregate per cluster
    ///
    /// Fails if any `(rank, cluster)` contribution is missing.
    pub fn finish(self) -> Result<Vec<M::Aggregate>> {
        if self.pending > 0 {
            return Err(MeshError::Protocol {
                expected: format!("all worker partials for round {}", self.round),
                got: format!("{} missing", self.pending),
            }
            .into());
        }

        let clusters = self.clusters();
        let mut global: Vec<M::Aggregate> = (0..clusters).map(|_| self.model.empty_aggregate()).collect();
        for per_rank in &self.contributions {
            for (total, partial) in global.iter_mut().zip(per_rank) {
                if let Some(partial) = partial {
                    self.model.merge(total, partial)?;
                }
            }
        }
        Ok(global)
    }
}

/// Member count of every cluster in a global aggregate
pub fn cluster_sizes<M: ClusterModel>(model: &M, global: &[M::Aggregate]) -> Vec<u64> {
    global.iter().map(|agg| model.member_count(agg)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PointModel, PointSums};

    fn sums(x: f64, y: f64, count: u64) -> PointSums {
        PointSums { sum_x: x, sum_y: y, count }
    }

    #[test]
    fn test_single_worker_is_complete() {
        let own = vec![sums(1.0, 2.0, 1)];
        let reduction = Reduction::new(&PointModel, 0, 1, own.clone());
        assert!(reduction.is_complete());
        assert_eq!(reduction.finish().unwrap(), own);
    }

    #[test]
    fn test_sum_across_workers() {
        let mut reduction = Reduction::new(&PointModel, 0, 3, vec![sums(1.0, 1.0, 1), sums(0.0, 0.0, 0)]);
        assert_eq!(reduction.pending(), 4);

        reduction.absorb(2, 1, sums(5.0, 5.0, 2)).unwrap();
        reduction.absorb(1, 0, sums(2.0, 3.0, 2)).unwrap();
        reduction.absorb(2, 0, sums(0.0, 0.0, 0)).unwrap();
        assert!(!reduction.is_complete());
        reduction.absorb(1, 1, sums(1.0, 1.0, 1)).unwrap();
        assert!(reduction.is_complete());

        let global = reduction.finish().unwrap();
        assert_eq!(global, vec![sums(3.0, 4.0, 3), sums(6.0, 6.0, 3)]);
        assert_eq!(cluster_sizes(&PointModel, &global), vec![3, 3]);
    }

    #[test]
    fn test_rejects_duplicates_and_bad_keys() {
        let mut reduction = Reduction::new(&PointModel, 2, 2, vec![sums(0.0, 0.0, 0)]);

        assert!(reduction.absorb(0, 0, sums(0.0, 0.0, 0)).is_err());
        assert!(reduction.absorb(2, 0, sums(0.0, 0.0, 0)).is_err());
        assert!(reduction.absorb(1, 1, sums(0.0, 0.0, 0)).is_err());

        reduction.absorb(1, 0, sums(1.0, 1.0, 1)).unwrap();
        let err = reduction.absorb(1, 0, sums(1.0, 1.0, 1)).unwrap_err();
        assert!(err.downcast_ref::<MeshError>().unwrap().is_transport());
    }

    #[test]
    fn test_finish_incomplete() {
        let reduction = Reduction::new(&PointModel, 0, 2, vec![sums(0.0, 0.0, 0)]);
        assert!(reduction.finish().is_err());
    }

    #[test]
    fn test_arrival_order_does_not_matter() {
        let parts = [sums(0.1, 0.2, 1), sums(0.7, 1e16, 1), sums(0.3, -1e16, 1)];

        let mut forward = Reduction::new(&PointModel, 0, 4, vec![sums(0.0, 0.0, 0)]);
        for (i, p) in parts.iter().enumerate() {
            forward.absorb(i + 1, 0, *p).unwrap();
        }
        let mut backward = Reduction::new(&PointModel, 0, 4, vec![sums(0.0, 0.0, 0)]);
        for (i, p) in parts.iter().enumerate().rev() {
            backward.absorb(i + 1, 0, *p).unwrap();
        }

        assert_eq!(forward.finish().unwrap(), backward.finish().unwrap());
    }
}
