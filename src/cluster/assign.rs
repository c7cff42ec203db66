//! Local Assigner
//!
//! Maps every item of a shard to its nearest representative. Ties go to the
//! lowest cluster index: a later representative only wins when it is strictly
//! closer.

use crate::error::MeshError;
use crate::model::ClusterModel;
use crate::Result;
use rayon::prelude::*;

/// Cluster index of every local item, in shard order
///
/// Recomputed from scratch every round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Membership(Vec<usize>);

impl Membership {
    pub fn new(clusters: Vec<usize>) -> Self {
        Self(clusters)
    }

    /// Cluster of local item `i`
    pub fn cluster_of(&self, i: usize) -> usize {
        self.0[i]
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Member count per cluster
    pub fn sizes(&self, clusters: usize) -> Vec<u64> {
        let mut sizes = vec![0u64; clusters];
        for &k in &self.0 {
            sizes[k] += 1;
        }
        sizes
    }
}

/// Index of the representative nearest to `item`
///
/// Returns `None` only when `representatives` is empty.
pub fn nearest<M: ClusterModel>(model: &M, item: &M::Item, representatives: &[M::Item]) -> Option<usize> {
    let mut reps = representatives.iter().enumerate();
    let (_, first) = reps.next()?;

    let mut best = 0;
    let mut best_distance = model.distance(item, first);
    for (k, rep) in reps {
        let d = model.distance(item, rep);
        if d < best_distance {
            best = k;
            best_distance = d;
        }
    }
    Some(best)
}

/// Assign every shard item to its nearest representative
///
/// Items are independent, so the search runs on the rayon pool; the result
/// is in shard order regardless of scheduling.
pub fn assign<M: ClusterModel>(model: &M, shard: &[M::Item], representatives: &[M::Item]) -> Result<Membership> {
    if representatives.is_empty() {
        return Err(MeshError::Protocol {
            expected: "at least one representative".to_string(),
            got: "none".to_string(),
        }
        .into());
    }

    let clusters = shard
        .par_iter()
        .map(|item| nearest(model, item, representatives).unwrap_or(0))
        .collect();

    Ok(Membership(clusters))
}
