//! Local Aggregator
//!
//! Folds a shard into one partial statistic per cluster. Every cluster gets
//! an aggregate, including clusters with no local members, so the leader can
//! always expect exactly K contributions from each worker.

use super::assign::Membership;
use crate::model::ClusterModel;

/// Per-cluster partial aggregates of one shard
pub fn aggregate<M: ClusterModel>(
    model: &M,
    shard: &[M::Item],
    membership: &Membership,
    clusters: usize,
) -> Vec<M::Aggregate> {
    debug_assert_eq!(shard.len(), membership.len());

    let mut partials: Vec<M::Aggregate> = (0..clusters).map(|_| model.empty_aggregate()).collect();
    for (item, &k) in shard.iter().zip(membership.as_slice()) {
        model.accumulate(&mut partials[k], item);
    }
    partials
}
