//! Clustering steps
//!
//! One round of distributed K-means splits into four steps:
//!
//! - [`assign`]: every worker maps its items to the nearest representative
//! - [`aggregate`]: every worker folds its shard into per-cluster partials
//! - [`reduce`]: the leader sums partials from all workers
//! - [`update`]: the leader derives the next representatives
//!
//! The first two run identically on the leader and every worker and are
//! bundled by [`local_round`].

pub mod aggregate;
pub mod assign;
pub mod reduce;
pub mod update;

pub use assign::Membership;
pub use reduce::Reduction;

use crate::model::ClusterModel;
use crate::Result;

/// Output of the local part of a round
#[derive(Debug, Clone)]
pub struct LocalRound<A> {
    pub membership: Membership,
    /// Exactly one partial per cluster
    pub partials: Vec<A>,
}

/// Assign and aggregate one shard against the current representatives
pub fn local_round<M: ClusterModel>(
    model: &M,
    shard: &[M::Item],
    representatives: &[M::Item],
) -> Result<LocalRound<M::Aggregate>> {
    let membership = assign::assign(model, shard, representatives)?;
    let partials = aggregate::aggregate(model, shard, &membership, representatives.len());
    Ok(LocalRound { membership, partials })
}
