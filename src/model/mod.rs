//! Cluster models
//!
//! meshmeans clusters two kinds of items that share one coordination skeleton
//! but reduce differently:
//!
//! - **Points** ([`point::PointModel`]): 2-D coordinates, Euclidean distance,
//!   per-cluster `(sum_x, sum_y, count)` aggregates, arithmetic-mean update.
//! - **Strands** ([`strand::StrandModel`]): fixed-length `a/t/c/g` sequences,
//!   Hamming distance, per-position symbol frequency aggregates, plurality-vote
//!   update with a fixed tie-break precedence.
//!
//! # The `ClusterModel` trait
//!
//! The trait is the seam between the coordinator (which only moves items,
//! representatives and aggregates around) and the math. Aggregates form a
//! commutative monoid under [`ClusterModel::merge`] with
//! [`ClusterModel::empty_aggregate`] as identity, so the leader may combine
//! worker contributions in any order.

pub mod point;
pub mod strand;

use crate::config::RunConfig;
use crate::Result;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use point::{Point, PointModel, PointSums};
pub use strand::{Strand, StrandCounts, StrandModel, Symbol, SymbolCounts};

/// Item type of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    /// 2-D coordinates (`x,y` per line)
    Points,
    /// Fixed-length DNA strands (`acgt...` per line)
    Strands,
}

impl Default for ItemKind {
    fn default() -> Self {
        Self::Points
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Points => write!(f, "points"),
            Self::Strands => write!(f, "strands"),
        }
    }
}

/// Distance, aggregation and update rules for one item type
pub trait ClusterModel: Send + Sync + 'static {
    /// Dataset item, also the shape of a representative
    type Item: Clone + fmt::Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static;

    /// Per-cluster partial statistic
    type Aggregate: Clone + fmt::Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static;

    /// Distance value; only compared, never summed
    type Distance: PartialOrd + Copy + fmt::Debug;

    /// Build the model described by a run configuration
    fn from_run(run: &RunConfig) -> Self
    where
        Self: Sized;

    /// Which item kind this model handles
    fn kind(&self) -> ItemKind;

    /// Distance between an item and a representative
    fn distance(&self, item: &Self::Item, representative: &Self::Item) -> Self::Distance;

    /// Zero-valued aggregate (a cluster with no members)
    fn empty_aggregate(&self) -> Self::Aggregate;

    /// Add one member item to an aggregate
    fn accumulate(&self, aggregate: &mut Self::Aggregate, item: &Self::Item);

    /// Element-wise sum `into += other`
    ///
    /// Fails if the two aggregates have different shapes (a peer configured
    /// with another strand length).
    fn merge(&self, into: &mut Self::Aggregate, other: &Self::Aggregate) -> Result<()>;

    /// Number of member items an aggregate was built from
    fn member_count(&self, aggregate: &Self::Aggregate) -> u64;

    /// Derive the next representative from a global aggregate
    ///
    /// An aggregate with zero members yields `previous` unchanged.
    fn update(&self, aggregate: &Self::Aggregate, previous: &Self::Item) -> Self::Item;

    /// Pick the initial `clusters` representatives from the full collection
    ///
    /// Callers guarantee `1 <= clusters <= items.len()`.
    fn seed(&self, items: &[Self::Item], clusters: usize) -> Vec<Self::Item>;

    /// Check an item that arrived from outside (loader or wire)
    fn check_item(&self, item: &Self::Item) -> Result<()>;
}
