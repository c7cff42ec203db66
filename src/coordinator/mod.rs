//! Round coordinator
//!
//! Drives the fixed number of synchronous rounds. Every round walks the same
//! states:
//!
//! ```text
//! Init → Distributing → LocalComputing → Reducing → Updating ─┐
//!             ↑                                                │
//!             └──────────────── next round ────────────────────┤
//!                                                              ↓
//!                                                             Done
//! ```
//!
//! The leader is rank 0 of the worker set: [`Leader`] composes the same
//! [`ShardWorker`] every [`Worker`] uses for its own shard with the
//! coordination duties (partitioning, reduction, update). There is no
//! convergence test; a run always performs exactly `rounds` rounds.

pub mod leader;
pub mod worker;

pub use leader::Leader;
pub use worker::{Worker, WorkerSummary};

use crate::cluster::{local_round, LocalRound};
use crate::model::{ClusterModel, ItemKind};
use crate::Result;
use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Coordinator state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundState {
    Init,
    Distributing,
    LocalComputing,
    Reducing,
    Updating,
    Done,
}

impl fmt::Display for RoundState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Init => "init",
            Self::Distributing => "distributing",
            Self::LocalComputing => "local-computing",
            Self::Reducing => "reducing",
            Self::Updating => "updating",
            Self::Done => "done",
        };
        write!(f, "{}", name)
    }
}

/// Per-round record kept by the leader
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoundSummary {
    /// Round number, starting at 0
    pub round: usize,
    /// Global member count of every cluster
    pub cluster_sizes: Vec<u64>,
}

/// What the leader hands to the result reporter after `Done`
#[derive(Debug, Clone)]
pub struct RunOutcome<I> {
    pub kind: ItemKind,

    /// Final representatives, in cluster order
    pub representatives: Vec<I>,

    /// Rounds performed
    pub rounds: usize,

    pub history: Vec<RoundSummary>,

    /// Wall-clock time from partitioning to the last update, plus dataset
    /// load time once [`RunOutcome::add_load_time`] is applied
    pub elapsed: Duration,

    /// Items covered by some shard
    pub items_processed: usize,

    /// Items left out by the remainder policy
    pub items_dropped: usize,

    /// P, leader included
    pub workers: usize,
}

impl<I> RunOutcome<I> {
    /// Count the time spent reading the dataset as part of the run
    pub fn add_load_time(&mut self, load: Duration) {
        self.elapsed += load;
    }
}

/// Local compute capability: one shard and the model to cluster it with
#[derive(Debug)]
pub struct ShardWorker<M: ClusterModel> {
    model: M,
    shard: Vec<M::Item>,
}

impl<M: ClusterModel> ShardWorker<M> {
    pub fn new(model: M, shard: Vec<M::Item>) -> Self {
        Self { model, shard }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn shard(&self) -> &[M::Item] {
        &self.shard
    }

    pub fn set_shard(&mut self, shard: Vec<M::Item>) {
        self.shard = shard;
    }

    /// Assign and aggregate the shard against `representatives`
    pub fn compute(&self, representatives: &[M::Item]) -> Result<LocalRound<M::Aggregate>> {
        local_round(&self.model, &self.shard, representatives)
    }
}
