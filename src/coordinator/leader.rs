//! Leader (rank 0)
//!
//! Partitions the dataset, ships every worker its shard, then runs the
//! rounds: send representatives to each worker in rank order, cluster its own
//! shard, collect K partials from every worker, reduce, update.

use super::{RoundState, RoundSummary, RunOutcome, ShardWorker};
use crate::cluster::reduce::cluster_sizes;
use crate::cluster::update::update_representatives;
use crate::cluster::Reduction;
use crate::config::RunConfig;
use crate::distributed::protocol::{Message, RepresentativesMessage, ShardMessage, Tag};
use crate::distributed::transport::{notify_abort, unexpected, Transport, LEADER};
use crate::error::MeshError;
use crate::model::ClusterModel;
use crate::partition::{partition, Partition};
use crate::Result;
use std::time::Instant;
use tracing::{debug, info};

/// Coordinator role of rank 0, plus its own shard
pub struct Leader<M: ClusterModel, T> {
    run: RunConfig,
    local: ShardWorker<M>,
    transport: T,
    state: RoundState,
}

impl<M, T> Leader<M, T>
where
    M: ClusterModel,
    T: Transport<M::Item, M::Aggregate>,
{
    /// Create the leader
    ///
    /// `run` must already be validated and its `workers` must match the
    /// number of ranks reachable through `transport`.
    pub fn new(model: M, run: RunConfig, transport: T) -> Self {
        Self {
            run,
            local: ShardWorker::new(model, Vec::new()),
            transport,
            state: RoundState::Init,
        }
    }

    pub fn state(&self) -> RoundState {
        self.state
    }

    /// Cluster `items` (already trimmed to N) across all workers
    ///
    /// On failure every worker is sent a best-effort abort notice.
    pub async fn run(mut self, items: Vec<M::Item>) -> Result<RunOutcome<M::Item>> {
        let result = self.drive(items).await;

        if let Err(e) = &result {
            for rank in 1..self.run.workers {
                notify_abort(&mut self.transport, rank, e).await;
            }
        }

        result
    }

    async fn drive(&mut self, items: Vec<M::Item>) -> Result<RunOutcome<M::Item>> {
        if self.transport.rank() != LEADER {
            return Err(MeshError::config(format!(
                "leader must run as rank {}, not {}",
                LEADER,
                self.transport.rank()
            ))
            .into());
        }

        for item in &items {
            self.local.model().check_item(item)?;
        }

        let start = Instant::now();
        let workers = self.run.workers;
        let clusters = self.run.clusters;

        // Init
        let Partition {
            shards,
            representatives,
            dropped,
        } = partition(self.local.model(), items, &self.run)?;
        let processed: usize = shards.iter().map(Vec::len).sum();

        for (rank, shard) in shards.into_iter().enumerate() {
            if rank == LEADER {
                self.local.set_shard(shard);
                continue;
            }
            debug!(rank, items = shard.len(), "sending shard");
            let message = Message::Shard(ShardMessage {
                rank,
                config: self.run.clone(),
                items: shard,
            });
            self.transport.send(rank, message).await?;
        }

        let mut representatives = representatives;
        let mut history = Vec::with_capacity(self.run.rounds);

        for round in 0..self.run.rounds {
            self.enter(RoundState::Distributing, round);
            for rank in 1..workers {
                let message = Message::Representatives(RepresentativesMessage {
                    round,
                    representatives: representatives.clone(),
                });
                self.transport.send(rank, message).await?;
            }

            self.enter(RoundState::LocalComputing, round);
            let local = self.local.compute(&representatives)?;

            self.enter(RoundState::Reducing, round);
            let mut reduction = Reduction::new(self.local.model(), round, workers, local.partials);
            for rank in 1..workers {
                for _ in 0..clusters {
                    let partial = match self.transport.recv(rank).await? {
                        Message::Partial(partial) => partial,
                        other => return Err(unexpected(Tag::Partial, rank, other)),
                    };
                    if partial.round != round {
                        return Err(MeshError::Protocol {
                            expected: format!("PARTIAL for round {}", round),
                            got: format!("round {} from rank {}", partial.round, rank),
                        }
                        .into());
                    }
                    reduction.absorb(rank, partial.cluster, partial.aggregate)?;
                }
            }
            let global = reduction.finish()?;
            let sizes = cluster_sizes(self.local.model(), &global);
            debug!(round, sizes = ?sizes, "reduced partial aggregates");

            self.enter(RoundState::Updating, round);
            representatives = update_representatives(self.local.model(), &global, &representatives)?;
            history.push(RoundSummary {
                round,
                cluster_sizes: sizes,
            });
            info!(round, of = self.run.rounds, "round complete");
        }

        self.state = RoundState::Done;
        let elapsed = start.elapsed();
        info!(elapsed_ms = elapsed.as_millis() as u64, "run complete");

        Ok(RunOutcome {
            kind: self.local.model().kind(),
            representatives,
            rounds: self.run.rounds,
            history,
            elapsed,
            items_processed: processed,
            items_dropped: dropped,
            workers,
        })
    }

    fn enter(&mut self, state: RoundState, round: usize) {
        debug!(round, from = %self.state, to = %state, "leader state");
        self.state = state;
    }
}
