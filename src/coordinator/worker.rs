//! Worker (ranks 1..P)
//!
//! Receives its shard and the run configuration once, then for every round
//! waits for the representatives, clusters its shard and sends one partial
//! aggregate per cluster back to the leader.

use super::{RoundState, ShardWorker};
use crate::config::validator::validate_run;
use crate::distributed::protocol::{Message, PartialMessage, ShardMessage, Tag};
use crate::distributed::transport::{notify_abort, unexpected, Transport, LEADER};
use crate::error::MeshError;
use crate::model::{ClusterModel, ItemKind};
use crate::Result;
use std::marker::PhantomData;
use tracing::{debug, info};

/// What a worker did, for its own log line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerSummary {
    pub rank: usize,
    /// Size of the shard this worker owned
    pub items: usize,
    pub rounds: usize,
}

/// Worker role
///
/// The model is built from the configuration that arrives with the shard, so
/// a worker only needs to know which item kind it was compiled for.
pub struct Worker<M: ClusterModel, T> {
    transport: T,
    state: RoundState,
    _model: PhantomData<fn() -> M>,
}

impl<M, T> Worker<M, T>
where
    M: ClusterModel,
    T: Transport<M::Item, M::Aggregate>,
{
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            state: RoundState::Init,
            _model: PhantomData,
        }
    }

    pub fn state(&self) -> RoundState {
        self.state
    }

    /// Serve the leader until all rounds are done
    ///
    /// On failure the leader is sent a best-effort abort notice.
    pub async fn run(mut self) -> Result<WorkerSummary> {
        let result = self.drive().await;

        if let Err(e) = &result {
            notify_abort(&mut self.transport, LEADER, e).await;
        }

        result
    }

    async fn drive(&mut self) -> Result<WorkerSummary> {
        let rank = self.transport.rank();

        // Init
        let ShardMessage {
            rank: addressed,
            config,
            items,
        } = match self.transport.recv(LEADER).await? {
            Message::Shard(shard) => shard,
            other => return Err(unexpected(Tag::Shard, LEADER, other)),
        };

        if addressed != rank {
            return Err(MeshError::Protocol {
                expected: format!("SHARD for rank {}", rank),
                got: format!("SHARD for rank {}", addressed),
            }
            .into());
        }
        validate_run(&config)?;

        let model = M::from_run(&config);
        if model.kind() != config.kind {
            return Err(mismatched_kind(model.kind(), config.kind));
        }
        for item in &items {
            model.check_item(item)?;
        }

        info!(rank, items = items.len(), rounds = config.rounds, "received shard");
        let shard_len = items.len();
        let local = ShardWorker::new(model, items);

        for round in 0..config.rounds {
            self.enter(RoundState::Distributing, round);
            let representatives = match self.transport.recv(LEADER).await? {
                Message::Representatives(reps) => {
                    if reps.round != round {
                        return Err(MeshError::Protocol {
                            expected: format!("REPRESENTATIVES for round {}", round),
                            got: format!("round {}", reps.round),
                        }
                        .into());
                    }
                    reps.representatives
                }
                other => return Err(unexpected(Tag::Representatives, LEADER, other)),
            };
            if representatives.len() != config.clusters {
                return Err(MeshError::Protocol {
                    expected: format!("{} representatives", config.clusters),
                    got: representatives.len().to_string(),
                }
                .into());
            }
            for representative in &representatives {
                local.model().check_item(representative)?;
            }

            self.enter(RoundState::LocalComputing, round);
            let computed = local.compute(&representatives)?;

            self.enter(RoundState::Reducing, round);
            for (cluster, aggregate) in computed.partials.into_iter().enumerate() {
                let message = Message::Partial(PartialMessage {
                    round,
                    cluster,
                    aggregate,
                });
                self.transport.send(LEADER, message).await?;
            }
        }

        self.state = RoundState::Done;
        debug!(rank, "worker done");

        Ok(WorkerSummary {
            rank,
            items: shard_len,
            rounds: config.rounds,
        })
    }

    fn enter(&mut self, state: RoundState, round: usize) {
        debug!(round, from = %self.state, to = %state, "worker state");
        self.state = state;
    }
}

fn mismatched_kind(local: ItemKind, leader: ItemKind) -> anyhow::Error {
    MeshError::config(format!(
        "leader is clustering {} but this worker was started for {}",
        leader, local
    ))
    .into()
}
