//! Run wiring
//!
//! Puts a leader and its workers on a transport:
//!
//! - [`run_standalone`]: every rank is a tokio task in this process, linked by
//!   [`LocalTransport`]. With one worker no messages are sent at all.
//! - [`run_leader`] / [`run_worker`]: one process per rank over TCP.

use crate::config::validator::validate_run;
use crate::config::RunConfig;
use crate::coordinator::{Leader, RunOutcome, Worker, WorkerSummary};
use crate::distributed::{LocalTransport, TcpTransport};
use crate::error::MeshError;
use crate::model::ClusterModel;
use crate::Result;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Run all ranks in this process
pub async fn run_standalone<M: ClusterModel>(run: RunConfig, items: Vec<M::Item>) -> Result<RunOutcome<M::Item>> {
    validate_run(&run)?;

    let mut mesh = LocalTransport::<M::Item, M::Aggregate>::mesh(run.workers);
    let workers: Vec<_> = mesh
        .drain(1..)
        .map(|transport| tokio::spawn(Worker::<M, _>::new(transport).run()))
        .collect();
    let transport = mesh
        .pop()
        .ok_or_else(|| MeshError::config("workers must be at least 1"))?;

    info!(workers = run.workers, clusters = run.clusters, rounds = run.rounds, "starting standalone run");
    let outcome = Leader::new(M::from_run(&run), run, transport).run(items).await;

    let mut worker_error = None;
    for handle in workers {
        let joined = handle
            .await
            .map_err(|e| anyhow::Error::from(MeshError::transport(format!("worker task failed: {}", e))))
            .and_then(|result| result);
        match joined {
            Ok(summary) => info!(rank = summary.rank, items = summary.items, "worker finished"),
            Err(e) => {
                if outcome.is_ok() {
                    warn!(error = %e, "worker failed after the leader finished");
                }
                worker_error.get_or_insert(e);
            }
        }
    }

    // The leader's error names the failing rank, so it wins
    let outcome = outcome?;
    match worker_error {
        Some(e) => Err(e),
        None => Ok(outcome),
    }
}

/// Lead a multi-process run: wait for every worker to join on `listener`
pub async fn run_leader<M>(listener: TcpListener, run: RunConfig, items: Vec<M::Item>) -> Result<RunOutcome<M::Item>>
where
    M: ClusterModel,
{
    validate_run(&run)?;

    if let Ok(addr) = listener.local_addr() {
        info!(%addr, workers = run.workers - 1, "waiting for workers");
    }
    let transport = TcpTransport::<M::Item, M::Aggregate>::accept_workers(&listener, run.workers).await?;

    Leader::new(M::from_run(&run), run, transport).run(items).await
}

/// Serve as worker `rank` of the leader at `leader`
pub async fn run_worker<M: ClusterModel>(leader: &str, rank: usize) -> Result<WorkerSummary> {
    let transport = TcpTransport::<M::Item, M::Aggregate>::connect(leader.to_string(), rank).await?;
    info!(rank, leader, "joined leader");

    Worker::<M, _>::new(transport).run().await
}
