//! In-process transport
//!
//! Connects the leader and P - 1 workers running as tasks in the same process.
//! The topology is a star: one channel per direction between the leader and
//! each worker, and no links between workers. A send completes once the
//! message is queued on the peer's link.

use super::protocol::Message;
use super::transport::{Transport, LEADER};
use crate::error::MeshError;
use crate::Result;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

/// One rank's end of the in-process star
#[derive(Debug)]
pub struct LocalTransport<I, A> {
    rank: usize,

    /// outboxes[dest], `None` where no link exists
    outboxes: Vec<Option<UnboundedSender<Message<I, A>>>>,

    /// inboxes[source], `None` where no link exists
    inboxes: Vec<Option<UnboundedReceiver<Message<I, A>>>>,
}

impl<I, A> LocalTransport<I, A> {
    /// Build the transports of all `workers` ranks, indexed by rank
    pub fn mesh(workers: usize) -> Vec<Self> {
        let mut transports: Vec<Self> = (0..workers)
            .map(|rank| Self {
                rank,
                outboxes: (0..workers).map(|_| None).collect(),
                inboxes: (0..workers).map(|_| None).collect(),
            })
            .collect();

        for worker in 1..workers {
            let (to_worker, from_leader) = unbounded_channel();
            let (to_leader, from_worker) = unbounded_channel();

            transports[LEADER].outboxes[worker] = Some(to_worker);
            transports[LEADER].inboxes[worker] = Some(from_worker);
            transports[worker].outboxes[LEADER] = Some(to_leader);
            transports[worker].inboxes[LEADER] = Some(from_leader);
        }

        transports
    }
}

fn no_link(rank: usize, peer: usize) -> anyhow::Error {
    MeshError::transport(format!("no link between rank {} and rank {}", rank, peer)).into()
}

impl<I: Send, A: Send> Transport<I, A> for LocalTransport<I, A> {
    fn rank(&self) -> usize {
        self.rank
    }

    async fn send(&mut self, dest: usize, message: Message<I, A>) -> Result<()> {
        let Some(Some(outbox)) = self.outboxes.get(dest) else {
            return Err(no_link(self.rank, dest));
        };
        outbox
            .send(message)
            .map_err(|_| MeshError::transport(format!("rank {} is gone", dest)))?;
        Ok(())
    }

    async fn recv(&mut self, source: usize) -> Result<Message<I, A>> {
        let rank = self.rank;
        let Some(Some(inbox)) = self.inboxes.get_mut(source) else {
            return Err(no_link(rank, source));
        };
        inbox.recv().await.ok_or_else(|| {
            MeshError::transport(format!("link from rank {} to rank {} closed", source, rank)).into()
        })
    }
}
