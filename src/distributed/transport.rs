//! Point-to-point transport abstraction
//!
//! The round coordinator only needs blocking-style send and receive between
//! two ranks. Both operations are `async`, but from the coordinator's point of
//! view each call completes only when the message has been handed to the peer
//! link (send) or has fully arrived (receive). There are no timeouts: a
//! missing message waits forever.
//!
//! Links are point-to-point and per-pair ordered. The leader addresses every
//! worker individually; there is no broadcast.

use super::protocol::{ErrorMessage, Message, Tag};
use crate::error::MeshError;
use crate::Result;
use std::future::Future;

/// Rank of the leader
pub const LEADER: usize = 0;

/// Blocking point-to-point message passing between ranks
pub trait Transport<I, A>: Send {
    /// This process's rank
    fn rank(&self) -> usize;

    /// Send `message` to `dest`
    fn send(&mut self, dest: usize, message: Message<I, A>) -> impl Future<Output = Result<()>> + Send;

    /// Receive the next message from `source`
    fn recv(&mut self, source: usize) -> impl Future<Output = Result<Message<I, A>>> + Send;
}

/// Error for a message from `source` that is not the expected `tag`
///
/// An `Error` message from the peer becomes a transport error naming the
/// peer; any other unexpected message is a protocol error.
pub fn unexpected<I, A>(tag: Tag, source: usize, got: Message<I, A>) -> anyhow::Error {
    match got {
        Message::Error(err) => MeshError::transport(format!("rank {} aborted: {}", err.rank, err.error)).into(),
        other => MeshError::Protocol {
            expected: format!("{} from rank {}", tag, source),
            got: other.tag().to_string(),
        }
        .into(),
    }
}

/// Tell `dest` this rank is aborting, ignoring delivery failures
pub async fn notify_abort<T, I, A>(transport: &mut T, dest: usize, error: &anyhow::Error)
where
    T: Transport<I, A>,
{
    let message = Message::Error(ErrorMessage {
        rank: transport.rank(),
        error: format!("{:#}", error),
    });
    if let Err(e) = transport.send(dest, message).await {
        tracing::debug!(dest, error = %e, "could not deliver abort notice");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distributed::protocol::JoinMessage;
    use crate::model::{Point, PointSums};

    type PointMessage = Message<Point, PointSums>;

    #[test]
    fn test_unexpected_error_message_is_transport() {
        let got: PointMessage = Message::Error(ErrorMessage {
            rank: 3,
            error: "disk full".to_string(),
        });
        let err = unexpected(Tag::Partial, 3, got);
        let mesh = err.downcast_ref::<MeshError>().unwrap();
        assert!(matches!(mesh, MeshError::Transport(msg) if msg.contains("rank 3")));
    }

    #[test]
    fn test_unexpected_tag_is_protocol() {
        let got: PointMessage = Message::Join(JoinMessage {
            rank: 1,
            host: "h".to_string(),
        });
        let err = unexpected(Tag::Shard, LEADER, got);
        match err.downcast_ref::<MeshError>() {
            Some(MeshError::Protocol { expected, got }) => {
                assert_eq!(expected, "SHARD from rank 0");
                assert_eq!(got, "JOIN");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }
}
