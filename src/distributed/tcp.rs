//! TCP transport
//!
//! The leader listens; every worker connects once and identifies itself with
//! a JOIN frame carrying its rank. After that each connection is a plain
//! ordered pipe of length-prefixed frames (see [`super::protocol`]).

use super::protocol::{read_message, write_message, JoinMessage, Message};
use super::transport::{Transport, LEADER};
use crate::error::MeshError;
use crate::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};
use tokio::time::sleep;

/// How many times a worker tries to reach the leader before giving up
const CONNECT_ATTEMPTS: u32 = 50;

/// Pause between connection attempts
const CONNECT_BACKOFF: Duration = Duration::from_millis(100);

/// One rank's set of TCP links
#[derive(Debug)]
pub struct TcpTransport<I, A> {
    rank: usize,

    /// streams[peer], `None` where no link exists
    streams: Vec<Option<TcpStream>>,

    _marker: PhantomData<fn() -> (I, A)>,
}

impl<I, A> TcpTransport<I, A>
where
    I: Serialize + DeserializeOwned + Send + Sync,
    A: Serialize + DeserializeOwned + Send + Sync,
{
    /// Leader side: wait until ranks 1..workers have all joined
    pub async fn accept_workers(listener: &TcpListener, workers: usize) -> Result<Self> {
        let mut streams: Vec<Option<TcpStream>> = (0..workers).map(|_| None).collect();
        let mut joined = 1;

        while joined < workers {
            let (mut stream, addr) = listener
                .accept()
                .await
                .map_err(|e| MeshError::transport(format!("failed to accept connection: {}", e)))?;
            let _ = stream.set_nodelay(true);

            let join = match read_message::<_, I, A>(&mut stream).await? {
                Message::Join(join) => join,
                other => {
                    return Err(MeshError::Protocol {
                        expected: format!("JOIN from {}", addr),
                        got: other.tag().to_string(),
                    }
                    .into())
                }
            };

            if join.rank == LEADER || join.rank >= workers {
                return Err(MeshError::Protocol {
                    expected: format!("a worker rank in 1..{}", workers),
                    got: format!("rank {} from {}", join.rank, addr),
                }
                .into());
            }
            if streams[join.rank].is_some() {
                return Err(MeshError::Protocol {
                    expected: format!("a single connection for rank {}", join.rank),
                    got: format!("a second JOIN from {}", addr),
                }
                .into());
            }

            tracing::info!(rank = join.rank, host = %join.host, %addr, "worker joined");
            streams[join.rank] = Some(stream);
            joined += 1;
        }

        Ok(Self {
            rank: LEADER,
            streams,
            _marker: PhantomData,
        })
    }

    /// Worker side: connect to the leader at `addr` and join as `rank`
    ///
    /// The leader may not be listening yet, so refused connections are
    /// retried for a few seconds.
    pub async fn connect<T: ToSocketAddrs + Clone>(addr: T, rank: usize) -> Result<Self> {
        if rank == LEADER {
            return Err(MeshError::config("worker rank must be at least 1").into());
        }

        let mut attempt = 0;
        let mut stream = loop {
            attempt += 1;
            match TcpStream::connect(addr.clone()).await {
                Ok(stream) => break stream,
                Err(e) if attempt < CONNECT_ATTEMPTS => {
                    tracing::debug!(attempt, error = %e, "leader not reachable yet");
                    sleep(CONNECT_BACKOFF).await;
                }
                Err(e) => {
                    return Err(MeshError::transport(format!(
                        "failed to connect to leader after {} attempts: {}",
                        attempt, e
                    ))
                    .into())
                }
            }
        };
        let _ = stream.set_nodelay(true);

        let join: Message<I, A> = Message::Join(JoinMessage {
            rank,
            host: host_name(),
        });
        write_message(&mut stream, &join).await?;

        let mut streams: Vec<Option<TcpStream>> = (0..=rank).map(|_| None).collect();
        streams[LEADER] = Some(stream);

        Ok(Self {
            rank,
            streams,
            _marker: PhantomData,
        })
    }

    fn stream(&mut self, peer: usize) -> Result<&mut TcpStream> {
        let rank = self.rank;
        match self.streams.get_mut(peer) {
            Some(Some(stream)) => Ok(stream),
            _ => Err(MeshError::transport(format!("no link between rank {} and rank {}", rank, peer)).into()),
        }
    }
}

impl<I, A> Transport<I, A> for TcpTransport<I, A>
where
    I: Serialize + DeserializeOwned + Send + Sync,
    A: Serialize + DeserializeOwned + Send + Sync,
{
    fn rank(&self) -> usize {
        self.rank
    }

    async fn send(&mut self, dest: usize, message: Message<I, A>) -> Result<()> {
        let stream = self.stream(dest)?;
        write_message(stream, &message).await
    }

    async fn recv(&mut self, source: usize) -> Result<Message<I, A>> {
        let stream = self.stream(source)?;
        read_message(stream).await
    }
}

/// Host name reported in JOIN frames
fn host_name() -> String {
    hostname::get()
        .ok()
        .and_then(|name| name.into_string().ok())
        .unwrap_or_else(|| "unknown".to_string())
}
