//! Leader/worker protocol
//!
//! This module defines the messages exchanged between the leader (rank 0) and
//! the workers. The protocol is statically agreed: both sides are built for the
//! same item kind, and there is no handshake or version negotiation. Messages
//! use MessagePack (rmp-serde) for compact binary serialization.
//!
//! # Message Flow
//!
//! ```text
//! Leader (rank 0)                  Worker (rank r)
//!     |                              |
//!     |<------- JOIN(r) -------------|   (TCP only: identifies the connection)
//!     |                              |
//!     |-------- SHARD(config) ------>|   once, before round 0
//!     |                              |
//!     |-- REPRESENTATIVES(round) --->|   every round
//!     |                              |
//!     |<----- PARTIAL(round, 0) -----|
//!     |<----- PARTIAL(round, ..) ----|   K per round
//!     |<----- PARTIAL(round, K-1) ---|
//! ```
//!
//! # Message Framing
//!
//! Each message is prefixed with a 4-byte length field (little-endian u32):
//!
//! ```text
//! [4 bytes: message length][N bytes: MessagePack-serialized message]
//! ```

use crate::config::RunConfig;
use crate::error::MeshError;
use anyhow::{Context, Result};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Largest frame accepted from a peer (shards of large datasets included)
pub const MAX_FRAME_BYTES: usize = 256 * 1024 * 1024;

/// Message kind, used to match received messages to what the receiver expects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    Join,
    Shard,
    Representatives,
    Partial,
    Error,
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Join => "JOIN",
            Self::Shard => "SHARD",
            Self::Representatives => "REPRESENTATIVES",
            Self::Partial => "PARTIAL",
            Self::Error => "ERROR",
        };
        write!(f, "{}", name)
    }
}

/// Protocol message
///
/// `I` is the item (and representative) type, `A` the per-cluster aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Message<I, A> {
    /// Join message (Worker → Leader, TCP only)
    ///
    /// First frame on a new connection; tells the leader which rank the
    /// connection belongs to.
    Join(JoinMessage),

    /// Shard message (Leader → Worker)
    ///
    /// Sent once before the first round with the worker's items and the
    /// run configuration.
    Shard(ShardMessage<I>),

    /// Representatives message (Leader → Worker)
    ///
    /// Sent at the start of every round. A worker must receive it completely
    /// before it starts assigning.
    Representatives(RepresentativesMessage<I>),

    /// Partial aggregate message (Worker → Leader)
    ///
    /// One per cluster per round.
    Partial(PartialMessage<A>),

    /// Error message (either direction)
    ///
    /// Sent best-effort by a peer that is about to abort the run.
    Error(ErrorMessage),
}

impl<I, A> Message<I, A> {
    pub fn tag(&self) -> Tag {
        match self {
            Self::Join(_) => Tag::Join,
            Self::Shard(_) => Tag::Shard,
            Self::Representatives(_) => Tag::Representatives,
            Self::Partial(_) => Tag::Partial,
            Self::Error(_) => Tag::Error,
        }
    }
}

/// Join message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinMessage {
    /// Rank claimed by the connecting worker
    pub rank: usize,

    /// Worker host name (for logs)
    pub host: String,
}

/// Shard message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShardMessage<I> {
    /// Rank the shard is addressed to
    pub rank: usize,

    /// Run configuration (worker count, clusters, rounds, strand length)
    pub config: RunConfig,

    /// The worker's contiguous slice of the dataset
    pub items: Vec<I>,
}

/// Representatives message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepresentativesMessage<I> {
    /// Round number, starting at 0
    pub round: usize,

    /// Current representative of every cluster, in cluster order
    pub representatives: Vec<I>,
}

/// Partial aggregate message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartialMessage<A> {
    /// Round number the aggregate belongs to
    pub round: usize,

    /// Cluster index
    pub cluster: usize,

    /// The sender's partial aggregate for this cluster
    pub aggregate: A,
}

/// Error message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorMessage {
    /// Rank of the failing peer
    pub rank: usize,

    /// Error description
    pub error: String,
}

/// Serialize a message to bytes
///
/// Prepends a 4-byte length field for framing.
///
/// # Message Format
///
/// ```text
/// [4 bytes: message length (little-endian u32)][N bytes: MessagePack message]
/// ```
pub fn serialize_message<I: Serialize, A: Serialize>(msg: &Message<I, A>) -> Result<Vec<u8>> {
    let msg_bytes = rmp_serde::to_vec(msg).context("Failed to serialize message")?;

    if msg_bytes.len() > MAX_FRAME_BYTES {
        anyhow::bail!(MeshError::transport(format!(
            "message too large: {} bytes (max {})",
            msg_bytes.len(),
            MAX_FRAME_BYTES
        )));
    }

    // Prepend length field
    let msg_len = msg_bytes.len() as u32;
    let mut framed = Vec::with_capacity(4 + msg_bytes.len());
    framed.extend_from_slice(&msg_len.to_le_bytes());
    framed.extend_from_slice(&msg_bytes);

    Ok(framed)
}

/// Deserialize a message from bytes
///
/// Expects a 4-byte length prefix followed by a MessagePack-serialized message.
///
/// # Returns
///
/// Returns (message, bytes_consumed) where bytes_consumed includes the length prefix.
pub fn deserialize_message<I: DeserializeOwned, A: DeserializeOwned>(buf: &[u8]) -> Result<(Message<I, A>, usize)> {
    // Need at least 4 bytes for length
    if buf.len() < 4 {
        anyhow::bail!(MeshError::transport(format!(
            "buffer too small for message length (need 4 bytes, got {})",
            buf.len()
        )));
    }

    let msg_len = u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]) as usize;

    // Check if we have the complete message
    if buf.len() < 4 + msg_len {
        anyhow::bail!(MeshError::transport(format!(
            "incomplete message (need {} bytes, got {})",
            4 + msg_len,
            buf.len()
        )));
    }

    let body = &buf[4..4 + msg_len];
    let msg = rmp_serde::from_slice(body).map_err(|e| decode_failure(body, e))?;

    Ok((msg, 4 + msg_len))
}

/// Classify a body that does not decode into the receiver's message type
///
/// A SHARD that is well-formed apart from its items was built for the other
/// item kind, which is a configuration error on the receiving side.
fn decode_failure(body: &[u8], error: rmp_serde::decode::Error) -> anyhow::Error {
    if let Ok(Message::Shard(shard)) = rmp_serde::from_slice::<Message<IgnoredAny, IgnoredAny>>(body) {
        return MeshError::config(format!(
            "leader is clustering {} and this worker cannot decode them ({}); start it with --kind {}",
            shard.config.kind, error, shard.config.kind
        ))
        .into();
    }
    MeshError::transport(format!("failed to deserialize message: {}", error)).into()
}

/// Read a complete message from a stream
///
/// Reads the length prefix, then the message body.
pub async fn read_message<R, I, A>(stream: &mut R) -> Result<Message<I, A>>
where
    R: AsyncRead + Unpin,
    I: DeserializeOwned,
    A: DeserializeOwned,
{
    // Read length field (4 bytes)
    let mut len_buf = [0u8; 4];
    stream
        .read_exact(&mut len_buf)
        .await
        .map_err(|e| MeshError::transport(format!("failed to read message length: {}", e)))?;

    let msg_len = u32::from_le_bytes(len_buf) as usize;

    if msg_len > MAX_FRAME_BYTES {
        anyhow::bail!(MeshError::transport(format!(
            "message too large: {} bytes (max {})",
            msg_len, MAX_FRAME_BYTES
        )));
    }

    // Read message body behind the length field
    let mut frame = vec![0u8; 4 + msg_len];
    frame[..4].copy_from_slice(&len_buf);
    stream
        .read_exact(&mut frame[4..])
        .await
        .map_err(|e| MeshError::transport(format!("failed to read message body: {}", e)))?;

    let (msg, _) = deserialize_message(&frame)?;
    Ok(msg)
}

/// Write a message to a stream
///
/// Serializes the message with length prefix, writes it and flushes.
pub async fn write_message<W, I, A>(stream: &mut W, msg: &Message<I, A>) -> Result<()>
where
    W: AsyncWrite + Unpin,
    I: Serialize,
    A: Serialize,
{
    let framed = serialize_message(msg)?;

    stream
        .write_all(&framed)
        .await
        .map_err(|e| MeshError::transport(format!("failed to write message: {}", e)))?;

    // Flush to ensure message is sent immediately
    stream
        .flush()
        .await
        .map_err(|e| MeshError::transport(format!("failed to flush stream: {}", e)))?;

    Ok(())
}
