//! Error taxonomy
//!
//! Every error in meshmeans is fatal for the run. The typed variants below are
//! raised through `anyhow` (see [`crate::Result`]) so callers can classify a
//! failure with `err.downcast_ref::<MeshError>()`.
//!
//! Empty clusters are not an error: the updater keeps the previous
//! representative for any cluster that received no members.

use thiserror::Error;

/// Fatal error kinds
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MeshError {
    /// Invalid worker/cluster counts, unreadable or short dataset, bad config file.
    ///
    /// Raised before the first round; no rounds are performed.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A send or receive failed (peer gone, connection reset, bad frame).
    #[error("transport error: {0}")]
    Transport(String),

    /// A peer sent a message that does not fit the round protocol.
    #[error("protocol error: expected {expected}, got {got}")]
    Protocol {
        /// What the receiver was waiting for
        expected: String,
        /// What actually arrived
        got: String,
    },
}

impl MeshError {
    /// Shorthand for a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Shorthand for a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Whether this error came from the message-passing layer
    ///
    /// Protocol violations count as transport failures.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Protocol { .. })
    }
}
