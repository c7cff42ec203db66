//! Leader/worker message passing
//!
//! # Architecture
//!
//! A run has P ranks connected in a star: the leader (rank 0) holds one link
//! to every worker (ranks 1..P) and workers never talk to each other.
//!
//! # Modules
//!
//! - `protocol`: Message definitions and framing
//! - `transport`: The [`Transport`] trait used by the round coordinator
//! - `local`: In-process channels, for standalone runs and tests
//! - `tcp`: One TCP connection per worker, for multi-process runs

pub mod local;
pub mod protocol;
pub mod tcp;
pub mod transport;

pub use local::LocalTransport;
pub use protocol::{Message, Tag};
pub use tcp::TcpTransport;
pub use transport::{Transport, LEADER};
