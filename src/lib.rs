//! meshmeans - distributed K-means for 2-D points and DNA strands
//!
//! A leader (rank 0) and P - 1 workers cluster one dataset in a fixed number
//! of synchronous rounds. Every rank owns a contiguous shard; each round the
//! leader sends the current representatives to every worker, all ranks assign
//! their items and fold them into per-cluster partial aggregates, and the
//! leader reduces the partials into the next representatives.
//!
//! # Architecture
//!
//! - **Models**: Euclidean mean for points, per-position plurality for strands
//! - **Cluster steps**: assign, aggregate, reduce, update
//! - **Coordinator**: leader and worker round state machines
//! - **Transports**: in-process channels or TCP with MessagePack frames

pub mod cluster;
pub mod config;
pub mod coordinator;
pub mod dataset;
pub mod distributed;
pub mod error;
pub mod generate;
pub mod model;
pub mod output;
pub mod partition;
pub mod session;

// Re-export commonly used types
pub use config::{Config, RunConfig};
pub use error::MeshError;
pub use model::{ClusterModel, ItemKind};

/// Result type used throughout meshmeans
pub type Result<T> = anyhow::Result<T>;
