//! Configuration module
//!
//! Handles CLI argument parsing, TOML configuration files, and validation.
//!
//! The run parameters live in [`RunConfig`], an immutable value built once
//! before the first round and handed to every component. In distributed mode
//! the leader ships its `RunConfig` to each worker together with the shard,
//! so workers never read the dataset or the config file themselves.

pub mod cli;
pub mod toml;
pub mod validator;

use crate::model::ItemKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Number of rounds when nothing else is configured
pub const DEFAULT_ROUNDS: usize = 5;

/// Strand length when nothing else is configured
pub const DEFAULT_STRAND_LENGTH: usize = 10;

/// Complete configuration (TOML file + CLI overrides)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub run: RunConfig,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Parameters of one clustering run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Item type
    pub kind: ItemKind,
    /// Number of items to process (N); `None` means the whole dataset
    pub items: Option<usize>,
    /// Worker count (P), leader included
    pub workers: usize,
    /// Cluster count (K)
    pub clusters: usize,
    /// Fixed number of rounds
    pub rounds: usize,
    /// Strand length (L); ignored for points
    pub strand_length: usize,
    /// What to do with `N % P` tail items
    pub remainder: RemainderPolicy,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            kind: ItemKind::default(),
            items: None,
            workers: 1,
            clusters: 1,
            rounds: DEFAULT_ROUNDS,
            strand_length: DEFAULT_STRAND_LENGTH,
            remainder: RemainderPolicy::default(),
        }
    }
}

/// Handling of items left over when `workers` does not divide the item count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RemainderPolicy {
    /// Refuse to run (configuration error)
    Reject,
    /// Leave the tail unprocessed (logged as a warning)
    Drop,
    /// Give the tail to the last worker's shard
    Last,
}

impl Default for RemainderPolicy {
    fn default() -> Self {
        Self::Reject
    }
}

impl fmt::Display for RemainderPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reject => write!(f, "reject"),
            Self::Drop => write!(f, "drop"),
            Self::Last => write!(f, "last"),
        }
    }
}

/// Dataset location
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InputConfig {
    /// Dataset file (points CSV or one strand per line)
    pub path: Option<PathBuf>,
}

/// Result reporting
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Write the final report as JSON to this path
    pub json: Option<PathBuf>,
    /// Suppress the text report on stdout
    #[serde(default)]
    pub quiet: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let run = RunConfig::default();
        assert_eq!(run.rounds, 5);
        assert_eq!(run.strand_length, 10);
        assert_eq!(run.workers, 1);
        assert_eq!(run.remainder, RemainderPolicy::Reject);
        assert_eq!(run.kind, ItemKind::Points);
    }

    #[test]
    fn test_display() {
        assert_eq!(RemainderPolicy::Last.to_string(), "last");
        assert_eq!(ItemKind::Strands.to_string(), "strands");
    }
}
