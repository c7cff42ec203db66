//! CLI argument parsing using clap

use super::RemainderPolicy;
use crate::error::MeshError;
use crate::model::ItemKind;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Execution mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExecutionMode {
    /// Standalone (default) - leader and workers as tasks in one process
    Run,
    /// Leader - listen for workers, load the dataset, drive the rounds
    Leader,
    /// Worker - connect to a leader and compute on the shard it sends
    Worker,
    /// Generate a synthetic dataset
    Generate,
}

/// meshmeans - leader/worker K-means for points and DNA strands
#[derive(Parser, Debug)]
#[command(name = "meshmeans")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Execution mode: run, leader, worker, or generate
    #[arg(long, value_enum, default_value = "run")]
    pub mode: ExecutionMode,

    /// TOML configuration file (CLI flags take precedence)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Dataset file
    #[arg(short = 'f', long)]
    pub input: Option<PathBuf>,

    // === Run Options ===
    /// Item type
    #[arg(long, value_enum)]
    pub kind: Option<ItemKind>,

    /// Number of items to process (default: whole dataset)
    #[arg(short = 'n', long)]
    pub items: Option<usize>,

    /// Number of clusters
    #[arg(short = 'c', long)]
    pub clusters: Option<usize>,

    /// Number of workers, leader included
    #[arg(short = 'p', long)]
    pub workers: Option<usize>,

    /// Number of rounds
    #[arg(long)]
    pub rounds: Option<usize>,

    /// Strand length (strands only)
    #[arg(long)]
    pub strand_length: Option<usize>,

    /// What to do with items left over when workers do not divide the item count
    #[arg(long, value_enum)]
    pub remainder: Option<RemainderPolicy>,

    // === Distributed Options ===
    /// Address the leader listens on (leader mode only)
    #[arg(long, default_value = "0.0.0.0:7070")]
    pub listen: String,

    /// Leader address to connect to (worker mode only)
    #[arg(long, env = "MESHMEANS_LEADER")]
    pub leader: Option<String>,

    /// This worker's rank, 1..workers (worker mode only)
    #[arg(long)]
    pub rank: Option<usize>,

    // === Output Options ===
    /// Write the final report as JSON
    #[arg(long)]
    pub json: Option<PathBuf>,

    /// Do not print the text report
    #[arg(long)]
    pub quiet: bool,

    /// Enable debug logging (per-round cluster sizes, message traffic)
    #[arg(long)]
    pub debug: bool,

    // === Generator Options ===
    /// Output file (generate mode only)
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// Items generated per cluster (generate mode only)
    #[arg(long)]
    pub per_cluster: Option<usize>,

    /// Maximum coordinate value for generated points (generate mode only)
    #[arg(long, default_value = "10.0")]
    pub max_value: f64,

    /// RNG seed for reproducible datasets (generate mode only)
    #[arg(long)]
    pub seed: Option<u64>,
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate mode-specific CLI arguments
    ///
    /// Run parameters are validated later, after the TOML file is merged.
    pub fn validate(&self) -> anyhow::Result<()> {
        match self.mode {
            ExecutionMode::Run | ExecutionMode::Leader => {
                if self.input.is_none() && self.config.is_none() {
                    anyhow::bail!(MeshError::config("--input (or a --config file with [input] path) is required"));
                }
            }
            ExecutionMode::Worker => {
                if self.leader.is_none() {
                    anyhow::bail!(MeshError::config("--leader is required in worker mode"));
                }
                match self.rank {
                    None => anyhow::bail!(MeshError::config("--rank is required in worker mode")),
                    Some(0) => anyhow::bail!(MeshError::config("rank 0 is the leader; workers use ranks 1 and up")),
                    Some(_) => {}
                }
            }
            ExecutionMode::Generate => {
                if self.output.is_none() {
                    anyhow::bail!(MeshError::config("--output is required in generate mode"));
                }
                if self.per_cluster.is_none() {
                    anyhow::bail!(MeshError::config("--per-cluster is required in generate mode"));
                }
                if self.max_value < 1.0 {
                    anyhow::bail!(MeshError::config("max_value must be at least 1.0"));
                }
            }
        }

        Ok(())
    }
}
