//! meshmeans CLI entry point

use anyhow::{Context, Result};
use meshmeans::config::cli::{Cli, ExecutionMode};
use meshmeans::config::toml::load_config;
use meshmeans::config::validator::validate_run;
use meshmeans::config::Config;
use meshmeans::coordinator::RunOutcome;
use meshmeans::dataset::{self, Loadable};
use meshmeans::generate::{generate, GenerateConfig};
use meshmeans::model::{ClusterModel, ItemKind, PointModel, StrandModel};
use meshmeans::output::{json, text, Describe};
use meshmeans::{session, MeshError};
use serde::Serialize;
use std::path::Path;
use std::time::Instant;
use tokio::net::TcpListener;
use tokio::runtime::Runtime;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    let cli = Cli::parse_args();
    cli.validate()?;
    init_logging(cli.debug);

    match cli.mode {
        ExecutionMode::Run | ExecutionMode::Leader => run_leader(&cli),
        ExecutionMode::Worker => run_worker(&cli),
        ExecutionMode::Generate => run_generate(&cli),
    }
}

/// Logs go to stderr so the report on stdout stays clean
fn init_logging(debug: bool) {
    let default = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Standalone or TCP leader: load, cluster, report
fn run_leader(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;
    validate_run(&config.run)?;

    let path = config
        .input
        .path
        .clone()
        .ok_or_else(|| MeshError::config("no dataset given; use --input or [input] path"))?;
    let runtime = Runtime::new().context("Failed to create tokio runtime")?;

    match config.run.kind {
        ItemKind::Points => lead::<PointModel>(cli, &config, &path, &runtime),
        ItemKind::Strands => lead::<StrandModel>(cli, &config, &path, &runtime),
    }
}

fn lead<M>(cli: &Cli, config: &Config, path: &Path, runtime: &Runtime) -> Result<()>
where
    M: ClusterModel,
    M::Item: Loadable + Describe,
{
    let loading = Instant::now();
    let items = dataset::load::<M::Item>(path, &config.run)?;
    let load_time = loading.elapsed();
    let run = config.run.clone();

    let mut outcome = runtime.block_on(async {
        match cli.mode {
            ExecutionMode::Leader => {
                let listener = TcpListener::bind(&cli.listen)
                    .await
                    .map_err(|e| MeshError::transport(format!("cannot listen on {}: {}", cli.listen, e)))?;
                session::run_leader::<M>(listener, run, items).await
            }
            _ => session::run_standalone::<M>(run, items).await,
        }
    })?;
    outcome.add_load_time(load_time);

    report(&outcome, config)
}

fn report<I: Describe + Serialize>(outcome: &RunOutcome<I>, config: &Config) -> Result<()> {
    if !config.output.quiet {
        text::print_results(outcome);
    }

    if let Some(ref path) = config.output.json {
        json::write_json_output(path, outcome, true)?;
        info!(path = %path.display(), "wrote JSON report");
    }

    Ok(())
}

/// TCP worker: the leader ships the shard and run parameters
fn run_worker(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;
    let leader = cli
        .leader
        .as_deref()
        .ok_or_else(|| MeshError::config("--leader is required in worker mode"))?;
    let rank = cli
        .rank
        .ok_or_else(|| MeshError::config("--rank is required in worker mode"))?;
    let runtime = Runtime::new().context("Failed to create tokio runtime")?;

    let summary = runtime.block_on(async {
        match config.run.kind {
            ItemKind::Points => session::run_worker::<PointModel>(leader, rank).await,
            ItemKind::Strands => session::run_worker::<StrandModel>(leader, rank).await,
        }
    })?;

    info!(rank = summary.rank, items = summary.items, rounds = summary.rounds, "worker finished");
    Ok(())
}

fn run_generate(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;
    let output = cli
        .output
        .as_deref()
        .ok_or_else(|| MeshError::config("--output is required in generate mode"))?;
    let per_cluster = cli
        .per_cluster
        .ok_or_else(|| MeshError::config("--per-cluster is required in generate mode"))?;

    let generate_config = GenerateConfig {
        kind: config.run.kind,
        clusters: config.run.clusters,
        per_cluster,
        max_value: cli.max_value,
        strand_length: config.run.strand_length,
        seed: cli.seed,
    };

    let written = generate(&generate_config, output)?;
    println!("Wrote {} {} to {}", written, generate_config.kind, output.display());
    Ok(())
}
