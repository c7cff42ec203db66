//! TOML configuration file parsing
//!
//! ```toml
//! [run]
//! kind = "strands"
//! workers = 4
//! clusters = 3
//! strand_length = 10
//! remainder = "last"
//!
//! [input]
//! path = "dna.csv"
//!
//! [output]
//! json = "result.json"
//! ```

use super::*;
use crate::config::cli::Cli;
use crate::error::MeshError;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Parse TOML configuration file
pub fn parse_toml_file(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path)
        .map_err(|e| MeshError::config(format!("cannot read config file {}: {}", path.display(), e)))?;

    parse_toml_string(&contents)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Parse TOML configuration from string
pub fn parse_toml_string(contents: &str) -> Result<Config> {
    let config: Config = ::toml::from_str(contents)
        .map_err(|e| MeshError::config(format!("invalid TOML configuration: {}", e)))?;

    Ok(config)
}

/// Load the config file named on the command line (if any) and apply CLI overrides
pub fn load_config(cli: &Cli) -> Result<Config> {
    let config = match cli.config {
        Some(ref path) => parse_toml_file(path)?,
        None => Config::default(),
    };
    merge_cli_with_config(cli, config)
}

/// Merge CLI arguments with TOML configuration (CLI takes precedence)
pub fn merge_cli_with_config(cli: &Cli, mut config: Config) -> Result<Config> {
    let run = &mut config.run;

    if let Some(kind) = cli.kind {
        run.kind = kind;
    }
    if let Some(items) = cli.items {
        run.items = Some(items);
    }
    if let Some(workers) = cli.workers {
        run.workers = workers;
    }
    if let Some(clusters) = cli.clusters {
        run.clusters = clusters;
    }
    if let Some(rounds) = cli.rounds {
        run.rounds = rounds;
    }
    if let Some(length) = cli.strand_length {
        run.strand_length = length;
    }
    if let Some(remainder) = cli.remainder {
        run.remainder = remainder;
    }

    // Input/output overrides
    if let Some(ref path) = cli.input {
        config.input.path = Some(path.clone());
    }
    if let Some(ref path) = cli.json {
        config.output.json = Some(path.clone());
    }
    if cli.quiet {
        config.output.quiet = true;
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;

    #[test]
    fn test_parse_toml_basic() {
        let toml_str = r#"
[run]
kind = "strands"
workers = 4
clusters = 3
remainder = "last"

[input]
path = "dna.csv"
"#;

        let config = parse_toml_string(toml_str).unwrap();
        assert_eq!(config.run.kind, ItemKind::Strands);
        assert_eq!(config.run.workers, 4);
        assert_eq!(config.run.clusters, 3);
        assert_eq!(config.run.rounds, DEFAULT_ROUNDS);
        assert_eq!(config.run.remainder, RemainderPolicy::Last);
        assert_eq!(config.input.path, Some(PathBuf::from("dna.csv")));
        assert!(config.output.json.is_none());
    }

    #[test]
    fn test_parse_toml_empty_uses_defaults() {
        let config = parse_toml_string("").unwrap();
        assert_eq!(config.run, RunConfig::default());
    }

    #[test]
    fn test_parse_toml_invalid_is_configuration_error() {
        let err = parse_toml_string("[run]\nworkers = \"many\"\n").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<MeshError>(),
            Some(MeshError::Configuration(_))
        ));
    }

    #[test]
    fn test_missing_file_is_configuration_error() {
        let err = parse_toml_file(Path::new("/nonexistent/meshmeans.toml")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<MeshError>(),
            Some(MeshError::Configuration(_))
        ));
    }

    #[test]
    fn test_cli_overrides_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[run]\nworkers = 4\nclusters = 3\n\n[input]\npath = \"a.csv\"").unwrap();

        let cli = Cli::try_parse_from([
            "meshmeans",
            "--config",
            file.path().to_str().unwrap(),
            "-c",
            "5",
            "-f",
            "b.csv",
        ])
        .unwrap();

        let config = load_config(&cli).unwrap();
        assert_eq!(config.run.workers, 4);
        assert_eq!(config.run.clusters, 5);
        assert_eq!(config.input.path, Some(PathBuf::from("b.csv")));
    }
}
