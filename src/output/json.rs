//! JSON output
//!
//! ```json
//! {
//!   "generated_at": "2026-01-01T00:00:00+00:00",
//!   "kind": "points",
//!   "workers": 2,
//!   "rounds": 5,
//!   "items_processed": 4,
//!   "items_dropped": 0,
//!   "elapsed_secs": 0.0012,
//!   "representatives": [{ "x": 0.0, "y": 0.5 }, { "x": 10.0, "y": 10.5 }],
//!   "history": [{ "round": 0, "cluster_sizes": [1, 3] }, ...]
//! }
//! ```
//!
//! Strand representatives are serialized as plain strings.

use crate::coordinator::{RoundSummary, RunOutcome};
use crate::model::ItemKind;
use crate::Result;
use anyhow::Context;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// JSON report of one run
#[derive(Debug, Serialize)]
pub struct JsonReport<'a, I: Serialize> {
    /// Report creation time, RFC 3339
    pub generated_at: String,
    pub kind: ItemKind,
    pub workers: usize,
    pub rounds: usize,
    pub items_processed: usize,
    pub items_dropped: usize,
    pub elapsed_secs: f64,
    pub representatives: &'a [I],
    pub history: &'a [RoundSummary],
}

/// Build the report for `outcome`
pub fn build_report<I: Serialize>(outcome: &RunOutcome<I>) -> JsonReport<'_, I> {
    JsonReport {
        generated_at: chrono::Utc::now().to_rfc3339(),
        kind: outcome.kind,
        workers: outcome.workers,
        rounds: outcome.rounds,
        items_processed: outcome.items_processed,
        items_dropped: outcome.items_dropped,
        elapsed_secs: outcome.elapsed.as_secs_f64(),
        representatives: &outcome.representatives,
        history: &outcome.history,
    }
}

/// Write the report to `output_path`
pub fn write_json_output<I: Serialize>(output_path: &Path, outcome: &RunOutcome<I>, pretty: bool) -> Result<()> {
    let file = File::create(output_path)
        .with_context(|| format!("Failed to create JSON output {}", output_path.display()))?;
    let writer = BufWriter::new(file);
    let report = build_report(outcome);

    if pretty {
        serde_json::to_writer_pretty(writer, &report)?;
    } else {
        serde_json::to_writer(writer, &report)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Point, Strand};
    use std::time::Duration;

    fn outcome<I>(kind: ItemKind, representatives: Vec<I>) -> RunOutcome<I> {
        RunOutcome {
            kind,
            representatives,
            rounds: 2,
            history: vec![
                RoundSummary {
                    round: 0,
                    cluster_sizes: vec![1, 3],
                },
                RoundSummary {
                    round: 1,
                    cluster_sizes: vec![2, 2],
                },
            ],
            elapsed: Duration::from_millis(250),
            items_processed: 4,
            items_dropped: 0,
            workers: 2,
        }
    }

    #[test]
    fn test_point_report_shape() {
        let outcome = outcome(ItemKind::Points, vec![Point::new(0.0, 0.5), Point::new(10.0, 10.5)]);
        let value = serde_json::to_value(build_report(&outcome)).unwrap();

        assert_eq!(value["kind"], "points");
        assert_eq!(value["representatives"][1]["y"], 10.5);
        assert_eq!(value["history"][0]["cluster_sizes"][1], 3);
        assert_eq!(value["elapsed_secs"], 0.25);
        assert!(chrono::DateTime::parse_from_rfc3339(value["generated_at"].as_str().unwrap()).is_ok());
    }

    #[test]
    fn test_write_strand_report() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("result.json");
        let outcome = outcome(ItemKind::Strands, vec!["aact".parse::<Strand>().unwrap()]);

        write_json_output(&path, &outcome, true).unwrap();

        let value: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["representatives"][0], "aact");
        assert_eq!(value["kind"], "strands");
    }
}
