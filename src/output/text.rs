//! Human-readable text output

use super::Describe;
use crate::coordinator::RunOutcome;
use std::io::{self, Write};

/// Print run results to stdout
pub fn print_results<I: Describe>(outcome: &RunOutcome<I>) {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    // stdout going away is not worth failing a finished run over
    let _ = write_results(&mut out, outcome);
}

/// Render run results
pub fn write_results<W: Write, I: Describe>(out: &mut W, outcome: &RunOutcome<I>) -> io::Result<()> {
    writeln!(out, "═══════════════════════════════════════════════════════════")?;
    writeln!(out, "                    K-MEANS RESULTS")?;
    writeln!(out, "═══════════════════════════════════════════════════════════")?;
    writeln!(out)?;

    writeln!(out, "Kind:      {}", outcome.kind)?;
    writeln!(out, "Workers:   {}", outcome.workers)?;
    writeln!(out, "Clusters:  {}", outcome.representatives.len())?;
    writeln!(out, "Rounds:    {}", outcome.rounds)?;
    write!(out, "Items:     {}", outcome.items_processed)?;
    if outcome.items_dropped > 0 {
        write!(out, " ({} dropped)", outcome.items_dropped)?;
    }
    writeln!(out)?;
    writeln!(out)?;

    for (k, representative) in outcome.representatives.iter().enumerate() {
        write!(out, "Centroid {}: {}", k, representative.describe())?;
        if let Some(last) = outcome.history.last() {
            if let Some(size) = last.cluster_sizes.get(k) {
                write!(out, "  [{} members]", size)?;
            }
        }
        writeln!(out)?;
    }

    writeln!(out)?;
    writeln!(out, "Time taken: {:.6}s", outcome.elapsed.as_secs_f64())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinator::RoundSummary;
    use crate::model::{ItemKind, Point, Strand};
    use std::time::Duration;

    #[test]
    fn test_point_report() {
        let outcome = RunOutcome {
            kind: ItemKind::Points,
            representatives: vec![Point::new(0.0, 0.5), Point::new(10.0, 10.5)],
            rounds: 5,
            history: vec![RoundSummary {
                round: 4,
                cluster_sizes: vec![2, 2],
            }],
            elapsed: Duration::from_millis(1500),
            items_processed: 4,
            items_dropped: 0,
            workers: 2,
        };

        let mut buf = Vec::new();
        write_results(&mut buf, &outcome).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert!(text.contains("Centroid 0: x=0.000000, y=0.500000  [2 members]"));
        assert!(text.contains("Centroid 1: x=10.000000, y=10.500000"));
        assert!(text.contains("Time taken: 1.500000s"));
        assert!(!text.contains("dropped"));
    }

    #[test]
    fn test_strand_report() {
        let outcome = RunOutcome {
            kind: ItemKind::Strands,
            representatives: vec!["aact".parse::<Strand>().unwrap()],
            rounds: 1,
            history: Vec::new(),
            elapsed: Duration::ZERO,
            items_processed: 2,
            items_dropped: 1,
            workers: 2,
        };

        let mut buf = Vec::new();
        write_results(&mut buf, &outcome).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert!(text.contains("Centroid 0: aact\n"));
        assert!(text.contains("Items:     2 (1 dropped)"));
    }
}
