//! Configuration validation
//!
//! All failures here are [`MeshError::Configuration`] and happen before the
//! first round, so a bad run never sends a single message.

use super::*;
use crate::error::MeshError;
use anyhow::Result;

/// Validate run parameters that do not depend on the dataset
pub fn validate_run(run: &RunConfig) -> Result<()> {
    if run.workers == 0 {
        return Err(MeshError::config("workers must be at least 1").into());
    }

    if run.clusters == 0 {
        return Err(MeshError::config("clusters must be at least 1").into());
    }

    if run.rounds == 0 {
        return Err(MeshError::config("rounds must be at least 1").into());
    }

    if run.kind == ItemKind::Strands && run.strand_length == 0 {
        return Err(MeshError::config("strand_length must be at least 1").into());
    }

    if let Some(items) = run.items {
        if items == 0 {
            return Err(MeshError::config("items must be at least 1").into());
        }
    }

    Ok(())
}

/// Resolve the number of items to process given how many the dataset holds
///
/// Returns N: the configured `items`, or the whole dataset when unset.
pub fn resolve_item_count(run: &RunConfig, available: usize) -> Result<usize> {
    let items = run.items.unwrap_or(available);

    if available < items {
        return Err(MeshError::config(format!(
            "dataset holds {} items but {} were requested",
            available, items
        ))
        .into());
    }

    if items < run.clusters {
        return Err(MeshError::config(format!(
            "cannot seed {} clusters from {} items",
            run.clusters, items
        ))
        .into());
    }

    if items < run.workers {
        return Err(MeshError::config(format!(
            "{} items cannot fill {} worker shards",
            items, run.workers
        ))
        .into());
    }

    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(workers: usize, clusters: usize) -> RunConfig {
        RunConfig {
            workers,
            clusters,
            ..RunConfig::default()
        }
    }

    #[test]
    fn test_validate_counts() {
        assert!(validate_run(&run(2, 2)).is_ok());
        assert!(validate_run(&run(0, 2)).is_err());
        assert!(validate_run(&run(2, 0)).is_err());

        let mut zero_rounds = run(1, 1);
        zero_rounds.rounds = 0;
        assert!(validate_run(&zero_rounds).is_err());
    }

    #[test]
    fn test_validate_strand_length() {
        let mut strands = run(1, 1);
        strands.kind = ItemKind::Strands;
        strands.strand_length = 0;
        assert!(validate_run(&strands).is_err());

        // Length is irrelevant for points
        let mut points = run(1, 1);
        points.strand_length = 0;
        assert!(validate_run(&points).is_ok());
    }

    #[test]
    fn test_resolve_item_count() {
        assert_eq!(resolve_item_count(&run(2, 2), 10).unwrap(), 10);

        let mut limited = run(2, 2);
        limited.items = Some(4);
        assert_eq!(resolve_item_count(&limited, 10).unwrap(), 4);

        // Dataset shorter than requested
        limited.items = Some(12);
        let err = resolve_item_count(&limited, 10).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<MeshError>(),
            Some(MeshError::Configuration(_))
        ));
    }

    #[test]
    fn test_resolve_rejects_too_few_items() {
        assert!(resolve_item_count(&run(1, 5), 4).is_err());
        assert!(resolve_item_count(&run(5, 1), 4).is_err());
    }
}
