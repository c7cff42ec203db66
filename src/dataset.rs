//! Dataset loader
//!
//! Reads the ordered item collection from a text file before the first round.
//! One item per line, blank lines skipped:
//!
//! - points: `x,y` (further comma-separated columns are ignored)
//! - strands: the first comma-separated field, of which the first
//!   `strand_length` symbols are used
//!
//! Any line that cannot be parsed is a configuration error naming the line.

use crate::config::validator::resolve_item_count;
use crate::config::RunConfig;
use crate::error::MeshError;
use crate::model::point::MAX_COORDINATE;
use crate::model::{Point, Strand};
use crate::Result;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::info;

/// An item type that can be read from one dataset line
pub trait Loadable: Sized {
    /// Parse one non-blank line; the error text is wrapped with the line number
    fn parse_line(line: &str, run: &RunConfig) -> std::result::Result<Self, String>;
}

impl Loadable for Point {
    fn parse_line(line: &str, _run: &RunConfig) -> std::result::Result<Self, String> {
        let mut fields = line.split(',').map(str::trim);
        let mut coordinate = |name: &str| -> std::result::Result<f64, String> {
            let field = fields.next().filter(|f| !f.is_empty()).ok_or(format!("missing {}", name))?;
            let value: f64 = field.parse().map_err(|_| format!("invalid {} '{}'", name, field))?;
            if !value.is_finite() {
                return Err(format!("{} '{}' is not finite", name, field));
            }
            if value.abs() > MAX_COORDINATE {
                return Err(format!("{} '{}' exceeds the coordinate limit {:e}", name, field, MAX_COORDINATE));
            }
            Ok(value)
        };

        let x = coordinate("x")?;
        let y = coordinate("y")?;
        Ok(Point::new(x, y))
    }
}

impl Loadable for Strand {
    fn parse_line(line: &str, run: &RunConfig) -> std::result::Result<Self, String> {
        let field = line.split(',').next().unwrap_or("").trim();
        let head: String = field.chars().take(run.strand_length).collect();
        if head.chars().count() < run.strand_length {
            return Err(format!(
                "strand '{}' is shorter than {} symbols",
                field, run.strand_length
            ));
        }
        head.parse::<Strand>().map_err(|e| e.to_string())
    }
}

/// Read up to `run.items` items from `reader`
///
/// Returns exactly N items, N being `run.items` or everything the reader
/// holds when unset.
pub fn read_items<T: Loadable, R: BufRead>(reader: R, run: &RunConfig) -> Result<Vec<T>> {
    let mut items = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        if run.items.is_some_and(|n| items.len() >= n) {
            break;
        }
        let line = line.map_err(|e| MeshError::config(format!("line {}: {}", index + 1, e)))?;
        if line.trim().is_empty() {
            continue;
        }
        let item = T::parse_line(&line, run).map_err(|e| MeshError::config(format!("line {}: {}", index + 1, e)))?;
        items.push(item);
    }

    let count = resolve_item_count(run, items.len())?;
    items.truncate(count);
    Ok(items)
}

/// Load the dataset at `path`
pub fn load<T: Loadable>(path: &Path, run: &RunConfig) -> Result<Vec<T>> {
    let file = File::open(path)
        .map_err(|e| MeshError::config(format!("cannot open dataset {}: {}", path.display(), e)))?;

    let items = read_items(BufReader::new(file), run)
        .map_err(|e| e.context(format!("while loading {}", path.display())))?;

    info!(path = %path.display(), items = items.len(), kind = %run.kind, "loaded dataset");
    Ok(items)
}
