//! Synthetic dataset generator
//!
//! Produces clustered test data in the format the loader reads.
//!
//! # Points
//!
//! `clusters` centers are drawn uniformly from `[0, max_value)²`. Every
//! cluster gets a spread drawn uniformly from `[0, max_value / 2)` and
//! `per_cluster` points normally distributed around its center.
//!
//! # Strands
//!
//! `clusters` origin strands of `length` random symbols. Every generated
//! strand copies its origin and replaces `min(|N(0, σ)|, length)` distinct
//! positions with a different symbol, σ drawn per cluster from
//! `[0, length / 2)`.
//!
//! Seeded generators (Xoshiro256++) are reproducible.

use crate::error::MeshError;
use crate::model::{ItemKind, Point, Strand, Symbol};
use crate::Result;
use anyhow::Context;
use rand::seq::{index, SliceRandom};
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use rand_xoshiro::Xoshiro256PlusPlus;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Generator parameters
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateConfig {
    pub kind: ItemKind,
    pub clusters: usize,
    pub per_cluster: usize,
    /// Coordinate bound (points)
    pub max_value: f64,
    /// Strand length (strands)
    pub strand_length: usize,
    pub seed: Option<u64>,
}

impl GenerateConfig {
    fn validate(&self) -> Result<()> {
        if self.clusters == 0 || self.per_cluster == 0 {
            return Err(MeshError::config("clusters and per_cluster must be at least 1").into());
        }
        match self.kind {
            ItemKind::Points if !(self.max_value.is_finite() && self.max_value >= 1.0) => {
                Err(MeshError::config("max_value must be at least 1.0").into())
            }
            ItemKind::Strands if self.strand_length == 0 => {
                Err(MeshError::config("strand_length must be at least 1").into())
            }
            _ => Ok(()),
        }
    }

    fn rng(&self) -> Xoshiro256PlusPlus {
        match self.seed {
            Some(seed) => Xoshiro256PlusPlus::seed_from_u64(seed),
            None => Xoshiro256PlusPlus::from_entropy(),
        }
    }
}

/// Points around `clusters` random centers
pub fn generate_points<R: Rng>(rng: &mut R, clusters: usize, per_cluster: usize, max_value: f64) -> Result<Vec<Point>> {
    let centers: Vec<Point> = (0..clusters)
        .map(|_| Point::new(rng.gen_range(0.0..max_value), rng.gen_range(0.0..max_value)))
        .collect();

    let mut points = Vec::with_capacity(clusters * per_cluster);
    for center in centers {
        let spread = rng.gen_range(0.0..0.5 * max_value);
        let normal = Normal::new(0.0, spread).context("invalid cluster spread")?;
        for _ in 0..per_cluster {
            points.push(Point::new(center.x + normal.sample(rng), center.y + normal.sample(rng)));
        }
    }
    Ok(points)
}

/// Mutated copies of `clusters` random origin strands
pub fn generate_strands<R: Rng>(rng: &mut R, clusters: usize, per_cluster: usize, length: usize) -> Result<Vec<Strand>> {
    let origins: Vec<Vec<Symbol>> = (0..clusters)
        .map(|_| (0..length).map(|_| random_symbol(rng)).collect())
        .collect();

    let mut strands = Vec::with_capacity(clusters * per_cluster);
    for origin in origins {
        let spread = rng.gen_range(0.0..0.5 * length as f64);
        let normal = Normal::new(0.0, spread).context("invalid cluster spread")?;
        for _ in 0..per_cluster {
            let mutations = (normal.sample(rng).abs() as usize).min(length);
            let mut symbols = origin.clone();
            for position in index::sample(rng, length, mutations) {
                symbols[position] = different_symbol(rng, symbols[position]);
            }
            strands.push(Strand::new(symbols));
        }
    }
    Ok(strands)
}

fn random_symbol<R: Rng>(rng: &mut R) -> Symbol {
    Symbol::ALL[rng.gen_range(0..Symbol::ALL.len())]
}

fn different_symbol<R: Rng>(rng: &mut R, current: Symbol) -> Symbol {
    let others: Vec<Symbol> = Symbol::ALL.iter().copied().filter(|s| *s != current).collect();
    *others.choose(rng).unwrap_or(&current)
}

/// Generate a dataset and write it to `path`, one item per line
///
/// Returns the number of items written.
pub fn generate(config: &GenerateConfig, path: &Path) -> Result<usize> {
    config.validate()?;
    let mut rng = config.rng();

    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut out = BufWriter::new(file);

    let written = match config.kind {
        ItemKind::Points => {
            let points = generate_points(&mut rng, config.clusters, config.per_cluster, config.max_value)?;
            for p in &points {
                writeln!(out, "{},{}", p.x, p.y)?;
            }
            points.len()
        }
        ItemKind::Strands => {
            let strands = generate_strands(&mut rng, config.clusters, config.per_cluster, config.strand_length)?;
            for s in &strands {
                writeln!(out, "{}", s)?;
            }
            strands.len()
        }
    };
    out.flush()?;

    info!(path = %path.display(), items = written, kind = %config.kind, "generated dataset");
    Ok(written)
}
