//! DNA strand model
//!
//! Strands are fixed-length sequences over the four symbols `a`, `t`, `c`, `g`.
//! Distance is Hamming distance. A cluster's partial statistic counts, for
//! every position, how often each symbol occurs among the members; the next
//! representative takes the plurality symbol at each position.
//!
//! # Tie-break
//!
//! Ties are resolved by a fixed precedence so that results are reproducible:
//!
//! 1. `g` only if strictly greater than each of the other three
//! 2. otherwise `a` if greater than or equal to all others
//! 3. otherwise `c` if greater than or equal to all others
//! 4. otherwise `t`
//!
//! A four-way tie therefore gives `a`, and a `t`/`c` tie gives `c`.

use super::{ClusterModel, ItemKind};
use crate::config::RunConfig;
use crate::error::MeshError;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One strand symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Symbol {
    A,
    T,
    C,
    G,
}

impl Symbol {
    /// All symbols, in counting order
    pub const ALL: [Symbol; 4] = [Symbol::A, Symbol::T, Symbol::C, Symbol::G];

    /// Parse a single character (case-insensitive)
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'a' => Some(Self::A),
            't' => Some(Self::T),
            'c' => Some(Self::C),
            'g' => Some(Self::G),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Self::A => 'a',
            Self::T => 't',
            Self::C => 'c',
            Self::G => 'g',
        }
    }
}

/// A fixed-length symbol sequence
///
/// The length is not part of the type; it is checked against the run's
/// configured strand length when the strand is loaded or received.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Strand {
    symbols: Vec<Symbol>,
}

impl Strand {
    pub fn new(symbols: Vec<Symbol>) -> Self {
        Self { symbols }
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Number of positions at which two strands differ
    ///
    /// Positions past the end of the shorter strand count as different.
    pub fn hamming(&self, other: &Strand) -> usize {
        let differing = self
            .symbols
            .iter()
            .zip(&other.symbols)
            .filter(|(a, b)| a != b)
            .count();
        differing + self.len().abs_diff(other.len())
    }
}

impl FromStr for Strand {
    type Err = MeshError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let symbols = s
            .chars()
            .map(|c| {
                Symbol::from_char(c)
                    .ok_or_else(|| MeshError::config(format!("invalid strand symbol {:?} in {:?}", c, s)))
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self { symbols })
    }
}

impl TryFrom<String> for Strand {
    type Error = MeshError;

    fn try_from(s: String) -> std::result::Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Strand> for String {
    fn from(strand: Strand) -> Self {
        strand.to_string()
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for symbol in &self.symbols {
            write!(f, "{}", symbol.as_char())?;
        }
        Ok(())
    }
}

/// Symbol frequencies at one position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SymbolCounts {
    pub a: u64,
    pub t: u64,
    pub c: u64,
    pub g: u64,
}

impl SymbolCounts {
    pub fn record(&mut self, symbol: Symbol) {
        match symbol {
            Symbol::A => self.a += 1,
            Symbol::T => self.t += 1,
            Symbol::C => self.c += 1,
            Symbol::G => self.g += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.a + self.t + self.c + self.g
    }

    fn add(&mut self, other: &SymbolCounts) {
        self.a += other.a;
        self.t += other.t;
        self.c += other.c;
        self.g += other.g;
    }

    /// Plurality symbol under the fixed precedence (see module docs)
    pub fn plurality(&self) -> Symbol {
        let Self { a, t, c, g } = *self;
        if g > a && g > t && g > c {
            Symbol::G
        } else if a >= t && a >= c && a >= g {
            Symbol::A
        } else if c >= a && c >= t && c >= g {
            Symbol::C
        } else {
            Symbol::T
        }
    }
}

/// Partial statistic for one cluster of strands: one tally per position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrandCounts {
    pub positions: Vec<SymbolCounts>,
}

/// Model for [`Strand`] items of a fixed length
#[derive(Debug, Clone, Copy)]
pub struct StrandModel {
    length: usize,
}

impl StrandModel {
    pub fn new(length: usize) -> Self {
        Self { length }
    }

    pub fn length(&self) -> usize {
        self.length
    }
}

impl ClusterModel for StrandModel {
    type Item = Strand;
    type Aggregate = StrandCounts;
    type Distance = usize;

    fn from_run(run: &RunConfig) -> Self {
        Self::new(run.strand_length)
    }

    fn kind(&self) -> ItemKind {
        ItemKind::Strands
    }

    fn distance(&self, item: &Strand, representative: &Strand) -> usize {
        item.hamming(representative)
    }

    fn empty_aggregate(&self) -> StrandCounts {
        StrandCounts {
            positions: vec![SymbolCounts::default(); self.length],
        }
    }

    fn accumulate(&self, aggregate: &mut StrandCounts, item: &Strand) {
        for (counts, symbol) in aggregate.positions.iter_mut().zip(item.symbols()) {
            counts.record(*symbol);
        }
    }

    fn merge(&self, into: &mut StrandCounts, other: &StrandCounts) -> Result<()> {
        if into.positions.len() != other.positions.len() {
            return Err(MeshError::Protocol {
                expected: format!("symbol counts for {} positions", into.positions.len()),
                got: format!("{} positions", other.positions.len()),
            }
            .into());
        }
        for (mine, theirs) in into.positions.iter_mut().zip(&other.positions) {
            mine.add(theirs);
        }
        Ok(())
    }

    fn member_count(&self, aggregate: &StrandCounts) -> u64 {
        // Every member contributes exactly one symbol at every position
        aggregate.positions.first().map(SymbolCounts::total).unwrap_or(0)
    }

    fn update(&self, aggregate: &StrandCounts, previous: &Strand) -> Strand {
        if self.member_count(aggregate) == 0 {
            return previous.clone();
        }
        Strand::new(aggregate.positions.iter().map(SymbolCounts::plurality).collect())
    }

    /// The middle strand of each of `clusters` contiguous blocks
    fn seed(&self, items: &[Strand], clusters: usize) -> Vec<Strand> {
        let block = items.len() / clusters;
        (0..clusters)
            .map(|i| items[block / 2 + i * block].clone())
            .collect()
    }

    fn check_item(&self, item: &Strand) -> Result<()> {
        if item.len() != self.length {
            return Err(MeshError::config(format!(
                "strand {} has length {}, expected {}",
                item,
                item.len(),
                self.length
            ))
            .into());
        }
        Ok(())
    }
}
