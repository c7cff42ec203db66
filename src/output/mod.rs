//! Result reporting
//!
//! After `Done` the leader hands its [`RunOutcome`](crate::coordinator::RunOutcome)
//! to one or both reporters:
//!
//! - `text`: human-readable summary on stdout
//! - `json`: machine-readable report file

pub mod json;
pub mod text;

use crate::model::{Point, Strand};

/// A representative that can be shown in a report
pub trait Describe {
    /// One-line rendering, without the cluster index
    fn describe(&self) -> String;
}

impl Describe for Point {
    fn describe(&self) -> String {
        format!("x={:.6}, y={:.6}", self.x, self.y)
    }
}

impl Describe for Strand {
    fn describe(&self) -> String {
        self.to_string()
    }
}
