//! 2-D point model
//!
//! Euclidean distance, `(sum_x, sum_y, count)` aggregates and mean update.

use super::{ClusterModel, ItemKind};
use crate::config::RunConfig;
use crate::error::MeshError;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Largest accepted coordinate magnitude
///
/// Sums of up to 2^64 coordinates this size stay finite, so centroids never
/// overflow.
pub const MAX_COORDINATE: f64 = f64::MAX / 18_446_744_073_709_551_616.0;

/// A 2-D coordinate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    #[inline]
    pub fn distance(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.x, self.y)
    }
}

/// Partial statistic for one cluster of points
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PointSums {
    pub sum_x: f64,
    pub sum_y: f64,
    pub count: u64,
}

impl PointSums {
    /// Centroid of the accumulated points, if any
    pub fn mean(&self) -> Option<Point> {
        if self.count == 0 {
            return None;
        }
        let n = self.count as f64;
        Some(Point::new(self.sum_x / n, self.sum_y / n))
    }
}

/// Model for [`Point`] items
#[derive(Debug, Clone, Copy, Default)]
pub struct PointModel;

impl ClusterModel for PointModel {
    type Item = Point;
    type Aggregate = PointSums;
    type Distance = f64;

    fn from_run(_run: &RunConfig) -> Self {
        PointModel
    }

    fn kind(&self) -> ItemKind {
        ItemKind::Points
    }

    fn distance(&self, item: &Point, representative: &Point) -> f64 {
        item.distance(representative)
    }

    fn empty_aggregate(&self) -> PointSums {
        PointSums::default()
    }

    fn accumulate(&self, aggregate: &mut PointSums, item: &Point) {
        aggregate.sum_x += item.x;
        aggregate.sum_y += item.y;
        aggregate.count += 1;
    }

    fn merge(&self, into: &mut PointSums, other: &PointSums) -> Result<()> {
        into.sum_x += other.sum_x;
        into.sum_y += other.sum_y;
        into.count += other.count;
        Ok(())
    }

    fn member_count(&self, aggregate: &PointSums) -> u64 {
        aggregate.count
    }

    fn update(&self, aggregate: &PointSums, previous: &Point) -> Point {
        aggregate.mean().unwrap_or(*previous)
    }

    /// The first `clusters` points of the collection
    fn seed(&self, items: &[Point], clusters: usize) -> Vec<Point> {
        items.iter().take(clusters).copied().collect()
    }

    fn check_item(&self, item: &Point) -> Result<()> {
        if !item.x.is_finite() || !item.y.is_finite() {
            return Err(MeshError::config(format!("point {} has a non-finite coordinate", item)).into());
        }
        if item.x.abs() > MAX_COORDINATE || item.y.abs() > MAX_COORDINATE {
            return Err(MeshError::config(format!(
                "point ({:e}, {:e}) exceeds the coordinate limit {:e}",
                item.x, item.y, MAX_COORDINATE
            ))
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert_eq!(PointModel.distance(&a, &b), 5.0);
        assert_eq!(PointModel.distance(&b, &b), 0.0);
    }

    #[test]
    fn test_accumulate_and_mean() {
        let model = PointModel;
        let mut sums = model.empty_aggregate();
        model.accumulate(&mut sums, &Point::new(10.0, 10.0));
        model.accumulate(&mut sums, &Point::new(10.0, 11.0));

        assert_eq!(sums.count, 2);
        assert_eq!(model.update(&sums, &Point::new(0.0, 0.0)), Point::new(10.0, 10.5));
    }

    #[test]
    fn test_empty_cluster_keeps_previous() {
        let previous = Point::new(-1.5, 2.25);
        let updated = PointModel.update(&PointSums::default(), &previous);
        assert_eq!(updated, previous);
    }

    #[test]
    fn test_merge() {
        let model = PointModel;
        let mut a = PointSums { sum_x: 1.0, sum_y: 2.0, count: 1 };
        let b = PointSums { sum_x: 3.0, sum_y: 4.0, count: 2 };
        model.merge(&mut a, &b).unwrap();
        assert_eq!(a, PointSums { sum_x: 4.0, sum_y: 6.0, count: 3 });
    }

    #[test]
    fn test_seed_takes_first_items() {
        let items = vec![Point::new(0.0, 0.0), Point::new(0.0, 1.0), Point::new(10.0, 10.0)];
        assert_eq!(PointModel.seed(&items, 2), vec![items[0], items[1]]);
    }

    #[test]
    fn test_check_item() {
        assert!(PointModel.check_item(&Point::new(1.0, 2.0)).is_ok());
        assert!(PointModel.check_item(&Point::new(f64::NAN, 2.0)).is_err());
        assert!(PointModel.check_item(&Point::new(MAX_COORDINATE, -MAX_COORDINATE)).is_ok());
        assert!(PointModel.check_item(&Point::new(1e308, 0.0)).is_err());
    }

    #[test]
    fn test_largest_coordinates_keep_finite_mean() {
        let model = PointModel;
        let mut sums = model.empty_aggregate();
        for _ in 0..4 {
            model.accumulate(&mut sums, &Point::new(MAX_COORDINATE, -MAX_COORDINATE));
        }
        let mean = model.update(&sums, &Point::new(0.0, 0.0));
        assert!(model.check_item(&mean).is_ok());
    }
}
