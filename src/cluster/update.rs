//! Representative Updater (leader only)

use crate::error::MeshError;
use crate::model::ClusterModel;
use crate::Result;

/// Next round's representatives from this round's global aggregates
///
/// Clusters without members keep their previous representative.
pub fn update_representatives<M: ClusterModel>(
    model: &M,
    global: &[M::Aggregate],
    previous: &[M::Item],
) -> Result<Vec<M::Item>> {
    if global.len() != previous.len() {
        return Err(MeshError::Protocol {
            expected: format!("{} global aggregates", previous.len()),
            got: format!("{}", global.len()),
        }
        .into());
    }

    Ok(global
        .iter()
        .zip(previous)
        .map(|(aggregate, prev)| model.update(aggregate, prev))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Point, PointModel, PointSums, StrandModel};

    #[test]
    fn test_mean_update() {
        let global = vec![
            PointSums { sum_x: 0.0, sum_y: 1.0, count: 2 },
            PointSums { sum_x: 20.0, sum_y: 21.0, count: 2 },
        ];
        let previous = vec![Point::new(0.0, 0.0), Point::new(0.0, 1.0)];

        let next = update_representatives(&PointModel, &global, &previous).unwrap();
        assert_eq!(next, vec![Point::new(0.0, 0.5), Point::new(10.0, 10.5)]);
    }

    #[test]
    fn test_all_empty_is_identity() {
        let previous = vec![Point::new(3.0, 4.0), Point::new(-1.0, 7.5)];
        let global = vec![PointSums::default(); 2];
        assert_eq!(update_representatives(&PointModel, &global, &previous).unwrap(), previous);

        let model = StrandModel::new(3);
        let previous = vec!["gtc".parse().unwrap(), "tta".parse().unwrap()];
        let global = vec![model.empty_aggregate(), model.empty_aggregate()];
        assert_eq!(update_representatives(&model, &global, &previous).unwrap(), previous);
    }

    #[test]
    fn test_length_mismatch() {
        let previous = vec![Point::new(0.0, 0.0)];
        assert!(update_representatives(&PointModel, &[], &previous).is_err());
    }
}
