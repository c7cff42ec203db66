use meshmeans::cluster::assign::{assign, nearest};
use meshmeans::cluster::update::update_representatives;
use meshmeans::config::{RemainderPolicy, RunConfig};
use meshmeans::model::{ClusterModel, ItemKind, Point, PointModel, Strand, StrandModel, Symbol, SymbolCounts};
use meshmeans::session::run_standalone;
use proptest::prelude::*;

fn point() -> impl Strategy<Value = Point> {
    (-100.0f64..100.0, -100.0f64..100.0).prop_map(|(x, y)| Point::new(x, y))
}

fn strand(length: usize) -> impl Strategy<Value = Strand> {
    prop::collection::vec(prop::sample::select(Symbol::ALL.to_vec()), length).prop_map(Strand::new)
}

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(future)
}

fn points_run(workers: usize, clusters: usize, rounds: usize) -> RunConfig {
    RunConfig {
        workers,
        clusters,
        rounds,
        remainder: RemainderPolicy::Last,
        ..RunConfig::default()
    }
}

proptest! {
    #[test]
    fn prop_nearest_assignment(
        shard in prop::collection::vec(point(), 1..40),
        reps in prop::collection::vec(point(), 1..6),
    ) {
        let membership = assign(&PointModel, &shard, &reps).unwrap();
        prop_assert_eq!(membership.len(), shard.len());

        for (i, item) in shard.iter().enumerate() {
            let chosen = membership.cluster_of(i);
            let best = item.distance(&reps[chosen]);
            for (k, rep) in reps.iter().enumerate() {
                let d = item.distance(rep);
                prop_assert!(best <= d);
                // Ties go to the lowest index
                if k < chosen {
                    prop_assert!(d > best);
                }
            }
        }
    }

    #[test]
    fn prop_nearest_strand_assignment(
        shard in prop::collection::vec(strand(6), 1..30),
        reps in prop::collection::vec(strand(6), 1..5),
    ) {
        let model = StrandModel::new(6);
        for item in &shard {
            let chosen = nearest(&model, item, &reps).unwrap();
            let best = item.hamming(&reps[chosen]);
            for (k, rep) in reps.iter().enumerate() {
                let d = item.hamming(rep);
                prop_assert!(best <= d);
                if k < chosen {
                    prop_assert!(d > best);
                }
            }
        }
    }

    #[test]
    fn prop_plurality_is_a_maximum(a in 0u64..6, t in 0u64..6, c in 0u64..6, g in 0u64..6) {
        let counts = SymbolCounts { a, t, c, g };
        let chosen = match counts.plurality() {
            Symbol::A => a,
            Symbol::T => t,
            Symbol::C => c,
            Symbol::G => g,
        };
        prop_assert!(chosen >= a && chosen >= t && chosen >= c && chosen >= g);
        if counts.plurality() == Symbol::G {
            prop_assert!(g > a && g > t && g > c);
        }
    }

    #[test]
    fn prop_empty_update_is_identity(
        points in prop::collection::vec(point(), 1..8),
        strands in prop::collection::vec(strand(5), 1..8),
    ) {
        let global: Vec<_> = points.iter().map(|_| PointModel.empty_aggregate()).collect();
        prop_assert_eq!(update_representatives(&PointModel, &global, &points).unwrap(), points);

        let model = StrandModel::new(5);
        let global: Vec<_> = strands.iter().map(|_| model.empty_aggregate()).collect();
        prop_assert_eq!(update_representatives(&model, &global, &strands).unwrap(), strands);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_conservation_per_round(
        items in prop::collection::vec(point(), 8..60),
        workers in 1usize..4,
        clusters in 1usize..5,
    ) {
        let n = items.len();
        let outcome = block_on(run_standalone::<PointModel>(points_run(workers, clusters, 3), items)).unwrap();

        prop_assert_eq!(outcome.rounds, 3);
        prop_assert_eq!(outcome.history.len(), 3);
        prop_assert_eq!(outcome.items_processed, n);
        for summary in &outcome.history {
            prop_assert_eq!(summary.cluster_sizes.len(), clusters);
            prop_assert_eq!(summary.cluster_sizes.iter().sum::<u64>(), n as u64);
        }
    }

    #[test]
    fn prop_same_workers_same_result(
        items in prop::collection::vec(point(), 8..60),
        workers in 1usize..4,
        clusters in 1usize..5,
    ) {
        let first = block_on(run_standalone::<PointModel>(points_run(workers, clusters, 5), items.clone())).unwrap();
        let second = block_on(run_standalone::<PointModel>(points_run(workers, clusters, 5), items)).unwrap();
        prop_assert_eq!(first.representatives, second.representatives);
        prop_assert_eq!(first.history, second.history);
    }

    #[test]
    fn prop_strand_runs_conserve(
        items in prop::collection::vec(strand(8), 6..40),
        workers in 1usize..4,
        clusters in 1usize..4,
    ) {
        let n = items.len();
        let run = RunConfig {
            kind: ItemKind::Strands,
            workers,
            clusters,
            strand_length: 8,
            remainder: RemainderPolicy::Last,
            ..RunConfig::default()
        };

        let outcome = block_on(run_standalone::<StrandModel>(run, items)).unwrap();
        prop_assert_eq!(outcome.representatives.len(), clusters);
        prop_assert!(outcome.representatives.iter().all(|s| s.len() == 8));
        for summary in &outcome.history {
            prop_assert_eq!(summary.cluster_sizes.iter().sum::<u64>(), n as u64);
        }
    }
}

#[test]
fn four_points_two_workers() {
    let items = vec![
        Point::new(0.0, 0.0),
        Point::new(0.0, 1.0),
        Point::new(10.0, 10.0),
        Point::new(10.0, 11.0),
    ];
    let outcome = block_on(run_standalone::<PointModel>(points_run(2, 2, 5), items)).unwrap();

    assert_eq!(outcome.rounds, 5);
    assert_eq!(outcome.representatives, vec![Point::new(0.0, 0.5), Point::new(10.0, 10.5)]);
}

#[test]
fn two_strands_consensus() {
    let items: Vec<Strand> = vec!["aatt".parse().unwrap(), "aact".parse().unwrap()];
    for workers in 1..=2 {
        let run = RunConfig {
            kind: ItemKind::Strands,
            workers,
            clusters: 1,
            strand_length: 4,
            ..RunConfig::default()
        };
        let outcome = block_on(run_standalone::<StrandModel>(run, items.clone())).unwrap();
        assert_eq!(outcome.representatives[0].to_string(), "aact");
    }
}
