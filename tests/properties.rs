//! Property-based tests for the permutation operators, the population
//! split, and the distance model.

use proptest::prelude::*;
use u_tsp::distance::{build_distance_matrix, tour_length, Metric, Point};
use u_tsp::ga::operators::{order_crossover, order_crossover_at, swap_mutation};
use u_tsp::ga::{is_permutation, GaConfig, Quotas};
use u_tsp::random::{create_rng, random_permutation};

fn point() -> impl Strategy<Value = Point> {
    (-1000.0..1000.0f64, -1000.0..1000.0f64).prop_map(|(x, y)| Point::new(x, y))
}

fn geo_point() -> impl Strategy<Value = Point> {
    (-89.59..89.59f64, -179.59..179.59f64).prop_map(|(lat, lon)| Point::new(lat, lon))
}

proptest! {
    #[test]
    fn ox_child_is_permutation(n in 2usize..40, seed in any::<u64>()) {
        let mut rng = create_rng(seed);
        let a = random_permutation(n, &mut rng);
        let b = random_permutation(n, &mut rng);
        let child = order_crossover(&a, &b, &mut rng);
        prop_assert!(is_permutation(&child, n));
    }

    #[test]
    fn ox_segment_copied_and_rest_in_donor_order(
        n in 2usize..30,
        seed in any::<u64>(),
        cuts in (0usize..1000, 0usize..1000),
    ) {
        let mut rng = create_rng(seed);
        let a = random_permutation(n, &mut rng);
        let b = random_permutation(n, &mut rng);
        let (x, y) = (cuts.0 % n, cuts.1 % n);
        let (start, end) = (x.min(y), x.max(y));

        let child = order_crossover_at(&a, &b, start, end);
        prop_assert_eq!(&child[start..=end], &a[start..=end]);

        let segment = &a[start..=end];
        let outside: Vec<usize> = child
            .iter()
            .enumerate()
            .filter(|&(i, _)| i < start || i > end)
            .map(|(_, &v)| v)
            .collect();
        let donor: Vec<usize> = b.iter().copied().filter(|v| !segment.contains(v)).collect();
        prop_assert_eq!(outside, donor);
    }

    #[test]
    fn swap_moves_exactly_two_genes(n in 2usize..50, seed in any::<u64>()) {
        let mut rng = create_rng(seed);
        let original = random_permutation(n, &mut rng);
        let mut tour = original.clone();
        swap_mutation(&mut tour, &mut rng);
        prop_assert!(is_permutation(&tour, n));
        let moved = tour.iter().zip(&original).filter(|(a, b)| a != b).count();
        prop_assert_eq!(moved, 2);
    }

    #[test]
    fn quotas_sum_to_population(
        size in 1usize..2000,
        elite in 0.0..=1.0f64,
        crossover in 0.0..=1.0f64,
        mutation in 0.0..=1.0f64,
    ) {
        let config = GaConfig::default()
            .with_population_size(size)
            .with_elite_ratio(elite)
            .with_crossover_ratio(crossover)
            .with_mutation_ratio(mutation);
        let q = Quotas::from_config(&config);
        prop_assert_eq!(q.total(), size);
        prop_assert!(q.elite >= 1);
    }

    #[test]
    fn planar_matrix_is_symmetric_with_zero_diagonal(
        points in prop::collection::vec(point(), 1..25)
    ) {
        let m = build_distance_matrix(&points, Metric::Planar);
        prop_assert!(m.is_symmetric());
        for i in 0..m.len() {
            prop_assert_eq!(m.get(i, i), 0.0);
            for j in 0..m.len() {
                prop_assert!(m.get(i, j) >= 0.0);
            }
        }
    }

    #[test]
    fn geodesic_matrix_is_symmetric_integral(
        points in prop::collection::vec(geo_point(), 1..15)
    ) {
        let m = build_distance_matrix(&points, Metric::Geodesic);
        prop_assert!(m.is_symmetric());
        for i in 0..m.len() {
            prop_assert_eq!(m.get(i, i), 0.0);
            for j in 0..m.len() {
                prop_assert_eq!(m.get(i, j).fract(), 0.0);
            }
        }
    }

    #[test]
    fn tour_length_matches_matrix(
        points in prop::collection::vec(point(), 2..20),
        seed in any::<u64>(),
    ) {
        let mut rng = create_rng(seed);
        let tour = random_permutation(points.len(), &mut rng);
        let m = build_distance_matrix(&points, Metric::Planar);
        let direct = tour_length(&tour, &points, None);
        let cached = tour_length(&tour, &points, Some(&m));
        prop_assert!((direct - cached).abs() <= 1e-9 * direct.max(1.0));
    }

    #[test]
    fn tour_length_invariant_under_rotation(
        points in prop::collection::vec(point(), 2..20),
        shift in 0usize..20,
    ) {
        let tour: Vec<usize> = (0..points.len()).collect();
        let mut rotated = tour.clone();
        rotated.rotate_left(shift % points.len());
        let a = tour_length(&tour, &points, None);
        let b = tour_length(&rotated, &points, None);
        prop_assert!((a - b).abs() <= 1e-9 * a.max(1.0));
    }
}
