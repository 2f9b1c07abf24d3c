//! Parent selection policies.
//!
//! Selection picks the parents that feed crossover and pure mutation.
//! Both policies work against a fitness slice that is index-aligned with
//! the current population.
//!
//! # References
//!
//! - Blickle & Thiele (1996), "A Comparison of Selection Schemes used in
//!   Evolutionary Algorithms"
//! - Goldberg & Deb (1991), "A Comparative Analysis of Selection Schemes
//!   Used in Genetic Algorithms"

use super::types::Tour;
use rand::seq::index;
use rand::Rng;

/// Offset added to every fitness before inversion in roulette selection.
pub const ROULETTE_EPSILON: f64 = 1e-8;

/// Selection strategy for choosing parents.
///
/// All strategies assume **minimization** (lower tour length = better).
///
/// # Examples
///
/// ```
/// use u_tsp::ga::Selection;
///
/// // Tournament of 3 distinct contestants
/// let sel = Selection::Tournament(3);
///
/// // Inverse-length roulette wheel
/// let sel = Selection::Roulette;
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Selection {
    /// Tournament selection: draw `k` distinct individuals, keep the best.
    ///
    /// Contestants are drawn without replacement; `k` larger than the
    /// population is clamped. Ties go to the earliest draw.
    ///
    /// # Complexity
    /// O(k) per selection
    Tournament(usize),

    /// Fitness-proportionate (roulette wheel) selection.
    ///
    /// Each individual is weighted by `1 / (length + ε)` with
    /// ε = [`ROULETTE_EPSILON`], so shorter tours are likelier.
    ///
    /// # Complexity
    /// O(n) per selection (linear scan)
    Roulette,
}

impl Default for Selection {
    fn default() -> Self {
        Selection::Tournament(3)
    }
}

impl Selection {
    /// Select a parent index given the population's fitness values.
    ///
    /// # Panics
    /// Panics if `fitness` is empty.
    pub fn select<R: Rng>(&self, fitness: &[f64], rng: &mut R) -> usize {
        assert!(!fitness.is_empty(), "cannot select from empty population");

        match self {
            Selection::Tournament(k) => tournament(fitness, *k, rng),
            Selection::Roulette => roulette(fitness, rng),
        }
    }

    /// Select a parent and return an owned copy of its tour.
    ///
    /// `population` and `fitness` must be index-aligned.
    pub fn pick<R: Rng>(&self, population: &[Tour], fitness: &[f64], rng: &mut R) -> Tour {
        debug_assert_eq!(population.len(), fitness.len());
        population[self.select(fitness, rng)].clone()
    }
}

/// Tournament selection without replacement.
fn tournament<R: Rng>(fitness: &[f64], k: usize, rng: &mut R) -> usize {
    let n = fitness.len();
    let k = k.clamp(1, n);

    let mut contestants = index::sample(rng, n, k).into_iter();
    let mut best_idx = contestants.next().expect("k >= 1 contestants");
    for idx in contestants {
        if fitness[idx] < fitness[best_idx] {
            best_idx = idx;
        }
    }
    best_idx
}

/// Roulette wheel selection with weights `1 / (fitness + ε)`.
fn roulette<R: Rng>(fitness: &[f64], rng: &mut R) -> usize {
    let n = fitness.len();
    if n == 1 {
        return 0;
    }

    let weights: Vec<f64> = fitness
        .iter()
        .map(|&f| 1.0 / (f + ROULETTE_EPSILON))
        .collect();

    let total: f64 = weights.iter().sum();
    if !total.is_finite() || total <= 0.0 {
        return rng.random_range(0..n);
    }

    let threshold = rng.random_range(0.0..total);
    let mut cumulative = 0.0;
    for (i, &w) in weights.iter().enumerate() {
        cumulative += w;
        if cumulative > threshold {
            return i;
        }
    }

    n - 1 // floating-point fallback
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::create_rng;

    #[test]
    fn test_tournament_full_size_always_best() {
        let fitness = [10.0, 5.0, 1.0, 8.0];
        let mut rng = create_rng(42);

        // Without replacement, k = n sees everyone.
        for _ in 0..200 {
            assert_eq!(Selection::Tournament(4).select(&fitness, &mut rng), 2);
        }
    }

    #[test]
    fn test_tournament_oversized_k_clamped() {
        let fitness = [3.0, 2.0];
        let mut rng = create_rng(42);
        assert_eq!(Selection::Tournament(10).select(&fitness, &mut rng), 1);
    }

    #[test]
    fn test_tournament_size_1_is_random() {
        let fitness = [10.0, 5.0, 1.0, 8.0];
        let mut rng = create_rng(42);

        let mut counts = [0u32; 4];
        let n = 10000;
        for _ in 0..n {
            let idx = Selection::Tournament(1).select(&fitness, &mut rng);
            counts[idx] += 1;
        }
        for &c in &counts {
            assert!(c > 1500, "expected uniform, got counts: {counts:?}");
        }
    }

    #[test]
    fn test_tournament_never_picks_worst_with_k2_of_2() {
        let fitness = [9.0, 1.0];
        let mut rng = create_rng(3);
        for _ in 0..100 {
            assert_eq!(Selection::Tournament(2).select(&fitness, &mut rng), 1);
        }
    }

    #[test]
    fn test_tournament_equal_fitness_is_uniform() {
        let fitness = [5.0, 5.0, 5.0, 5.0];
        let mut rng = create_rng(42);

        let mut counts = [0u32; 4];
        let n = 10000;
        for _ in 0..n {
            let idx = Selection::Tournament(2).select(&fitness, &mut rng);
            counts[idx] += 1;
        }
        for &c in &counts {
            assert!(
                c > 1500,
                "expected roughly uniform with equal fitness, got {counts:?}"
            );
        }
    }

    #[test]
    fn test_tournament_ties_go_to_first_draw() {
        let fitness = [5.0; 6];
        for seed in 0..50 {
            let first = index::sample(&mut create_rng(seed), 6, 3).index(0);
            let picked = Selection::Tournament(3).select(&fitness, &mut create_rng(seed));
            assert_eq!(picked, first, "seed {seed}");
        }
    }

    #[test]
    fn test_tournament_tie_with_best_keeps_earlier_draw() {
        // Indices 1 and 3 share the best fitness; k = n sees both.
        let fitness = [9.0, 2.0, 7.0, 2.0];
        for seed in 0..50 {
            let draws = index::sample(&mut create_rng(seed), 4, 4).into_vec();
            let expected = *draws.iter().find(|&&i| fitness[i] == 2.0).unwrap();
            let picked = Selection::Tournament(4).select(&fitness, &mut create_rng(seed));
            assert_eq!(picked, expected, "seed {seed}");
        }
    }

    #[test]
    fn test_roulette_favors_best() {
        let fitness = [100.0, 50.0, 1.0, 80.0];
        let mut rng = create_rng(42);

        let mut counts = [0u32; 4];
        let n = 10000;
        for _ in 0..n {
            let idx = Selection::Roulette.select(&fitness, &mut rng);
            counts[idx] += 1;
        }
        // Weight of index 2 is ~95% of the wheel.
        assert!(counts[2] > 9000, "got {counts:?}");
        assert!(counts[1] > counts[0]);
    }

    #[test]
    fn test_roulette_zero_fitness_guarded() {
        let fitness = [0.0, 10.0];
        let mut rng = create_rng(42);
        let idx = Selection::Roulette.select(&fitness, &mut rng);
        assert!(idx < 2);
    }

    #[test]
    fn test_single_individual() {
        let fitness = [5.0];
        let mut rng = create_rng(42);

        assert_eq!(Selection::Tournament(3).select(&fitness, &mut rng), 0);
        assert_eq!(Selection::Roulette.select(&fitness, &mut rng), 0);
    }

    #[test]
    fn test_pick_returns_copy() {
        let population = vec![vec![0, 1, 2], vec![2, 1, 0]];
        let fitness = [3.0, 1.0];
        let mut rng = create_rng(42);
        let mut tour = Selection::Tournament(2).pick(&population, &fitness, &mut rng);
        assert_eq!(tour, vec![2, 1, 0]);
        tour.swap(0, 1);
        assert_eq!(population[1], vec![2, 1, 0]);
    }

    #[test]
    #[should_panic(expected = "cannot select from empty population")]
    fn test_empty_population_panics() {
        let mut rng = create_rng(42);
        Selection::Tournament(3).select(&[], &mut rng);
    }
}
