//! Permutation operators for tour populations.
//!
//! All operators work on plain `usize` index vectors and never touch a
//! tour that is already ranked in a population: crossover builds a new
//! child, mutation acts on the caller's owned copy.
//!
//! # Operators
//!
//! - [`init_population`]: independent uniform random permutations
//! - [`order_crossover`] (OX): Davis (1985), preserves relative order
//! - [`swap_mutation`]: exchange two distinct positions, O(1)
//! - [`diversity`]: share of distinct tours in a population
//!
//! # References
//!
//! - Davis (1985), "Applying Adaptive Algorithms to Epistatic Domains"
//! - Cicirello (2023), "Genetic Operators for Permutation Representation"

use super::types::{Population, Tour};
use crate::random::random_permutation;
use rand::seq::index;
use rand::Rng;
use std::collections::HashSet;

// ============================================================================
// Initialization
// ============================================================================

/// Creates `size` independent uniform random permutations of `0..n`.
///
/// The population is a pure function of the generator state, so a seeded
/// generator reproduces it exactly.
pub fn init_population<R: Rng>(n: usize, size: usize, rng: &mut R) -> Population {
    (0..size).map(|_| random_permutation(n, rng)).collect()
}

// ============================================================================
// Crossover
// ============================================================================

/// Order Crossover (OX) producing a single child.
///
/// Two distinct cut points `a < b` are drawn uniformly from `0..n`, then
/// [`order_crossover_at`] builds the child.
///
/// # Complexity
/// O(n) time, O(n) space
///
/// # Panics
/// Panics if parents have different lengths.
pub fn order_crossover<R: Rng>(parent_a: &[usize], parent_b: &[usize], rng: &mut R) -> Tour {
    let n = parent_a.len();
    assert_eq!(n, parent_b.len(), "parents must have equal length");

    if n < 2 {
        return parent_a.to_vec();
    }

    let (start, end) = random_cut_points(n, rng);
    order_crossover_at(parent_a, parent_b, start, end)
}

/// Deterministic OX kernel with explicit cut points.
///
/// 1. Copy `parent_a[start..=end]` into the same positions of the child
/// 2. Fill the remaining positions left to right, starting at position 0,
///    with `parent_b`'s values in `parent_b`'s order, skipping any value
///    already copied
///
/// ```
/// use u_tsp::ga::operators::order_crossover_at;
///
/// let child = order_crossover_at(&[0, 1, 2, 3, 4], &[4, 3, 2, 1, 0], 1, 3);
/// assert_eq!(child, vec![4, 1, 2, 3, 0]);
/// ```
///
/// # Panics
/// Panics if parents have different lengths or `start > end` or
/// `end >= n`.
pub fn order_crossover_at(
    parent_a: &[usize],
    parent_b: &[usize],
    start: usize,
    end: usize,
) -> Tour {
    let n = parent_a.len();
    assert_eq!(n, parent_b.len(), "parents must have equal length");
    assert!(start <= end && end < n, "invalid cut points {start}..={end} for length {n}");

    let mut child = vec![usize::MAX; n];
    let mut in_segment = vec![false; n];

    for i in start..=end {
        child[i] = parent_a[i];
        in_segment[parent_a[i]] = true;
    }

    let mut donor = parent_b.iter().copied().filter(|&v| !in_segment[v]);
    for slot in child.iter_mut().filter(|slot| **slot == usize::MAX) {
        *slot = donor
            .next()
            .expect("valid permutations: donor covers every free slot");
    }

    child
}

/// Two distinct cut points `a < b` in `0..n`.
fn random_cut_points<R: Rng>(n: usize, rng: &mut R) -> (usize, usize) {
    let cuts = index::sample(rng, n, 2);
    let (a, b) = (cuts.index(0), cuts.index(1));
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

// ============================================================================
// Mutation
// ============================================================================

/// Swap mutation: exchange the values at two distinct random positions.
///
/// No-op for tours shorter than two.
///
/// # Complexity
/// O(1)
pub fn swap_mutation<R: Rng>(tour: &mut [usize], rng: &mut R) {
    let n = tour.len();
    if n < 2 {
        return;
    }
    let (i, j) = random_cut_points(n, rng);
    tour.swap(i, j);
}

// ============================================================================
// Diversity
// ============================================================================

/// Fraction of the population made of distinct tours.
///
/// `1.0` means every tour differs; values near `1 / len` signal
/// premature convergence. An empty population has diversity `0.0`.
pub fn diversity(population: &[Tour]) -> f64 {
    if population.is_empty() {
        return 0.0;
    }
    let unique: HashSet<&[usize]> = population.iter().map(Vec::as_slice).collect();
    unique.len() as f64 / population.len() as f64
}

// ============================================================================
// Tests
// ============================================================================
