//! Seeded random number generation.
//!
//! Every run owns one generator. Two runs built from the same seed draw
//! identical streams, which is what makes GA runs reproducible.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Creates a deterministic generator from a seed.
pub fn create_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Creates a generator from an optional seed.
///
/// `None` draws a fresh seed from the thread-local generator.
pub fn rng_from_seed(seed: Option<u64>) -> StdRng {
    create_rng(seed.unwrap_or_else(rand::random))
}

/// Uniform random permutation of `0..n`.
pub fn random_permutation<R: Rng>(n: usize, rng: &mut R) -> Vec<usize> {
    let mut perm: Vec<usize> = (0..n).collect();
    perm.shuffle(rng);
    perm
}
