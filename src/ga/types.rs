//! Core types for the GA engine.
//!
//! A [`Tour`] is a permutation of node indices visited cyclically; a
//! [`Population`] is a fixed-size sequence of tours. The engine is generic
//! over [`TourCost`], the contract between the evolutionary loop and
//! whatever supplies edge costs.

/// A cyclic visiting order: a permutation of `0..n`.
pub type Tour = Vec<usize>;

/// A fixed-size sequence of tours.
pub type Population = Vec<Tour>;

/// Source of tour costs for the GA.
///
/// Lower cost is better (minimization). [`Instance`](crate::distance::Instance)
/// is the standard implementation; tests and benchmarks may plug their own.
///
/// # Thread Safety
///
/// `TourCost` must be `Sync` because fitness may be evaluated in parallel
/// when the `parallel` feature is enabled.
///
/// # Implementing
///
/// ```
/// use u_tsp::ga::TourCost;
///
/// struct Line(usize);
///
/// impl TourCost for Line {
///     fn node_count(&self) -> usize { self.0 }
///     fn cost(&self, tour: &[usize]) -> f64 {
///         tour.windows(2).map(|w| w[0].abs_diff(w[1]) as f64).sum()
///     }
/// }
/// ```
pub trait TourCost: Sync {
    /// Number of nodes every tour must visit.
    fn node_count(&self) -> usize;

    /// Total cyclic length of `tour`.
    fn cost(&self, tour: &[usize]) -> f64;
}

/// Whether `tour` is a permutation of `0..n`.
pub fn is_permutation(tour: &[usize], n: usize) -> bool {
    if tour.len() != n {
        return false;
    }
    let mut seen = vec![false; n];
    for &v in tour {
        if v >= n || seen[v] {
            return false;
        }
        seen[v] = true;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_permutation() {
        assert!(is_permutation(&[2, 0, 1], 3));
        assert!(is_permutation(&[], 0));
        assert!(!is_permutation(&[0, 0, 1], 3));
        assert!(!is_permutation(&[0, 1, 3], 3));
        assert!(!is_permutation(&[0, 1], 3));
    }
}
