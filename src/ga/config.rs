//! GA configuration.
//!
//! [`GaConfig`] holds all parameters that control the evolutionary loop.
//! [`Quotas`] turns its ratios into the per-generation split of the
//! population across elitism, crossover, mutation, and random injection.

use super::selection::Selection;
use crate::error::{Error, Result};

/// Configuration for the TSP genetic algorithm.
///
/// # Defaults
///
/// ```
/// use u_tsp::ga::GaConfig;
///
/// let config = GaConfig::default();
/// assert_eq!(config.population_size, 300);
/// assert_eq!(config.generations, 1000);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_tsp::ga::{GaConfig, Selection};
///
/// let config = GaConfig::default()
///     .with_population_size(200)
///     .with_selection(Selection::Tournament(5))
///     .with_elite_ratio(0.05)
///     .with_mutation_ratio(0.2)
///     .with_mutation_probability(0.1);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GaConfig {
    /// Number of tours in the population. Constant across generations.
    pub population_size: usize,

    /// Number of generations to run. There is no early stopping.
    pub generations: usize,

    /// Fraction of the population carried over unchanged (at least one).
    pub elite_ratio: f64,

    /// Fraction of the population produced by order crossover.
    pub crossover_ratio: f64,

    /// Fraction of the population produced by pure mutation of a selected
    /// parent.
    ///
    /// `None` means "whatever elitism and crossover leave":
    /// `max(0, 1 - elite_ratio - crossover_ratio)`.
    pub mutation_ratio: Option<f64>,

    /// Probability that a crossover child also receives a swap mutation.
    pub mutation_probability: f64,

    /// Parent selection policy.
    pub selection: Selection,

    /// Random seed for reproducibility.
    ///
    /// `None` uses a random seed.
    pub seed: Option<u64>,

    /// Whether to evaluate fitness in parallel.
    ///
    /// Only has an effect with the `parallel` feature. Results are identical
    /// either way.
    pub parallel: bool,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population_size: 300,
            generations: 1000,
            elite_ratio: 0.02,
            crossover_ratio: 0.7,
            mutation_ratio: None,
            mutation_probability: 0.2,
            selection: Selection::default(),
            seed: None,
            parallel: false,
        }
    }
}

impl GaConfig {
    /// Sets the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the number of generations.
    pub fn with_generations(mut self, n: usize) -> Self {
        self.generations = n;
        self
    }

    /// Sets the elite ratio.
    pub fn with_elite_ratio(mut self, ratio: f64) -> Self {
        self.elite_ratio = ratio;
        self
    }

    /// Sets the crossover ratio.
    pub fn with_crossover_ratio(mut self, ratio: f64) -> Self {
        self.crossover_ratio = ratio;
        self
    }

    /// Sets an explicit mutation ratio.
    pub fn with_mutation_ratio(mut self, ratio: f64) -> Self {
        self.mutation_ratio = Some(ratio);
        self
    }

    /// Sets the per-child mutation probability for crossover offspring.
    pub fn with_mutation_probability(mut self, p: f64) -> Self {
        self.mutation_probability = p;
        self
    }

    /// Sets the selection strategy.
    pub fn with_selection(mut self, sel: Selection) -> Self {
        self.selection = sel;
        self
    }

    /// Convenience builder for setting tournament size.
    ///
    /// Equivalent to `.with_selection(Selection::Tournament(k))`.
    pub fn with_tournament_size(self, k: usize) -> Self {
        self.with_selection(Selection::Tournament(k))
    }

    /// Sets the random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Enables or disables parallel fitness evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// The mutation ratio in effect, resolving the default.
    pub fn effective_mutation_ratio(&self) -> f64 {
        self.mutation_ratio
            .unwrap_or_else(|| (1.0 - self.elite_ratio - self.crossover_ratio).max(0.0))
    }

    /// Validates the configuration.
    ///
    /// Returns [`Error::Configuration`] describing the first invalid
    /// parameter.
    pub fn validate(&self) -> Result<()> {
        if self.population_size == 0 {
            return Err(Error::Configuration(
                "population_size must be at least 1".into(),
            ));
        }
        if self.generations == 0 {
            return Err(Error::Configuration("generations must be at least 1".into()));
        }
        check_unit("elite_ratio", self.elite_ratio)?;
        check_unit("crossover_ratio", self.crossover_ratio)?;
        if let Some(ratio) = self.mutation_ratio {
            check_unit("mutation_ratio", ratio)?;
        }
        check_unit("mutation_probability", self.mutation_probability)?;
        if let Selection::Tournament(0) = self.selection {
            return Err(Error::Configuration(
                "tournament size must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

fn check_unit(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(Error::Configuration(format!(
            "{name} must lie in [0, 1], got {value}"
        )))
    }
}

/// How each generation's population is split across operator classes.
///
/// Clamping runs in a fixed order (elite, crossover, mutation), and the
/// random quota absorbs whatever is left, so the four always sum to the
/// population size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Quotas {
    /// Best individuals copied verbatim.
    pub elite: usize,
    /// Order-crossover children.
    pub crossover: usize,
    /// Selected parents with an unconditional swap mutation.
    pub mutation: usize,
    /// Fresh random permutations.
    pub random: usize,
}

impl Quotas {
    /// Computes the split for a validated configuration.
    pub fn from_config(config: &GaConfig) -> Self {
        let n = config.population_size;
        let share = |ratio: f64| (ratio * n as f64).floor().max(0.0) as usize;

        let elite = share(config.elite_ratio).max(1).min(n);
        let crossover = share(config.crossover_ratio).min(n - elite);
        let mutation = share(config.effective_mutation_ratio()).min(n - elite - crossover);
        let random = n - elite - crossover - mutation;

        Self {
            elite,
            crossover,
            mutation,
            random,
        }
    }

    /// Sum of all quotas (equals the population size).
    pub fn total(&self) -> usize {
        self.elite + self.crossover + self.mutation + self.random
    }
}
