//! GA evolutionary loop execution.
//!
//! [`GaRunner`] orchestrates the complete evolutionary process:
//! initialization → evaluation → elitism → crossover → mutation →
//! random injection → repeat, for a fixed number of generations.

use super::config::{GaConfig, Quotas};
use super::operators::{diversity, init_population, order_crossover, swap_mutation};
use super::types::{Population, Tour, TourCost};
use crate::error::{Error, Result};
use crate::random::{random_permutation, rng_from_seed};
use rand::Rng;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, trace, warn};

/// Per-generation progress hook.
///
/// Called once per generation with `(generation, best_tour, best_fitness)`
/// after the population has been evaluated. Returning an error aborts the
/// run with [`Error::Callback`].
pub type ProgressFn<'a> = dyn FnMut(usize, &[usize], f64) -> anyhow::Result<()> + 'a;

/// Result of a GA optimization run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GaResult {
    /// The shortest tour found during the entire run.
    pub best_tour: Tour,

    /// Length of `best_tour`.
    pub best_fitness: f64,

    /// Best-so-far fitness after each evaluated generation.
    ///
    /// Non-increasing by construction.
    pub convergence_history: Vec<f64>,

    /// Population diversity at each evaluated generation.
    pub diversity_history: Vec<f64>,

    /// Wall-clock time spent in each generation.
    pub generation_times: Vec<Duration>,

    /// Number of generations evaluated.
    pub generations: usize,

    /// Whether the run was cancelled externally.
    pub cancelled: bool,
}

/// Executes the GA evolutionary loop.
///
/// # Usage
///
/// ```ignore
/// let instance = Instance::from_points(&points)?;
/// let config = GaConfig::default().with_seed(42);
/// let result = GaRunner::run(&instance, &config)?;
/// println!("Best length: {}", result.best_fitness);
/// ```
pub struct GaRunner;

impl GaRunner {
    /// Runs the GA optimization.
    ///
    /// # Errors
    /// [`Error::Configuration`] for an invalid `config`, [`Error::Data`] for
    /// an instance without nodes.
    pub fn run<C: TourCost>(cost: &C, config: &GaConfig) -> Result<GaResult> {
        Self::run_with_cancel(cost, config, None, None)
    }

    /// Runs the GA, invoking `callback` once per generation.
    pub fn run_with_callback<C: TourCost>(
        cost: &C,
        config: &GaConfig,
        callback: &mut ProgressFn<'_>,
    ) -> Result<GaResult> {
        Self::run_with_cancel(cost, config, Some(callback), None)
    }

    /// Runs the GA with an optional progress callback and cancellation token.
    ///
    /// The flag is checked right after the callback; once it is set, the
    /// run stops and returns the best tour found so far with
    /// `cancelled = true`.
    #[instrument(
        level = "debug",
        skip_all,
        fields(
            nodes = cost.node_count(),
            population = config.population_size,
            generations = config.generations,
            seed = ?config.seed,
        )
    )]
    pub fn run_with_cancel<C: TourCost>(
        cost: &C,
        config: &GaConfig,
        mut callback: Option<&mut ProgressFn<'_>>,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<GaResult> {
        config.validate()?;
        let n = cost.node_count();
        if n == 0 {
            return Err(Error::Data("instance has no nodes".into()));
        }

        let quotas = Quotas::from_config(config);
        info!(?quotas, selection = ?config.selection, "starting GA run");

        let mut rng = rng_from_seed(config.seed);

        // 1. Initialize population
        let mut population = init_population(n, config.population_size, &mut rng);

        let mut best_tour: Tour = Vec::new();
        let mut best_fitness = f64::INFINITY;
        let mut convergence_history = Vec::with_capacity(config.generations);
        let mut diversity_history = Vec::with_capacity(config.generations);
        let mut generation_times = Vec::with_capacity(config.generations);
        let mut cancelled = false;

        // 2. Evolutionary loop
        for gen in 0..config.generations {
            let started = Instant::now();

            let fitness = evaluate_population(cost, &population, config.parallel);

            // Rank ascending (best first); stable, so ties keep population order
            let mut order: Vec<usize> = (0..population.len()).collect();
            order.sort_by(|&a, &b| {
                fitness[a]
                    .partial_cmp(&fitness[b])
                    .unwrap_or(std::cmp::Ordering::Equal)
            });

            let gen_best = order[0];
            if fitness[gen_best] < best_fitness {
                best_fitness = fitness[gen_best];
                best_tour = population[gen_best].clone();
                debug!(generation = gen, best_fitness, "new best tour");
            }

            let div = diversity(&population);
            convergence_history.push(best_fitness);
            diversity_history.push(div);
            trace!(generation = gen, best_fitness, diversity = div, "generation evaluated");

            if let Some(cb) = callback.as_deref_mut() {
                if let Err(err) = cb(gen, best_tour.as_slice(), best_fitness) {
                    warn!(generation = gen, error = %err, "progress callback failed, aborting run");
                    return Err(Error::Callback(err));
                }
            }

            if let Some(ref flag) = cancel {
                if flag.load(Ordering::Relaxed) {
                    cancelled = true;
                    generation_times.push(started.elapsed());
                    break;
                }
            }

            population = next_generation(&population, &fitness, &order, &quotas, config, &mut rng);
            generation_times.push(started.elapsed());
        }

        let generations = convergence_history.len();
        info!(best_fitness, generations, cancelled, "GA run finished");

        Ok(GaResult {
            best_tour,
            best_fitness,
            convergence_history,
            diversity_history,
            generation_times,
            generations,
            cancelled,
        })
    }

    /// Runs one independent GA per seed.
    ///
    /// Each trial uses `config` with its seed replaced, so trials share no
    /// random state. With the `parallel` feature and `config.parallel` set,
    /// trials run concurrently; results stay in `seeds` order.
    pub fn run_trials<C: TourCost>(
        cost: &C,
        config: &GaConfig,
        seeds: &[u64],
    ) -> Vec<Result<GaResult>> {
        let run_one = |&seed: &u64| Self::run(cost, &config.clone().with_seed(seed));

        #[cfg(feature = "parallel")]
        if config.parallel {
            return seeds.par_iter().map(run_one).collect();
        }

        seeds.iter().map(run_one).collect()
    }
}

/// Evaluate all individuals in the population.
#[cfg_attr(not(feature = "parallel"), allow(unused_variables))]
fn evaluate_population<C: TourCost>(cost: &C, population: &[Tour], parallel: bool) -> Vec<f64> {
    #[cfg(feature = "parallel")]
    if parallel {
        return population.par_iter().map(|t| cost.cost(t)).collect();
    }

    population.iter().map(|t| cost.cost(t)).collect()
}

/// Builds the next population: elites, crossover children, mutants, and
/// random immigrants, in that order.
fn next_generation<R: Rng>(
    population: &[Tour],
    fitness: &[f64],
    order: &[usize],
    quotas: &Quotas,
    config: &GaConfig,
    rng: &mut R,
) -> Population {
    let n = population[0].len();
    let mut next = Vec::with_capacity(quotas.total());

    // Elite preservation
    next.extend(order[..quotas.elite].iter().map(|&i| population[i].clone()));

    // Crossover offspring, mutated with probability
    for _ in 0..quotas.crossover {
        let a = &population[config.selection.select(fitness, rng)];
        let b = &population[config.selection.select(fitness, rng)];
        let mut child = order_crossover(a, b, rng);
        if rng.random_bool(config.mutation_probability) {
            swap_mutation(&mut child, rng);
        }
        next.push(child);
    }

    // Pure mutation of a selected parent
    for _ in 0..quotas.mutation {
        let mut child = config.selection.pick(population, fitness, rng);
        swap_mutation(&mut child, rng);
        next.push(child);
    }

    // Random immigrants
    for _ in 0..quotas.random {
        next.push(random_permutation(n, rng));
    }

    next
}

// ============================================================================
// Tests
// ============================================================================
