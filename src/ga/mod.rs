//! Genetic Algorithm for the TSP.
//!
//! Tours are permutations of node indices. Each generation keeps a small
//! elite, fills most of the population with order-crossover children,
//! adds swap-mutated copies of selected parents, and tops up with random
//! permutations to keep diversity from collapsing.
//!
//! # Key Types
//!
//! - [`GaConfig`]: Algorithm parameters (population size, ratios, selection)
//! - [`Quotas`]: Per-generation split of the population across operators
//! - [`GaRunner`]: Executes the evolutionary loop
//! - [`GaResult`]: Best tour plus convergence and diversity histories
//! - [`TourCost`]: Cost source the engine evaluates tours against
//!
//! # Submodules
//!
//! - [`operators`]: Population initialization, OX crossover, swap mutation,
//!   diversity
//!
//! # References
//!
//! - Holland (1975), *Adaptation in Natural and Artificial Systems*
//! - Goldberg (1989), *Genetic Algorithms in Search, Optimization, and Machine Learning*
//! - Davis (1985), "Applying Adaptive Algorithms to Epistatic Domains"

mod config;
pub mod operators;
mod runner;
mod selection;
mod types;

pub use config::{GaConfig, Quotas};
pub use runner::{GaResult, GaRunner, ProgressFn};
pub use selection::{Selection, ROULETTE_EPSILON};
pub use types::{is_permutation, Population, Tour, TourCost};
