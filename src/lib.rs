//! Traveling Salesman Problem solvers.
//!
//! Two independent engines search for short closed tours over a fixed set
//! of points:
//!
//! - **Genetic Algorithm (GA)**: permutation-encoded population with
//!   elitism, order crossover, swap mutation, and random-immigrant
//!   injection. See [`ga`].
//! - **Exact MTZ formulation**: the Miller-Tucker-Zemlin integer program,
//!   handed to a pluggable MIP backend. See [`mtz`].
//!
//! Both consume the [`distance`] model: planar Euclidean or TSPLIB
//! geodesic distances, evaluated on demand or precomputed into a
//! [`DistanceMatrix`](distance::DistanceMatrix).
//!
//! # Example
//!
//! ```no_run
//! use u_tsp::distance::{Instance, Point};
//! use u_tsp::ga::{GaConfig, GaRunner};
//!
//! let points = vec![
//!     Point::new(0.0, 0.0),
//!     Point::new(1.0, 0.0),
//!     Point::new(1.0, 1.0),
//!     Point::new(0.0, 1.0),
//! ];
//! let instance = Instance::from_points(&points)?;
//! let config = GaConfig::default()
//!     .with_population_size(50)
//!     .with_generations(100)
//!     .with_seed(42);
//! let result = GaRunner::run(&instance, &config)?;
//! println!("best length: {}", result.best_fitness);
//! # Ok::<(), u_tsp::Error>(())
//! ```
//!
//! Instance-file parsing, plotting, and result aggregation are left to
//! consumers.

pub mod distance;
mod error;
pub mod ga;
pub mod mtz;
pub mod random;

pub use error::{Error, Result};
