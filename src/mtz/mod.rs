//! Exact TSP via the Miller-Tucker-Zemlin integer program.
//!
//! # Key Components
//!
//! - **Model**: [`MtzModel`]: binary edge variables, continuous position
//!   variables, degree and subtour-elimination rows
//! - **Solver**: [`MipSolver`] trait: interface for MIP backends
//! - **Backend**: [`MicroLpSolver`]: pure-Rust branch-and-bound via `good_lp`
//! - **Entry point**: [`solve_exact`]: build, solve, reconstruct the route
//!
//! # Design
//!
//! The model is backend-neutral: rows are plain `(variable, coefficient)`
//! lists that each [`MipSolver`] translates into its own problem type.
//!
//! # References
//!
//! Miller, Tucker & Zemlin (1960), "Integer Programming Formulation of
//! Traveling Salesman Problems"

mod model;
mod solver;

pub use model::{ConstraintKind, Edge, LinearConstraint, MtzModel, Sense, Var};
pub use solver::{
    reconstruct_route, solve_exact, ExactSolution, MicroLpSolver, MipOutcome, MipSolver,
    SolverConfig, SolverStatus,
};
