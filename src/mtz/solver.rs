//! MIP backend interface, the bundled `microlp` backend, and the exact
//! TSP entry point.

use super::model::{MtzModel, Sense, Var};
use crate::distance::DistanceMatrix;
use crate::error::{Error, Result};
use good_lp::solvers::microlp::microlp;
use good_lp::{
    constraint, variable, Expression, ProblemVariables, ResolutionError, Solution, SolverModel,
    Variable,
};
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, trace, warn};

/// Status reported by a MIP backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SolverStatus {
    /// Proven optimal solution found.
    Optimal,
    /// The wall-clock limit expired before the backend returned.
    TimeLimitReached,
    /// No feasible solution exists.
    Infeasible,
    /// Objective is unbounded below.
    Unbounded,
    /// The backend returned without a recognizable verdict.
    Unknown,
}

impl SolverStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SolverStatus::Optimal => "Optimal",
            SolverStatus::TimeLimitReached => "Not Solved",
            SolverStatus::Infeasible => "Infeasible",
            SolverStatus::Unbounded => "Unbounded",
            SolverStatus::Unknown => "Undefined",
        }
    }
}

impl fmt::Display for SolverStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Solver configuration.
#[derive(Debug, Clone, Default)]
pub struct SolverConfig {
    /// Wall-clock limit. `None` waits for the backend indefinitely.
    pub time_limit: Option<Duration>,
}

impl SolverConfig {
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    pub fn with_time_limit_secs(self, secs: u64) -> Self {
        self.with_time_limit(Duration::from_secs(secs))
    }
}

/// What a backend hands back: a status and, when it found a solution, one
/// value per edge variable in [`MtzModel::edges`] order.
#[derive(Debug, Clone, PartialEq)]
pub struct MipOutcome {
    pub status: SolverStatus,
    pub edge_values: Vec<f64>,
}

impl MipOutcome {
    /// Creates an outcome without variable values.
    pub fn empty(status: SolverStatus) -> Self {
        Self {
            status,
            edge_values: Vec::new(),
        }
    }
}

/// Trait for MIP backends.
///
/// Implementors translate an [`MtzModel`] into their own problem
/// representation and report edge-variable values back. Failures the
/// backend cannot classify are returned as [`Error::Solver`] with the raw
/// message.
pub trait MipSolver {
    fn solve(&self, model: &MtzModel, config: &SolverConfig) -> Result<MipOutcome>;
}

/// Branch-and-bound backend on top of `good_lp`'s pure-Rust `microlp`
/// LP solver.
///
/// The search runs depth-first on the calling thread. Each node fixes
/// some edge variables to 0 or 1 and solves the LP relaxation; the most
/// fractional edge is branched on, and nodes whose relaxation cannot beat
/// the incumbent are pruned. The deadline is checked before every node,
/// so a time limit stops the search itself and nothing keeps running once
/// `solve` returns.
#[derive(Debug, Clone, Copy, Default)]
pub struct MicroLpSolver;

impl MicroLpSolver {
    pub fn new() -> Self {
        Self
    }
}

/// Distance from the nearest integer below which a value counts as integral.
const INTEGRALITY_TOLERANCE: f64 = 1e-6;

/// Slack for comparing relaxation bounds against the incumbent.
const PRUNE_TOLERANCE: f64 = 1e-9;

/// Outcome of one LP relaxation.
enum Relaxation {
    Solved { objective: f64, edge_values: Vec<f64> },
    Infeasible,
    Unbounded,
}

impl MipSolver for MicroLpSolver {
    fn solve(&self, model: &MtzModel, config: &SolverConfig) -> Result<MipOutcome> {
        let deadline = config.time_limit.map(|limit| Instant::now() + limit);

        // Per-edge bounds; both 0 or both 1 once an edge is fixed.
        let mut stack: Vec<Vec<(f64, f64)>> = vec![vec![(0.0, 1.0); model.edges().len()]];
        let mut incumbent: Option<(f64, Vec<f64>)> = None;
        let mut nodes = 0usize;

        while let Some(bounds) = stack.pop() {
            if deadline.is_some_and(|d| Instant::now() >= d) {
                warn!(nodes, open = stack.len() + 1, "time limit reached");
                return Ok(MipOutcome::empty(SolverStatus::TimeLimitReached));
            }
            nodes += 1;

            let (objective, edge_values) = match solve_relaxation(model, &bounds)? {
                Relaxation::Solved {
                    objective,
                    edge_values,
                } => (objective, edge_values),
                Relaxation::Infeasible => continue,
                Relaxation::Unbounded if nodes == 1 => {
                    return Ok(MipOutcome::empty(SolverStatus::Unbounded));
                }
                Relaxation::Unbounded => continue,
            };

            if let Some((best, _)) = &incumbent {
                if objective >= best - PRUNE_TOLERANCE {
                    continue;
                }
            }

            match most_fractional(&edge_values) {
                Some(k) => {
                    let mut at_zero = bounds.clone();
                    at_zero[k] = (0.0, 0.0);
                    let mut at_one = bounds;
                    at_one[k] = (1.0, 1.0);
                    // Popped first: the branch that uses the edge.
                    stack.push(at_zero);
                    stack.push(at_one);
                }
                None => {
                    trace!(nodes, objective, "new incumbent");
                    incumbent = Some((objective, edge_values));
                }
            }
        }

        debug!(nodes, "branch and bound finished");
        Ok(match incumbent {
            Some((_, edge_values)) => MipOutcome {
                status: SolverStatus::Optimal,
                edge_values: edge_values.into_iter().map(f64::round).collect(),
            },
            None => MipOutcome::empty(SolverStatus::Infeasible),
        })
    }
}

/// Index of the edge value farthest from integral, `None` if all are.
fn most_fractional(values: &[f64]) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .map(|(k, &x)| (k, (x - x.round()).abs()))
        .filter(|&(_, gap)| gap > INTEGRALITY_TOLERANCE)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(k, _)| k)
}

/// Solves the LP relaxation of `model` with edge variables restricted to
/// `bounds`.
fn solve_relaxation(model: &MtzModel, bounds: &[(f64, f64)]) -> Result<Relaxation> {
    let mut vars = ProblemVariables::new();
    let edge_vars: Vec<Variable> = bounds
        .iter()
        .map(|&(lo, hi)| vars.add(variable().min(lo).max(hi)))
        .collect();
    let (lo, hi) = model.position_bounds();
    // position_vars[k - 1] is u_k.
    let position_vars: Vec<Variable> = (1..model.node_count())
        .map(|_| vars.add(variable().min(lo).max(hi)))
        .collect();

    let lookup = |var: Var| -> Result<Variable> {
        match var {
            Var::Edge { from, to } => model
                .edge_index(from, to)
                .map(|k| edge_vars[k])
                .ok_or_else(|| Error::Solver(format!("unknown edge variable {from}->{to}"))),
            Var::Position(k) => k
                .checked_sub(1)
                .and_then(|i| position_vars.get(i).copied())
                .ok_or_else(|| Error::Solver(format!("unknown position variable u_{k}"))),
        }
    };

    let mut objective = Expression::with_capacity(edge_vars.len());
    for (edge, &x) in model.edges().iter().zip(&edge_vars) {
        objective.add_mul(edge.cost, x);
    }

    let mut problem = vars.minimise(objective).using(microlp);
    for row in model.constraints() {
        let mut lhs = Expression::with_capacity(row.terms.len());
        for &(var, coef) in &row.terms {
            lhs.add_mul(coef, lookup(var)?);
        }
        let rhs = row.rhs;
        problem = match row.sense {
            Sense::Eq => problem.with(constraint!(lhs == rhs)),
            Sense::Le => problem.with(constraint!(lhs <= rhs)),
        };
    }

    match problem.solve() {
        Ok(solution) => {
            let edge_values: Vec<f64> = edge_vars.iter().map(|&x| solution.value(x)).collect();
            Ok(Relaxation::Solved {
                objective: model.objective_value(&edge_values),
                edge_values,
            })
        }
        Err(ResolutionError::Infeasible) => Ok(Relaxation::Infeasible),
        Err(ResolutionError::Unbounded) => Ok(Relaxation::Unbounded),
        Err(other) => Err(Error::Solver(other.to_string())),
    }
}

/// Result of an exact solve.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExactSolution {
    pub status: SolverStatus,
    /// Tour length of the returned assignment, `None` without one.
    pub objective: Option<f64>,
    /// Visiting order starting at node 0, empty if the selected edges do
    /// not form a single Hamiltonian cycle.
    pub route: Vec<usize>,
    pub variable_count: usize,
    pub constraint_count: usize,
    pub wall_clock_seconds: f64,
}

impl ExactSolution {
    /// Whether the backend returned a complete tour.
    pub fn is_solution_found(&self) -> bool {
        !self.route.is_empty()
    }
}

/// Solves the TSP on `matrix` to optimality with the MTZ formulation.
///
/// # Errors
/// - [`Error::Data`] for matrices with fewer than two nodes
/// - [`Error::Solver`] when the backend fails or returns values that do
///   not match the model
///
/// # Examples
///
/// ```no_run
/// use u_tsp::distance::{build_distance_matrix, Metric, Point};
/// use u_tsp::mtz::{solve_exact, MicroLpSolver, SolverConfig};
///
/// let points = [
///     Point::new(0.0, 0.0),
///     Point::new(1.0, 0.0),
///     Point::new(1.0, 1.0),
///     Point::new(0.0, 1.0),
/// ];
/// let matrix = build_distance_matrix(&points, Metric::Planar);
/// let config = SolverConfig::default().with_time_limit_secs(60);
/// let exact = solve_exact(&matrix, &MicroLpSolver, &config).unwrap();
/// assert_eq!(exact.route.len(), 4);
/// ```
#[instrument(level = "debug", skip_all, fields(nodes = matrix.len()))]
pub fn solve_exact<S: MipSolver + ?Sized>(
    matrix: &DistanceMatrix,
    solver: &S,
    config: &SolverConfig,
) -> Result<ExactSolution> {
    let model = MtzModel::build(matrix)?;
    info!(
        variables = model.variable_count(),
        constraints = model.constraint_count(),
        "MTZ model built"
    );

    let started = Instant::now();
    let outcome = solver.solve(&model, config)?;
    let wall_clock_seconds = started.elapsed().as_secs_f64();

    let (objective, route) = match outcome.edge_values.len() {
        0 => (None, Vec::new()),
        len if len == model.edges().len() => (
            Some(model.objective_value(&outcome.edge_values)),
            reconstruct_route(&model, &outcome.edge_values),
        ),
        len => {
            return Err(Error::Solver(format!(
                "backend returned {len} edge values for {} edges",
                model.edges().len()
            )))
        }
    };

    if objective.is_some() && route.is_empty() {
        warn!("selected edges do not form a single tour");
    }
    info!(
        status = %outcome.status,
        objective = objective.unwrap_or(f64::NAN),
        seconds = wall_clock_seconds,
        "exact solve finished"
    );

    Ok(ExactSolution {
        status: outcome.status,
        objective,
        route,
        variable_count: model.variable_count(),
        constraint_count: model.constraint_count(),
        wall_clock_seconds,
    })
}

/// Follows selected edges from node 0.
///
/// An edge is selected when its value rounds to 1. Returns an empty route
/// unless every node has a successor and the walk from node 0 visits all
/// `n` nodes before closing.
pub fn reconstruct_route(model: &MtzModel, edge_values: &[f64]) -> Vec<usize> {
    let n = model.node_count();
    let mut successor: Vec<Option<usize>> = vec![None; n];
    for (edge, &x) in model.edges().iter().zip(edge_values) {
        if x.round() == 1.0 {
            successor[edge.from] = Some(edge.to);
        }
    }
    if successor.iter().any(Option::is_none) {
        debug!("some node has no selected outgoing edge");
        return Vec::new();
    }

    let mut route = Vec::with_capacity(n);
    let mut visited = vec![false; n];
    let mut current = Some(0);
    while let Some(node) = current {
        if visited[node] {
            break;
        }
        visited[node] = true;
        route.push(node);
        current = successor[node];
    }

    if route.len() == n {
        route
    } else {
        debug!(covered = route.len(), nodes = n, "walk from node 0 closes early");
        Vec::new()
    }
}
