//! MTZ integer program definition.

use crate::distance::DistanceMatrix;
use crate::error::{Error, Result};

/// A decision variable of the MTZ program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Var {
    /// Binary `x_ij`: the tour uses edge `from → to`.
    Edge { from: usize, to: usize },

    /// Continuous `u_k`: visiting position of node `k ≥ 1`.
    Position(usize),
}

/// A directed edge and its cost.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub from: usize,
    pub to: usize,
    pub cost: f64,
}

/// Comparison sense of a linear constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    /// `Σ terms == rhs`
    Eq,
    /// `Σ terms <= rhs`
    Le,
}

/// Which family a constraint row belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    /// Exactly one selected edge leaves the node.
    OutDegree(usize),
    /// Exactly one selected edge enters the node.
    InDegree(usize),
    /// `u_i - u_j + (n-1)·x_ij <= n-2` for `i, j ≥ 1`, `i ≠ j`.
    SubtourElimination(usize, usize),
}

/// One linear row of the model.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearConstraint {
    pub kind: ConstraintKind,
    pub terms: Vec<(Var, f64)>,
    pub sense: Sense,
    pub rhs: f64,
}

/// The Miller-Tucker-Zemlin formulation of an asymmetric TSP.
///
/// Node 0 is the root and carries no position variable. Edges are stored
/// row by row, skipping the diagonal, so edge `i → j` sits at
/// `i·(n-1) + j` when `j < i` and `i·(n-1) + j - 1` otherwise.
///
/// # Examples
///
/// ```
/// use u_tsp::distance::{build_distance_matrix, Metric, Point};
/// use u_tsp::mtz::MtzModel;
///
/// let points = [Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(0.0, 1.0)];
/// let matrix = build_distance_matrix(&points, Metric::Planar);
/// let model = MtzModel::build(&matrix).unwrap();
/// assert_eq!(model.variable_count(), 6 + 2);
/// assert_eq!(model.constraint_count(), 6 + 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct MtzModel {
    n: usize,
    edges: Vec<Edge>,
    constraints: Vec<LinearConstraint>,
}

impl MtzModel {
    /// Builds the program for `matrix`.
    ///
    /// # Errors
    /// [`Error::Data`] when the matrix has fewer than two nodes.
    pub fn build(matrix: &DistanceMatrix) -> Result<Self> {
        let n = matrix.len();
        if n < 2 {
            return Err(Error::Data(format!(
                "MTZ model needs at least two nodes, got {n}"
            )));
        }

        let edges: Vec<Edge> = (0..n)
            .flat_map(|i| (0..n).filter(move |&j| j != i).map(move |j| (i, j)))
            .map(|(from, to)| Edge {
                from,
                to,
                cost: matrix.get(from, to),
            })
            .collect();

        let mut constraints = Vec::with_capacity(2 * n + (n - 1) * (n - 2));

        for i in 0..n {
            constraints.push(LinearConstraint {
                kind: ConstraintKind::OutDegree(i),
                terms: (0..n)
                    .filter(|&j| j != i)
                    .map(|j| (Var::Edge { from: i, to: j }, 1.0))
                    .collect(),
                sense: Sense::Eq,
                rhs: 1.0,
            });
        }
        for j in 0..n {
            constraints.push(LinearConstraint {
                kind: ConstraintKind::InDegree(j),
                terms: (0..n)
                    .filter(|&i| i != j)
                    .map(|i| (Var::Edge { from: i, to: j }, 1.0))
                    .collect(),
                sense: Sense::Eq,
                rhs: 1.0,
            });
        }

        let big = (n - 1) as f64;
        for i in 1..n {
            for j in (1..n).filter(|&j| j != i) {
                constraints.push(LinearConstraint {
                    kind: ConstraintKind::SubtourElimination(i, j),
                    terms: vec![
                        (Var::Position(i), 1.0),
                        (Var::Position(j), -1.0),
                        (Var::Edge { from: i, to: j }, big),
                    ],
                    sense: Sense::Le,
                    rhs: big - 1.0,
                });
            }
        }

        Ok(Self {
            n,
            edges,
            constraints,
        })
    }

    pub fn node_count(&self) -> usize {
        self.n
    }

    /// Edge variables in storage order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn constraints(&self) -> &[LinearConstraint] {
        &self.constraints
    }

    /// Storage index of edge `from → to`, `None` for self-loops or
    /// out-of-range nodes.
    pub fn edge_index(&self, from: usize, to: usize) -> Option<usize> {
        if from == to || from >= self.n || to >= self.n {
            return None;
        }
        let col = if to < from { to } else { to - 1 };
        Some(from * (self.n - 1) + col)
    }

    /// Bounds `[1, n-1]` of every position variable.
    pub fn position_bounds(&self) -> (f64, f64) {
        (1.0, (self.n - 1) as f64)
    }

    /// `n(n-1)` edge variables plus `n-1` position variables.
    pub fn variable_count(&self) -> usize {
        self.edges.len() + (self.n - 1)
    }

    /// `2n` degree rows plus `(n-1)(n-2)` subtour-elimination rows.
    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// `Σ cost·x` for edge values given in storage order.
    pub fn objective_value(&self, edge_values: &[f64]) -> f64 {
        self.edges
            .iter()
            .zip(edge_values)
            .map(|(e, &x)| e.cost * x)
            .sum()
    }
}
