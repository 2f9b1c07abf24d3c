//! Distance model shared by both solvers.
//!
//! Points are planar coordinates or, under [`Metric::Geodesic`], TSPLIB
//! `GEO` latitude/longitude pairs. Costs are evaluated either on demand
//! from point pairs or through a precomputed [`DistanceMatrix`].
//!
//! # References
//!
//! - Reinelt (1991), "TSPLIB - A Traveling Salesman Problem Library"

use crate::error::{Error, Result};
use crate::ga::TourCost;
use std::f64::consts::PI;
use std::str::FromStr;

/// Earth radius used by the TSPLIB `GEO` distance, in kilometres.
pub const EARTH_RADIUS: f64 = 6378.388;

/// A point with two real coordinates.
///
/// Under the geodesic metric `x` is the latitude and `y` the longitude,
/// both in TSPLIB degree-minute form.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// Pairwise distance metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Metric {
    /// Euclidean distance in the plane (TSPLIB `EUC_2D`, unrounded).
    #[default]
    Planar,

    /// Great-circle distance on the TSPLIB sphere (TSPLIB `GEO`).
    ///
    /// Coordinates are `DDD.MM` degree-minute values; each distance is
    /// truncated to an integer number of kilometres.
    Geodesic,
}

impl Metric {
    /// Distance between two points under this metric.
    pub fn distance(self, p: &Point, q: &Point) -> f64 {
        match self {
            Metric::Planar => point_distance(p, q),
            Metric::Geodesic => geo_distance(p, q),
        }
    }
}

impl FromStr for Metric {
    type Err = Error;

    /// Parses a TSPLIB `EDGE_WEIGHT_TYPE` tag.
    fn from_str(tag: &str) -> Result<Self> {
        match tag.trim().to_ascii_uppercase().as_str() {
            "EUC_2D" => Ok(Metric::Planar),
            "GEO" => Ok(Metric::Geodesic),
            other => Err(Error::UnsupportedMetric(other.to_string())),
        }
    }
}

/// Euclidean distance `sqrt(dx² + dy²)`.
pub fn point_distance(p: &Point, q: &Point) -> f64 {
    let dx = p.x - q.x;
    let dy = p.y - q.y;
    (dx * dx + dy * dy).sqrt()
}

/// Converts a `DDD.MM` coordinate to radians.
fn geo_to_radians(value: f64) -> f64 {
    let degrees = value.trunc();
    let minutes = value - degrees;
    PI * (degrees + 5.0 * minutes / 3.0) / 180.0
}

/// TSPLIB `GEO` distance between two latitude/longitude points.
///
/// Coincident points are at distance 0.
pub fn geo_distance(p: &Point, q: &Point) -> f64 {
    if p == q {
        return 0.0;
    }
    let (lat_p, lon_p) = (geo_to_radians(p.x), geo_to_radians(p.y));
    let (lat_q, lon_q) = (geo_to_radians(q.x), geo_to_radians(q.y));

    let q1 = (lon_p - lon_q).cos();
    let q2 = (lat_p - lat_q).cos();
    let q3 = (lat_p + lat_q).cos();
    // Rounding can push the cosine a hair outside [-1, 1].
    let cosine = (0.5 * ((1.0 + q1) * q2 - (1.0 - q1) * q3)).clamp(-1.0, 1.0);

    (EARTH_RADIUS * cosine.acos() + 1.0).trunc()
}

/// Dense n×n distance matrix, row-major.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DistanceMatrix {
    n: usize,
    data: Vec<f64>,
}

impl DistanceMatrix {
    fn zeros(n: usize) -> Self {
        Self {
            n,
            data: vec![0.0; n * n],
        }
    }

    /// Builds a matrix from caller-supplied rows.
    ///
    /// Rows must form a square, symmetric matrix of finite, non-negative
    /// values with a zero diagonal.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let n = rows.len();
        let mut data = Vec::with_capacity(n * n);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != n {
                return Err(Error::Data(format!(
                    "distance matrix is not square: row {i} has {} entries, expected {n}",
                    row.len()
                )));
            }
            if let Some(bad) = row.iter().find(|d| !d.is_finite() || **d < 0.0) {
                return Err(Error::Data(format!(
                    "distance matrix row {i} contains invalid distance {bad}"
                )));
            }
            data.extend(row);
        }

        let matrix = Self { n, data };
        if let Some(i) = (0..n).find(|&i| matrix.get(i, i) != 0.0) {
            return Err(Error::Data(format!(
                "distance matrix diagonal entry ({i}, {i}) is {}, expected 0",
                matrix.get(i, i)
            )));
        }
        for i in 0..n {
            if let Some(j) = (i + 1..n).find(|&j| matrix.get(i, j) != matrix.get(j, i)) {
                return Err(Error::Data(format!(
                    "distance matrix is not symmetric: d({i},{j})={} but d({j},{i})={}",
                    matrix.get(i, j),
                    matrix.get(j, i)
                )));
            }
        }
        Ok(matrix)
    }

    /// Builds the matrix for a TSPLIB `EDGE_WEIGHT_TYPE` tag.
    pub fn from_tsplib(points: &[Point], edge_weight_type: &str) -> Result<Self> {
        let metric: Metric = edge_weight_type.parse()?;
        Ok(build_distance_matrix(points, metric))
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Cost of the edge `i → j`.
    ///
    /// # Panics
    /// Panics if `i` or `j` is out of range.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        assert!(i < self.n && j < self.n, "node index out of range");
        self.data[i * self.n + j]
    }

    /// Row `i` of the matrix.
    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.n..(i + 1) * self.n]
    }

    /// Whether `D[i][j] == D[j][i]` for every pair.
    pub fn is_symmetric(&self) -> bool {
        (0..self.n).all(|i| (i + 1..self.n).all(|j| self.get(i, j) == self.get(j, i)))
    }

    fn set_symmetric(&mut self, i: usize, j: usize, d: f64) {
        self.data[i * self.n + j] = d;
        self.data[j * self.n + i] = d;
    }
}

/// Precomputes all pairwise distances under `metric`.
///
/// Only the upper triangle is evaluated; it is mirrored into the lower
/// triangle, so the result is symmetric with a zero diagonal.
pub fn build_distance_matrix(points: &[Point], metric: Metric) -> DistanceMatrix {
    let n = points.len();
    let mut matrix = DistanceMatrix::zeros(n);
    for i in 0..n {
        for j in i + 1..n {
            matrix.set_symmetric(i, j, metric.distance(&points[i], &points[j]));
        }
    }
    matrix
}

/// Total cyclic length of `tour`, including the closing edge.
///
/// Uses `matrix` lookups when given, Euclidean distances between `points`
/// otherwise.
pub fn tour_length(tour: &[usize], points: &[Point], matrix: Option<&DistanceMatrix>) -> f64 {
    let next = tour.iter().cycle().skip(1);
    match matrix {
        Some(m) => tour.iter().zip(next).map(|(&a, &b)| m.get(a, b)).sum(),
        None => tour
            .iter()
            .zip(next)
            .map(|(&a, &b)| point_distance(&points[a], &points[b]))
            .sum(),
    }
}

/// A resolved TSP instance: node count plus cost source.
///
/// Built from points, from a distance matrix, or both. When both are
/// present the matrix is used for costs and the sizes must agree.
#[derive(Debug, Clone, Copy)]
pub struct Instance<'a> {
    points: Option<&'a [Point]>,
    matrix: Option<&'a DistanceMatrix>,
    n: usize,
}

impl<'a> Instance<'a> {
    /// Resolves an instance from optional points and an optional matrix.
    pub fn new(points: Option<&'a [Point]>, matrix: Option<&'a DistanceMatrix>) -> Result<Self> {
        let n = match (points, matrix) {
            (_, Some(m)) => {
                if let Some(p) = points {
                    if p.len() != m.len() {
                        return Err(Error::Data(format!(
                            "{} points but distance matrix is {}x{}",
                            p.len(),
                            m.len(),
                            m.len()
                        )));
                    }
                }
                m.len()
            }
            (Some(p), None) => p.len(),
            (None, None) => {
                return Err(Error::Data(
                    "instance needs points or a distance matrix".into(),
                ))
            }
        };
        if n == 0 {
            return Err(Error::Data("instance has no nodes".into()));
        }
        Ok(Self { points, matrix, n })
    }

    pub fn from_points(points: &'a [Point]) -> Result<Self> {
        Self::new(Some(points), None)
    }

    pub fn from_matrix(matrix: &'a DistanceMatrix) -> Result<Self> {
        Self::new(None, Some(matrix))
    }

    pub fn points(&self) -> Option<&'a [Point]> {
        self.points
    }

    pub fn matrix(&self) -> Option<&'a DistanceMatrix> {
        self.matrix
    }
}

impl TourCost for Instance<'_> {
    fn node_count(&self) -> usize {
        self.n
    }

    fn cost(&self, tour: &[usize]) -> f64 {
        tour_length(tour, self.points.unwrap_or(&[]), self.matrix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Vec<Point> {
        vec![
            Point::new(0.0, 0.0),
            Point::new(3.0, 0.0),
            Point::new(3.0, 4.0),
            Point::new(0.0, 4.0),
        ]
    }

    #[test]
    fn test_point_distance() {
        let d = point_distance(&Point::new(0.0, 0.0), &Point::new(3.0, 4.0));
        assert!((d - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_metric_from_tag() {
        assert_eq!("EUC_2D".parse::<Metric>().unwrap(), Metric::Planar);
        assert_eq!(" geo ".parse::<Metric>().unwrap(), Metric::Geodesic);
        let err = "ATT".parse::<Metric>().unwrap_err();
        assert!(matches!(err, Error::UnsupportedMetric(ref t) if t == "ATT"));
        assert!(err.is_configuration());
    }

    #[test]
    fn test_from_tsplib_rejects_unknown_tag() {
        assert!(DistanceMatrix::from_tsplib(&square(), "CEIL_2D").is_err());
        assert_eq!(DistanceMatrix::from_tsplib(&square(), "EUC_2D").unwrap().len(), 4);
    }

    #[test]
    fn test_planar_matrix_symmetric_zero_diagonal() {
        let m = build_distance_matrix(&square(), Metric::Planar);
        assert!(m.is_symmetric());
        for i in 0..4 {
            assert_eq!(m.get(i, i), 0.0);
        }
        assert!((m.get(0, 2) - 5.0).abs() < 1e-12);
        assert_eq!(m.row(1).len(), 4);
    }

    #[test]
    fn test_geo_one_degree_longitude_at_equator() {
        // R·π/180 ≈ 111.32 km, +1 then truncated.
        let d = geo_distance(&Point::new(0.0, 0.0), &Point::new(0.0, 1.0));
        assert_eq!(d, 112.0);
    }

    #[test]
    fn test_geo_minutes_encoding() {
        // 0.30 is 30 minutes = half a degree: R·π/360 ≈ 55.66 km.
        let d = geo_distance(&Point::new(0.0, 0.0), &Point::new(0.0, 0.30));
        assert_eq!(d, 56.0);
    }

    #[test]
    fn test_geo_identical_points() {
        let p = Point::new(38.24, 20.42);
        assert_eq!(geo_distance(&p, &p), 0.0);
        let m = build_distance_matrix(&[p, p], Metric::Geodesic);
        assert_eq!(m.get(0, 1), 0.0);
    }

    #[test]
    fn test_geo_matrix_integral_and_symmetric() {
        let pts = vec![
            Point::new(38.24, 20.42),
            Point::new(39.57, 26.15),
            Point::new(40.56, 25.32),
            Point::new(36.26, 23.12),
        ];
        let m = build_distance_matrix(&pts, Metric::Geodesic);
        assert!(m.is_symmetric());
        for i in 0..4 {
            for j in 0..4 {
                assert_eq!(m.get(i, j).fract(), 0.0);
                if i != j {
                    assert!(m.get(i, j) > 0.0);
                }
            }
        }
    }

    #[test]
    fn test_tour_length_paths_agree() {
        let pts = square();
        let m = build_distance_matrix(&pts, Metric::Planar);
        let tour = [0, 2, 1, 3];
        let direct = tour_length(&tour, &pts, None);
        let lookup = tour_length(&tour, &pts, Some(&m));
        assert!((direct - lookup).abs() < 1e-9);
        assert!((tour_length(&[0, 1, 2, 3], &pts, None) - 14.0).abs() < 1e-12);
    }

    #[test]
    fn test_tour_length_degenerate() {
        let pts = square();
        assert_eq!(tour_length(&[], &pts, None), 0.0);
        assert_eq!(tour_length(&[2], &pts, None), 0.0);
    }

    #[test]
    fn test_from_rows_validation() {
        assert!(DistanceMatrix::from_rows(vec![vec![0.0, 1.0], vec![1.0]]).is_err());
        assert!(DistanceMatrix::from_rows(vec![vec![0.0, -1.0], vec![1.0, 0.0]]).is_err());
        assert!(DistanceMatrix::from_rows(vec![vec![0.0, f64::NAN], vec![1.0, 0.0]]).is_err());
        let m = DistanceMatrix::from_rows(vec![vec![0.0, 2.0], vec![2.0, 0.0]]).unwrap();
        assert_eq!(m.get(1, 0), 2.0);
    }

    #[test]
    fn test_from_rows_rejects_asymmetric() {
        let rows = vec![
            vec![0.0, 1.0, 9.0],
            vec![2.0, 0.0, 1.0],
            vec![9.0, 1.0, 0.0],
        ];
        let err = DistanceMatrix::from_rows(rows).unwrap_err();
        assert!(matches!(err, Error::Data(msg) if msg.contains("d(0,1)")));
    }

    #[test]
    fn test_from_rows_rejects_nonzero_diagonal() {
        let rows = vec![
            vec![5.0, 1.0, 9.0],
            vec![1.0, 0.0, 3.0],
            vec![9.0, 3.0, 0.0],
        ];
        assert!(matches!(
            DistanceMatrix::from_rows(rows),
            Err(Error::Data(_))
        ));
    }

    #[test]
    fn test_from_rows_accepted_matrix_is_symmetric() {
        let rows = vec![
            vec![0.0, 1.0, 9.0],
            vec![1.0, 0.0, 3.0],
            vec![9.0, 3.0, 0.0],
        ];
        let m = DistanceMatrix::from_rows(rows).unwrap();
        assert!(m.is_symmetric());
        assert_eq!(m.get(2, 1), 3.0);
    }

    #[test]
    fn test_instance_resolution() {
        let pts = square();
        let m = build_distance_matrix(&pts, Metric::Planar);
        assert_eq!(Instance::from_points(&pts).unwrap().node_count(), 4);
        assert_eq!(Instance::from_matrix(&m).unwrap().node_count(), 4);
        assert!(Instance::new(Some(pts.as_slice()), Some(&m)).is_ok());
        assert!(matches!(Instance::new(None, None), Err(Error::Data(_))));
        assert!(matches!(Instance::from_points(&[]), Err(Error::Data(_))));
    }

    #[test]
    fn test_instance_size_mismatch() {
        let pts = square();
        let m = build_distance_matrix(&pts[..3], Metric::Planar);
        assert!(matches!(
            Instance::new(Some(pts.as_slice()), Some(&m)),
            Err(Error::Data(_))
        ));
    }

    #[test]
    fn test_instance_matrix_takes_precedence() {
        let pts = square();
        let rows: Vec<Vec<f64>> = (0..4)
            .map(|i| (0..4).map(|j| if i == j { 0.0 } else { 1.0 }).collect())
            .collect();
        let m = DistanceMatrix::from_rows(rows).unwrap();
        let instance = Instance::new(Some(pts.as_slice()), Some(&m)).unwrap();
        assert_eq!(instance.cost(&[0, 1, 2, 3]), 4.0);
    }
}
