//! Spatially embedded undirected graph.
//!
//! - Vertices are the indices `0..n` with an immutable planar coordinate each.
//! - Edges form a symmetric relation without self-loops, stored as sorted
//!   neighbor lists so that toggles stay `O(deg)`.
//! - The axis-aligned bounding box of all coordinates is the study area; it is
//!   computed once at construction.

use nalgebra::Vector2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{ErgmError, Result};

/// Axis-aligned study-area rectangle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub min: Vector2<f64>,
    pub max: Vector2<f64>,
}

impl Bounds {
    pub fn new(min: Vector2<f64>, max: Vector2<f64>) -> Self {
        Self { min, max }
    }

    /// Tight box around `points`; `None` for an empty slice.
    pub fn from_points(points: &[Vector2<f64>]) -> Option<Self> {
        let first = *points.first()?;
        let (min, max) = points
            .iter()
            .fold((first, first), |(lo, hi), p| (lo.inf(p), hi.sup(p)));
        Some(Self { min, max })
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// Half the diagonal, i.e. the distance from the center to any corner.
    #[inline]
    pub fn half_diagonal(&self) -> f64 {
        0.5 * (self.max - self.min).norm()
    }

    #[inline]
    pub fn contains(&self, p: Vector2<f64>) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Distances from `p` to the four edges, ordered `[left, right, bottom, top]`.
    #[inline]
    pub fn edge_distances(&self, p: Vector2<f64>) -> [f64; 4] {
        [
            p.x - self.min.x,
            self.max.x - p.x,
            p.y - self.min.y,
            self.max.y - p.y,
        ]
    }
}

/// Mutable adjacency state over a fixed, located vertex set.
#[derive(Clone, Debug)]
pub struct SpatialGraph {
    coords: Vec<Vector2<f64>>,
    adj: Vec<Vec<usize>>,
    edges: usize,
    bounds: Bounds,
}

impl SpatialGraph {
    /// Empty-edged graph over `coords`. Rejects an empty set and non-finite coordinates.
    pub fn new(coords: Vec<Vector2<f64>>) -> Result<Self> {
        if let Some(vertex) = coords.iter().position(|c| !(c.x.is_finite() && c.y.is_finite())) {
            return Err(ErgmError::InvalidCoordinate { vertex });
        }
        let bounds = Bounds::from_points(&coords).ok_or(ErgmError::EmptyGraph)?;
        let adj = vec![Vec::new(); coords.len()];
        Ok(Self {
            coords,
            adj,
            edges: 0,
            bounds,
        })
    }

    pub fn from_xy(points: &[(f64, f64)]) -> Result<Self> {
        Self::new(points.iter().map(|&(x, y)| Vector2::new(x, y)).collect())
    }

    /// `nx * ny` vertices on a regular lattice with the given spacing, origin at (0, 0).
    /// Vertex `k` sits at column `k % nx`, row `k / nx`.
    pub fn grid(nx: usize, ny: usize, spacing: f64) -> Result<Self> {
        if !(spacing.is_finite() && spacing > 0.0) {
            return Err(ErgmError::config("grid spacing must be finite and > 0"));
        }
        let coords = (0..ny)
            .flat_map(|row| {
                (0..nx).map(move |col| Vector2::new(col as f64 * spacing, row as f64 * spacing))
            })
            .collect();
        Self::new(coords)
    }

    /// `n` vertices drawn uniformly inside `bounds`, reproducible from `seed`.
    pub fn random_uniform(n: usize, bounds: Bounds, seed: u64) -> Result<Self> {
        if !(bounds.width() >= 0.0 && bounds.height() >= 0.0) {
            return Err(ErgmError::config("bounds must satisfy min <= max"));
        }
        let mut rng = StdRng::seed_from_u64(seed);
        let coords = (0..n)
            .map(|_| {
                Vector2::new(
                    bounds.min.x + rng.gen::<f64>() * bounds.width(),
                    bounds.min.y + rng.gen::<f64>() * bounds.height(),
                )
            })
            .collect();
        Self::new(coords)
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.coords.len()
    }

    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edges
    }

    #[inline]
    pub fn coord(&self, i: usize) -> Vector2<f64> {
        self.coords[i]
    }

    #[inline]
    pub fn coords(&self) -> &[Vector2<f64>] {
        &self.coords
    }

    #[inline]
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Planar Euclidean distance between two vertices.
    #[inline]
    pub fn distance(&self, i: usize, j: usize) -> f64 {
        (self.coords[i] - self.coords[j]).norm()
    }

    pub fn has_edge(&self, i: usize, j: usize) -> bool {
        self.adj
            .get(i)
            .is_some_and(|nbrs| nbrs.binary_search(&j).is_ok())
    }

    #[inline]
    pub fn neighbors(&self, i: usize) -> &[usize] {
        &self.adj[i]
    }

    #[inline]
    pub fn degree(&self, i: usize) -> usize {
        self.adj[i].len()
    }

    /// Insert `{i, j}`. Returns `false` if the edge was already present.
    pub fn add_edge(&mut self, i: usize, j: usize) -> Result<bool> {
        self.check_pair(i, j)?;
        let Err(pos_i) = self.adj[i].binary_search(&j) else {
            return Ok(false);
        };
        self.adj[i].insert(pos_i, j);
        if let Err(pos_j) = self.adj[j].binary_search(&i) {
            self.adj[j].insert(pos_j, i);
        }
        self.edges += 1;
        Ok(true)
    }

    /// Remove `{i, j}`. Returns `false` if the edge was absent.
    pub fn remove_edge(&mut self, i: usize, j: usize) -> Result<bool> {
        self.check_pair(i, j)?;
        let Ok(pos_i) = self.adj[i].binary_search(&j) else {
            return Ok(false);
        };
        self.adj[i].remove(pos_i);
        if let Ok(pos_j) = self.adj[j].binary_search(&i) {
            self.adj[j].remove(pos_j);
        }
        self.edges -= 1;
        Ok(true)
    }

    /// Flip the state of `{i, j}` and return the new state.
    pub fn toggle_edge(&mut self, i: usize, j: usize) -> Result<bool> {
        if self.has_edge(i, j) {
            self.remove_edge(i, j)?;
            Ok(false)
        } else {
            self.add_edge(i, j)?;
            Ok(true)
        }
    }

    pub fn clear_edges(&mut self) {
        self.adj.iter_mut().for_each(Vec::clear);
        self.edges = 0;
    }

    /// All edges as `(i, j)` with `i < j`, in ascending order.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.adj.iter().enumerate().flat_map(|(i, nbrs)| {
            nbrs.iter()
                .copied()
                .filter(move |&j| i < j)
                .map(move |j| (i, j))
        })
    }

    pub(crate) fn check_pair(&self, i: usize, j: usize) -> Result<()> {
        let n = self.vertex_count();
        for v in [i, j] {
            if v >= n {
                return Err(ErgmError::VertexOutOfRange { vertex: v, n });
            }
        }
        if i == j {
            return Err(ErgmError::SelfLoop { vertex: i });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::vector;

    #[test]
    fn toggle_is_symmetric_and_counts_edges() {
        let mut g = SpatialGraph::grid(3, 3, 1.0).unwrap();
        assert_eq!(g.vertex_count(), 9);
        assert!(g.toggle_edge(0, 4).unwrap());
        assert!(g.has_edge(0, 4) && g.has_edge(4, 0));
        assert_eq!(g.edge_count(), 1);
        assert!(g.add_edge(2, 4).unwrap());
        assert!(!g.add_edge(4, 2).unwrap());
        assert_eq!(g.degree(4), 2);
        assert_eq!(g.neighbors(4), &[0, 2]);
        assert_eq!(g.edges().collect::<Vec<_>>(), vec![(0, 4), (2, 4)]);
        assert!(!g.toggle_edge(4, 0).unwrap());
        assert_eq!(g.edge_count(), 1);
        g.clear_edges();
        assert_eq!(g.edge_count(), 0);
        assert_eq!(g.edges().count(), 0);
    }

    #[test]
    fn rejects_bad_pairs_and_coordinates() {
        let mut g = SpatialGraph::from_xy(&[(0.0, 0.0), (1.0, 1.0)]).unwrap();
        assert_eq!(g.toggle_edge(1, 1), Err(ErgmError::SelfLoop { vertex: 1 }));
        assert_eq!(
            g.add_edge(0, 5),
            Err(ErgmError::VertexOutOfRange { vertex: 5, n: 2 })
        );
        assert!(matches!(
            SpatialGraph::from_xy(&[(0.0, f64::NAN)]),
            Err(ErgmError::InvalidCoordinate { vertex: 0 })
        ));
        assert!(matches!(SpatialGraph::new(Vec::new()), Err(ErgmError::EmptyGraph)));
    }

    #[test]
    fn bounds_and_distances() {
        let g = SpatialGraph::from_xy(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]).unwrap();
        let b = g.bounds();
        assert_eq!(b.min, vector![0.0, 0.0]);
        assert_eq!(b.max, vector![10.0, 10.0]);
        assert!((b.half_diagonal() - 50f64.sqrt()).abs() < 1e-12);
        assert!((g.distance(0, 2) - 200f64.sqrt()).abs() < 1e-12);
        assert_eq!(b.edge_distances(vector![2.0, 7.0]), [2.0, 8.0, 7.0, 3.0]);
    }

    #[test]
    fn random_uniform_is_reproducible_and_inside() {
        let bounds = Bounds::new(vector![-1.0, 2.0], vector![3.0, 5.0]);
        let a = SpatialGraph::random_uniform(50, bounds, 9).unwrap();
        let b = SpatialGraph::random_uniform(50, bounds, 9).unwrap();
        assert_eq!(a.coords(), b.coords());
        assert!(a.coords().iter().all(|&p| bounds.contains(p)));
    }
}
