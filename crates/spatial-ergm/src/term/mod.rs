//! ERGM terms and the weighted model that sums them.
//!
//! A term contributes an energy to every proposed edge toggle. Terms only read
//! the graph; the sampler alone mutates it. The model holds terms behind
//! `dyn ErgmTerm` so that independent chains can share one model read-only.

mod gravity;

pub use gravity::{GravityCfg, GravityTerm, DEFAULT_BOUNDARY_FLOOR, DEFAULT_SUPPORT_PENALTY};

use crate::error::{ErgmError, Result};
use crate::graph::SpatialGraph;

/// A single ERGM statistic.
pub trait ErgmTerm: Send + Sync {
    /// Short label for logs.
    fn name(&self) -> &str;

    /// Contribution of this term for the edge `{i, j}` taking state `y_ij`.
    ///
    /// Values are energies of the edge being present: larger means less likely.
    fn change_statistic(&self, graph: &SpatialGraph, i: usize, j: usize, y_ij: bool)
        -> Result<f64>;
}

/// Weighted sum of terms: `Σ_k θ_k · term_k`.
#[derive(Default)]
pub struct Ergm {
    terms: Vec<(f64, Box<dyn ErgmTerm>)>,
}

impl Ergm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_term(mut self, theta: f64, term: impl ErgmTerm + 'static) -> Self {
        self.push(theta, Box::new(term));
        self
    }

    pub fn push(&mut self, theta: f64, term: Box<dyn ErgmTerm>) {
        self.terms.push((theta, term));
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn term_names(&self) -> impl Iterator<Item = &str> {
        self.terms.iter().map(|(_, t)| t.name())
    }

    /// Aggregate energy of `{i, j}` over all terms. A NaN sum is fatal.
    pub fn change_statistic(
        &self,
        graph: &SpatialGraph,
        i: usize,
        j: usize,
        y_ij: bool,
    ) -> Result<f64> {
        let mut sum = 0.0;
        for (theta, term) in &self.terms {
            sum += theta * term.change_statistic(graph, i, j, y_ij)?;
        }
        if sum.is_nan() {
            return Err(ErgmError::InvalidStatistic { i, j, value: sum });
        }
        Ok(sum)
    }
}

impl std::fmt::Debug for Ergm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.terms.iter().map(|(theta, t)| (t.name(), theta)))
            .finish()
    }
}
