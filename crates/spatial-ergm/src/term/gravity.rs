//! Gravity term: inverse-square distance decay with optional density and
//! boundary reweighting.
//!
//! Energy of the edge `{i, j}` at bin `d = disc(|c_i − c_j|)`:
//!
//! `E = −ln( p · (1/ρ_i(d)) · (2π / b_i(d)) )`, `p = 1/d²` for `d ≤ d_max`.
//!
//! - `ρ_i(d)` is the local density of vertex `i` at bin `d` (or 1).
//! - `b_i(d)` is the boundary coverage of vertex `i` at bin `d` (or 2π).
//! - Beyond `d_max` the decay is zero; the energy is the finite
//!   `support_penalty` instead of `+∞` so sums with other terms stay finite.
//!
//! Note that the term is asymmetric in `(i, j)`: corrections are read from
//! the first vertex's tables.

use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::ErgmTerm;
use crate::density::{BinTable, SpatialDensityModel};
use crate::discretize::{Bin, Discretizer};
use crate::error::{ErgmError, Result};
use crate::graph::SpatialGraph;

/// Substitute for a zero boundary coverage.
pub const DEFAULT_BOUNDARY_FLOOR: f64 = 0.001;
/// Energy assigned to pairs outside the support (`d > d_max`).
pub const DEFAULT_SUPPORT_PENALTY: f64 = 1.0e6;

/// Gravity term configuration.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GravityCfg {
    pub bin_width: f64,
    pub reweight_boundaries: bool,
    pub reweight_density: bool,
    pub boundary_floor: f64,
    pub support_penalty: f64,
}

impl Default for GravityCfg {
    fn default() -> Self {
        Self {
            bin_width: 1.0,
            reweight_boundaries: false,
            reweight_density: false,
            boundary_floor: DEFAULT_BOUNDARY_FLOOR,
            support_penalty: DEFAULT_SUPPORT_PENALTY,
        }
    }
}

impl GravityCfg {
    fn validate(&self) -> Result<()> {
        if !(self.boundary_floor.is_finite() && self.boundary_floor > 0.0) {
            return Err(ErgmError::config("boundary_floor must be finite and > 0"));
        }
        if !(self.support_penalty.is_finite() && self.support_penalty > 0.0) {
            return Err(ErgmError::config("support_penalty must be finite and > 0"));
        }
        Ok(())
    }

    fn needs_tables(&self) -> bool {
        self.reweight_boundaries || self.reweight_density
    }
}

/// Gravity ERGM term with precomputed per-vertex corrections.
#[derive(Clone, Debug)]
pub struct GravityTerm {
    cfg: GravityCfg,
    disc: Discretizer,
    model: SpatialDensityModel,
    vertices: usize,
}

impl GravityTerm {
    /// Build the term for `graph`. Tables are only computed when a reweighting
    /// flag is set.
    pub fn new(graph: &SpatialGraph, cfg: GravityCfg) -> Result<Self> {
        let disc = Discretizer::new(cfg.bin_width)?;
        cfg.validate()?;
        info!(
            bin_width = cfg.bin_width,
            reweight_boundaries = cfg.reweight_boundaries,
            reweight_density = cfg.reweight_density,
            vertices = graph.vertex_count(),
            "initializing ERGM gravity term"
        );
        let model = if cfg.needs_tables() {
            SpatialDensityModel::build(graph, &disc, cfg.boundary_floor)?
        } else {
            SpatialDensityModel::support_only(graph, &disc)
        };
        Ok(Self {
            cfg,
            disc,
            model,
            vertices: graph.vertex_count(),
        })
    }

    #[inline]
    pub fn cfg(&self) -> &GravityCfg {
        &self.cfg
    }

    #[inline]
    pub fn discretizer(&self) -> &Discretizer {
        &self.disc
    }

    #[inline]
    pub fn d_max(&self) -> Bin {
        self.model.d_max()
    }

    #[inline]
    pub fn model(&self) -> &SpatialDensityModel {
        &self.model
    }

    /// Raw inverse-square decay at bin `d`; zero outside the support.
    #[inline]
    pub fn decay(&self, d: Bin) -> f64 {
        if d > self.d_max() {
            0.0
        } else {
            let d = d as f64;
            1.0 / (d * d)
        }
    }

    /// Rejects a graph other than the one the tables were built from.
    fn check_graph(&self, graph: &SpatialGraph) -> Result<()> {
        if graph.vertex_count() != self.vertices || graph.bounds() != self.model.bounds() {
            return Err(ErgmError::config(format!(
                "gravity term was built for {} vertices in {:?}, got {} vertices in {:?}",
                self.vertices,
                self.model.bounds(),
                graph.vertex_count(),
                graph.bounds()
            )));
        }
        Ok(())
    }

    fn lookup(&self, table: &BinTable, i: usize, d: Bin) -> Result<f64> {
        table.get(i, d).ok_or_else(|| {
            ErgmError::config(format!(
                "no precomputed entry for vertex {i} at bin {d}; was the term built for this graph?"
            ))
        })
    }
}

impl ErgmTerm for GravityTerm {
    fn name(&self) -> &str {
        "gravity"
    }

    fn change_statistic(
        &self,
        graph: &SpatialGraph,
        i: usize,
        j: usize,
        _y_ij: bool,
    ) -> Result<f64> {
        self.check_graph(graph)?;
        graph.check_pair(i, j)?;
        let d = self.disc.discretize(graph.distance(i, j));
        let p = self.decay(d);
        if p == 0.0 {
            return Ok(self.cfg.support_penalty);
        }

        let rho = if self.cfg.reweight_density {
            self.lookup(self.model.density(), i, d)?
        } else {
            1.0
        };
        let b = if self.cfg.reweight_boundaries {
            self.lookup(self.model.boundary(), i, d)?
        } else {
            TAU
        };

        let r = -(p * (1.0 / rho) * (TAU / b)).ln();
        // Infinities can only come from broken tables once p > 0.
        if !r.is_finite() {
            return Err(ErgmError::InvalidStatistic { i, j, value: r });
        }
        Ok(r)
    }
}
