//! Per-vertex density and boundary tables indexed by distance bin.
//!
//! Model
//! - For vertex `i` and bin `r`, the boundary coverage `b` is the angular
//!   measure of the radius-`r` disk that stays inside the study area
//!   (`boundary::disk_coverage` on the discretized edge distances).
//! - The effective annulus area is `a = b·r − 0.5`; the density is the number
//!   of other vertices in bin `r` divided by `a`.
//!
//! Layout
//! - Bins are small dense integers bounded by `d_max`, so both tables are flat
//!   `n × (d_max + 1)` arrays. Column 0 is unused. Pairs farther than `d_max`
//!   are outside the model's support and are not counted.
//!
//! Rows are independent of each other, so they are computed in parallel.

use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;
use tracing::info;

use crate::boundary::disk_coverage;
use crate::discretize::{Bin, Discretizer};
use crate::error::{ErgmError, Result};
use crate::graph::{Bounds, SpatialGraph};

const PROGRESS_EVERY: usize = 1000;

/// Upper bound on `n × (d_max + 1)` cells per table (two tables of `f64`).
pub const MAX_TABLE_CELLS: usize = 1 << 25;

/// Dense `vertex × bin` table.
#[derive(Clone, Debug, Default)]
pub struct BinTable {
    stride: usize,
    values: Vec<f64>,
}

impl BinTable {
    fn from_rows(rows: Vec<Vec<f64>>, stride: usize) -> Self {
        let mut values = Vec::with_capacity(rows.len() * stride);
        for row in rows {
            debug_assert_eq!(row.len(), stride);
            values.extend(row);
        }
        Self { stride, values }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value for vertex `i` at `bin`; `None` outside the table.
    #[inline]
    pub fn get(&self, i: usize, bin: Bin) -> Option<f64> {
        let bin = bin as usize;
        if bin == 0 || bin >= self.stride {
            return None;
        }
        self.values.get(i * self.stride + bin).copied()
    }

    /// Bins `1..=d_max` of vertex `i`.
    pub fn row(&self, i: usize) -> &[f64] {
        let start = i * self.stride;
        self.values.get(start + 1..start + self.stride).unwrap_or(&[])
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.values
            .chunks(self.stride.max(1))
            .flat_map(|row| row.iter().skip(1).copied())
    }
}

/// Study-area summary plus the optional per-vertex tables.
#[derive(Clone, Debug)]
pub struct SpatialDensityModel {
    bounds: Bounds,
    d_max: Bin,
    density: BinTable,
    boundary: BinTable,
}

impl SpatialDensityModel {
    /// Bounding box and `d_max` only; both tables stay empty.
    pub fn support_only(graph: &SpatialGraph, disc: &Discretizer) -> Self {
        let bounds = graph.bounds();
        let d_max = disc.discretize(bounds.half_diagonal());
        info!(
            xmin = bounds.min.x,
            ymin = bounds.min.y,
            xmax = bounds.max.x,
            ymax = bounds.max.y,
            d_max,
            "system boundaries"
        );
        Self {
            bounds,
            d_max,
            density: BinTable::default(),
            boundary: BinTable::default(),
        }
    }

    /// Full precomputation of density and boundary tables for every vertex.
    ///
    /// A zero boundary coverage is replaced by `boundary_floor`, and the
    /// effective area is kept at or above the same floor. Fails with
    /// `InvalidGeometry` on a zero-extent study area or a non-finite coverage,
    /// and with `InvalidConfig` before allocating when the tables would exceed
    /// `MAX_TABLE_CELLS` (bin width too small for the study area).
    pub fn build(graph: &SpatialGraph, disc: &Discretizer, boundary_floor: f64) -> Result<Self> {
        if !(boundary_floor.is_finite() && boundary_floor > 0.0) {
            return Err(ErgmError::config(format!(
                "boundary floor must be finite and > 0, got {boundary_floor}"
            )));
        }
        let mut model = Self::support_only(graph, disc);
        if model.bounds.width() == 0.0 && model.bounds.height() == 0.0 {
            return Err(ErgmError::geometry(
                "all vertices coincide; the study area has zero extent",
            ));
        }

        let n = graph.vertex_count();
        let stride = model.d_max as usize + 1;
        if n.checked_mul(stride).map_or(true, |cells| cells > MAX_TABLE_CELLS) {
            return Err(ErgmError::config(format!(
                "tables of {n} vertices x d_max {} bins exceed {MAX_TABLE_CELLS} cells; \
                 increase the bin width (currently {})",
                model.d_max,
                disc.width()
            )));
        }

        info!("calculating population density");
        let done = AtomicUsize::new(0);
        let rows: Vec<(Vec<f64>, Vec<f64>)> = (0..n)
            .into_par_iter()
            .map(|i| {
                let row = model.vertex_row(graph, disc, i, boundary_floor);
                let k = done.fetch_add(1, Ordering::Relaxed);
                if k % PROGRESS_EVERY == 0 {
                    info!("{:.1} %...", k as f64 / n as f64 * 100.0);
                }
                row
            })
            .collect::<Result<_>>()?;

        let (density, boundary): (Vec<_>, Vec<_>) = rows.into_iter().unzip();
        model.density = BinTable::from_rows(density, stride);
        model.boundary = BinTable::from_rows(boundary, stride);
        Ok(model)
    }

    fn vertex_row(
        &self,
        graph: &SpatialGraph,
        disc: &Discretizer,
        i: usize,
        boundary_floor: f64,
    ) -> Result<(Vec<f64>, Vec<f64>)> {
        let stride = self.d_max as usize + 1;
        let mut counts = vec![0u32; stride];
        for j in (0..graph.vertex_count()).filter(|&j| j != i) {
            let bin = disc.discretize(graph.distance(i, j)) as usize;
            if bin < stride {
                counts[bin] += 1;
            }
        }

        let edges = self
            .bounds
            .edge_distances(graph.coord(i))
            .map(|e| disc.discretize(e) as f64);
        let mut density = vec![0.0; stride];
        let mut boundary = vec![0.0; stride];
        for r in 1..stride {
            let rf = r as f64;
            let mut b = disk_coverage(edges, rf);
            if !b.is_finite() {
                return Err(ErgmError::geometry(format!(
                    "boundary coverage of vertex {i} at bin {r} is {b}"
                )));
            }
            if b == 0.0 {
                b = boundary_floor;
            }
            let area = (b * rf - 0.5).max(boundary_floor);
            density[r] = counts[r] as f64 / area;
            boundary[r] = b;
        }
        Ok((density, boundary))
    }

    #[inline]
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    #[inline]
    pub fn d_max(&self) -> Bin {
        self.d_max
    }

    #[inline]
    pub fn density(&self) -> &BinTable {
        &self.density
    }

    #[inline]
    pub fn boundary(&self) -> &BinTable {
        &self.boundary
    }

    pub fn has_tables(&self) -> bool {
        !self.density.is_empty()
    }
}
