//! Spatial exponential-random-graph sampler.
//!
//! Generates synthetic social networks over a fixed set of located vertices.
//! Edge formation follows an inverse-square ("gravity") decay in distance,
//! optionally corrected for local population density and for clipping of the
//! sampling disk at the study-area boundary.
//!
//! Layout (leaves first)
//! - `graph`: `SpatialGraph`, the mutable adjacency state over located vertices.
//! - `discretize`: distance → bin mapping.
//! - `boundary`: angular coverage of a disk clipped by the study area.
//! - `density`: per-vertex density and boundary tables, precomputed once.
//! - `term`: the `ErgmTerm` interface, the weighted `Ergm`, and `GravityTerm`.
//! - `sampler`: `ChainSampler`, a Metropolis–Hastings chain over edge toggles.

pub mod boundary;
pub mod density;
pub mod discretize;
pub mod error;
pub mod graph;
pub mod sampler;
pub mod term;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use error::{ErgmError, Result};
pub use nalgebra::Vector2 as Vec2;

/// Common exports for callers.
pub mod prelude {
    pub use crate::discretize::{Bin, Discretizer};
    pub use crate::error::{ErgmError, Result};
    pub use crate::graph::{Bounds, SpatialGraph};
    pub use crate::sampler::{
        run_chains, ChainSampler, ChainSeed, ProposalPolicy, RunStats, SamplerCfg, Schedule,
        Step, UniformPairs,
    };
    pub use crate::term::{Ergm, ErgmTerm, GravityCfg, GravityTerm};
    pub use nalgebra::Vector2 as Vec2;
}
