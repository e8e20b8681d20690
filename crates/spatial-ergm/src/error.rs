//! Error type shared by graph construction, term precomputation, and sampling.

use thiserror::Error;

/// Failures raised by the spatial ERGM core.
///
/// `InvalidGeometry` and `InvalidStatistic` are fatal for the run: they mean
/// the configuration or the precomputed tables are broken, never that a single
/// proposal should be skipped.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ErgmError {
    #[error("invalid config: {reason}")]
    InvalidConfig { reason: String },

    #[error("vertex {vertex} has a non-finite coordinate")]
    InvalidCoordinate { vertex: usize },

    #[error("vertex {vertex} out of range (n = {n})")]
    VertexOutOfRange { vertex: usize, n: usize },

    #[error("self-loop on vertex {vertex} is not allowed")]
    SelfLoop { vertex: usize },

    #[error("graph has no vertices")]
    EmptyGraph,

    #[error("invalid geometry: {reason}")]
    InvalidGeometry { reason: String },

    #[error("change statistic for ({i}, {j}) is {value}")]
    InvalidStatistic { i: usize, j: usize, value: f64 },
}

impl ErgmError {
    pub(crate) fn config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    pub(crate) fn geometry(reason: impl Into<String>) -> Self {
        Self::InvalidGeometry {
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ErgmError>;
