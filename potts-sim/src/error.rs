use thiserror::Error;

/// Errors reported by lattice construction and the simulation driver.
///
/// Metropolis rejections are not errors; update calls are infallible once a
/// lattice and its parameters have been accepted.
#[derive(Debug, Error, PartialEq)]
pub enum SimError {
    #[error("temperature must be finite and > 0, got {0}")]
    NonPositiveTemperature(f64),
    #[error("external field components must be finite")]
    NonFiniteField,
    #[error("orientation table {nx}x{ny} is degenerate (need nx in 1..=65535, ny in 2..=65535)")]
    DegenerateOrientationTable { nx: usize, ny: usize },
    #[error("lattice extent along axis {axis} is zero")]
    EmptyLattice { axis: usize },
    #[error("lattice of shape {shape:?} has more than u32::MAX sites")]
    LatticeTooLarge { shape: Vec<usize> },
    #[error("only 2D and 3D lattices are supported, got {0} dimensions")]
    UnsupportedDimension(usize),
    #[error("coupling at site {site}, axis {axis} is not finite")]
    NonFiniteCoupling { site: usize, axis: usize },
    #[error("coupling table has length {actual}, expected {expected}")]
    CouplingShape { expected: usize, actual: usize },
    #[error("partitioned sweeps need every extent >= 2, axis {axis} has {extent}")]
    PartitionTooSmall { axis: usize, extent: usize },
    #[error("expected {expected} worker RNGs, got {actual}")]
    RngCountMismatch { expected: usize, actual: usize },
    #[error("invalid simulation config: {0}")]
    InvalidConfig(String),
    #[error("unable to allocate storage for {0} samples")]
    SampleAllocation(usize),
    #[error("sample buffer full ({capacity} samples)")]
    CapacityExceeded { capacity: usize },
    #[error("interrupted")]
    Interrupted,
}

impl From<validator::ValidationErrors> for SimError {
    fn from(e: validator::ValidationErrors) -> Self {
        Self::InvalidConfig(format!("{e}"))
    }
}
