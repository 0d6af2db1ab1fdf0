use validator::{Validate, ValidationError};

use crate::error::SimError;
use crate::vector::Vector;

/// How one sweep's single-site updates are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SweepMode {
    /// Uniformly random sites over the whole lattice, one RNG.
    Sequential,
    /// One worker per quadrant/octant, each with its own RNG.
    #[default]
    Partitioned,
}

impl TryFrom<&str> for SweepMode {
    type Error = String;
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "sequential" => Ok(Self::Sequential),
            "partitioned" => Ok(Self::Partitioned),
            _ => Err(format!(
                "unknown sweep_mode '{s}', expected 'sequential' or 'partitioned'"
            )),
        }
    }
}

/// Candidate-state proposal for a Metropolis step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProposalPolicy {
    /// One unit along one table axis: `bits & 3` picks x+1, x−1, y+1 or y−1.
    #[default]
    Axial,
    /// Both indices step: bit 0 picks x±1, bit 1 picks y±1.
    Diagonal,
}

impl TryFrom<&str> for ProposalPolicy {
    type Error = String;
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "axial" => Ok(Self::Axial),
            "diagonal" => Ok(Self::Diagonal),
            _ => Err(format!(
                "unknown proposal '{s}', expected 'axial' or 'diagonal'"
            )),
        }
    }
}

/// Thermodynamic parameters threaded through every update call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelParams {
    temperature: f64,
    field: Vector,
}

impl ModelParams {
    pub fn new(temperature: f64, field: Vector) -> Result<Self, SimError> {
        if !(temperature.is_finite() && temperature > 0.0) {
            return Err(SimError::NonPositiveTemperature(temperature));
        }
        if !field.is_finite() {
            return Err(SimError::NonFiniteField);
        }
        Ok(Self { temperature, field })
    }

    /// Field along `z` only, the common case for collinear models.
    pub fn with_field_z(temperature: f64, field_z: f64) -> Result<Self, SimError> {
        Self::new(temperature, Vector::new(0.0, 0.0, field_z))
    }

    #[inline]
    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    #[inline]
    pub fn field(&self) -> Vector {
        self.field
    }
}

fn validate_sim_config(cfg: &SimConfig) -> Result<(), ValidationError> {
    if cfg.sweeps_per_sample < 1 {
        return Err(ValidationError::new("sweeps_per_sample must be >= 1"));
    }
    if cfg.steps_per_sweep == Some(0) {
        return Err(ValidationError::new("steps_per_sweep must be >= 1"));
    }
    Ok(())
}

/// Burn-in and sampling schedule for [`crate::run_simulation`].
#[derive(Debug, Clone, Validate)]
#[validate(schema(function = "validate_sim_config"))]
pub struct SimConfig {
    pub burn_in_sweeps: usize,
    #[validate(range(min = 1))]
    pub n_samples: usize,
    pub sweeps_per_sample: usize,
    /// Single-site updates per sweep; `None` means one per site.
    pub steps_per_sweep: Option<usize>,
    pub sweep_mode: SweepMode,
    /// Run partition workers on the current thread instead of rayon.
    pub sequential: bool,
}

impl SimConfig {
    /// Sweeps one run performs, saturating at `usize::MAX`.
    pub fn total_sweeps(&self) -> usize {
        self.n_samples
            .saturating_mul(self.sweeps_per_sample)
            .saturating_add(self.burn_in_sweeps)
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            burn_in_sweeps: 20,
            n_samples: 100,
            sweeps_per_sample: 1,
            steps_per_sweep: None,
            sweep_mode: SweepMode::Partitioned,
            sequential: false,
        }
    }
}
