//! Simulation error taxonomy

use crate::solvers::SolverError;
use thiserror::Error;

/// Errors surfaced by the simulation core
///
/// Parameter variants are raised before any state mutation; numeric variants
/// abort the run with no partial series returned. Output clamping and the
/// integral anti-windup freeze are normal control-flow outcomes, not errors.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("time constant must be positive and finite, got {0}")]
    InvalidTimeConstant(f64),

    #[error("dead time must be non-negative and finite, got {0}")]
    InvalidDeadTime(f64),

    #[error("model gain must be finite, got {0}")]
    InvalidGain(f64),

    #[error("model bias must be finite, got {0}")]
    InvalidBias(f64),

    #[error("output limits are inverted: lower {lower} > upper {upper}")]
    InvertedLimits { lower: f64, upper: f64 },

    #[error("solver failed during step {step}: {source}")]
    SolverFailure { step: usize, source: SolverError },

    #[error("process variable became non-finite at step {step}")]
    NonFinitePv { step: usize },
}

impl SimError {
    /// True for configuration errors detected before the run starts
    pub fn is_invalid_parameter(&self) -> bool {
        matches!(
            self,
            SimError::InvalidTimeConstant(_)
                | SimError::InvalidDeadTime(_)
                | SimError::InvalidGain(_)
                | SimError::InvalidBias(_)
                | SimError::InvertedLimits { .. }
        )
    }

    /// True for numeric failures surfaced mid-run
    pub fn is_numeric_instability(&self) -> bool {
        matches!(
            self,
            SimError::SolverFailure { .. } | SimError::NonFinitePv { .. }
        )
    }
}
