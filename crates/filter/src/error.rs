//! Error types for the demeter-filter crate.

use demeter_forecast::ForecastError;
use demeter_model::ModelError;

/// Error type for all fallible operations in the demeter-filter crate.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FilterError {
    /// Process-model error.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Forecast-engine error.
    #[error(transparent)]
    Forecast(#[from] ForecastError),

    /// Returned when two index-aligned arrays disagree in length.
    #[error("length mismatch for {name}: expected {expected}, got {got}")]
    LengthMismatch {
        /// Name of the mismatched array.
        name: &'static str,
        /// Expected length.
        expected: usize,
        /// Actual length.
        got: usize,
    },

    /// Returned when resampling is triggered but the weights carry no mass.
    #[error("cannot resample: weight sum {sum} is not a valid distribution")]
    DegenerateWeights {
        /// The offending weight sum.
        sum: f64,
    },

    /// Returned when the kernel smoother's empirical covariance is not
    /// positive definite even after a jitter retry.
    #[error("parameter covariance is degenerate, cannot draw smoothing noise")]
    DegenerateCovariance,

    /// Returned for a smoothing factor outside [0, 1].
    #[error("smoothing factor {h} outside [0, 1]")]
    InvalidSmoothing {
        /// The offending factor.
        h: f64,
    },

    /// Returned when the observation series cannot cover the horizon.
    #[error("observation series has {got} slots, horizon needs {needed}")]
    ObservationCoverage {
        /// Slots required by the horizon and cadence.
        needed: usize,
        /// Slots available.
        got: usize,
    },

    /// Returned when a filter configuration value is invalid.
    #[error("invalid filter configuration: {reason}")]
    InvalidConfig {
        /// Human-readable description of the problem.
        reason: String,
    },
}
