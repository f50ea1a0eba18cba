//! Error types for the demeter-forecast crate.

use demeter_model::ModelError;

/// Error type for all fallible operations in the demeter-forecast crate.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ForecastError {
    /// Process-model error.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Returned when the driver series is shorter than the horizon.
    #[error("drivers cover {available} steps, horizon needs {needed}")]
    InsufficientDrivers {
        /// Steps available in the driver series.
        available: usize,
        /// Steps required.
        needed: usize,
    },

    /// Returned when a segment range is empty or outside the tensor.
    #[error("invalid segment {start}..{end} for tensor of {n_steps} steps")]
    InvalidSegment {
        /// Segment start (inclusive).
        start: usize,
        /// Segment end (exclusive).
        end: usize,
        /// Tensor step count.
        n_steps: usize,
    },

    /// Returned when a tensor index is out of range.
    #[error("step {step} out of range: tensor has {n_steps} steps")]
    StepOutOfRange {
        /// Requested step.
        step: usize,
        /// Tensor step count.
        n_steps: usize,
    },
}
