//! Error types for the demeter-model crate.

/// Error type for all fallible operations in the demeter-model crate.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ModelError {
    /// Returned when the ensemble has zero particles.
    #[error("ensemble is empty")]
    EmptyEnsemble,

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

    /// Returned when a timestep index is outside the driver series.
    #[error("timestep {step} out of range: series has {n_steps} steps")]
    StepOutOfRange {
        /// Requested timestep.
        step: usize,
        /// Number of steps in the series.
        n_steps: usize,
    },

    /// Returned when a resampling index points outside the ensemble.
    #[error("particle index {index} out of range for ensemble of {len}")]
    ParticleOutOfRange {
        /// Offending index.
        index: usize,
        /// Ensemble size.
        len: usize,
    },

    /// Returned when an output buffer does not match the required size.
    #[error("output buffer length mismatch: expected {expected}, got {got}")]
    BufferLengthMismatch {
        /// Required buffer length.
        expected: usize,
        /// Actual buffer length.
        got: usize,
    },

    /// Returned when an allocation triple cannot be renormalized.
    #[error("allocation fractions for particle {particle} sum to zero")]
    DegenerateAllocation {
        /// Offending particle index.
        particle: usize,
    },

    /// Returned when a model configuration value is invalid.
    #[error("invalid model configuration: {reason}")]
    InvalidConfig {
        /// Human-readable description of the problem.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_empty_ensemble() {
        assert_eq!(ModelError::EmptyEnsemble.to_string(), "ensemble is empty");
    }

    #[test]
    fn error_length_mismatch() {
        let err = ModelError::LengthMismatch {
            name: "sla",
            expected: 10,
            got: 7,
        };
        assert_eq!(
            err.to_string(),
            "length mismatch for sla: expected 10, got 7"
        );
    }

    #[test]
    fn error_step_out_of_range() {
        let err = ModelError::StepOutOfRange {
            step: 12,
            n_steps: 10,
        };
        assert_eq!(err.to_string(), "timestep 12 out of range: series has 10 steps");
    }

    #[test]
    fn error_degenerate_allocation() {
        let err = ModelError::DegenerateAllocation { particle: 3 };
        assert_eq!(
            err.to_string(),
            "allocation fractions for particle 3 sum to zero"
        );
    }

    #[test]
    fn error_is_std_error() {
        fn assert_impl<T: std::error::Error>() {}
        assert_impl::<ModelError>();
    }
}
