//! Error types for the demeter-priors crate.

use demeter_model::ModelError;

/// Error type for all fallible operations in the demeter-priors crate.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PriorError {
    /// Model-layer error while assembling the drawn ensemble.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Returned when a distribution specification is invalid.
    #[error("invalid prior for {name}: {reason}")]
    InvalidSpec {
        /// The parameter the prior belongs to.
        name: &'static str,
        /// What was wrong with it.
        reason: String,
    },

    /// Returned when zero particles are requested.
    #[error("cannot draw an ensemble of 0 particles")]
    EmptyDraw,
}
