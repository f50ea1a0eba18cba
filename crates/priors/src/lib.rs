//! # demeter-priors
//!
//! Prior distribution specifications and initial-ensemble draws for the
//! Demeter particle filter.
//!
//! The filter core consumes N-length arrays per parameter field and never
//! generates priors itself; this crate is the collaborator that turns
//! elicited distribution choices into those arrays.
//!
//! # Quick start
//!
//! ```ignore
//! use demeter_priors::{ParameterPriors, PriorSpec, draw_parameters, draw_initial_state};
//!
//! let priors = ParameterPriors::reference();
//! let params = draw_parameters(&priors, 5000, &mut rng)?;
//! let state = draw_initial_state(&priors, 5000, &mut rng)?;
//! ```

mod draw;
mod error;
mod spec;

pub use draw::{draw_initial_state, draw_parameters};
pub use error::PriorError;
pub use spec::{AllocationPrior, ParameterPriors, PriorSpec};
