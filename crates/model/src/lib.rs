//! # demeter-model
//!
//! Three-pool stochastic ecosystem carbon process model.
//!
//! The model tracks leaf, wood, and soil organic carbon per ensemble member
//! (particle) and advances all particles one timestep at a time:
//!
//! ```text
//!        PAR ──▶ GPP ──┬─▶ Ra (respired)
//!                      ├─▶ wood NPP ──▶ [WOOD] ──mortality──┐
//!                      └─▶ leaf NPP ──▶ [LEAF] ──litterfall─┤
//!                                                           ▼
//!        temp ──▶ Q10 ──▶ Rh ◀────────────────────────── [SOIL]
//! ```
//!
//! Each pool update adds Normal process noise with a per-particle standard
//! deviation and truncates at zero. The step is a pure function of state,
//! parameters, drivers, and the RNG stream.
//!
//! # Quick start
//!
//! ```ignore
//! use demeter_model::{CarbonPools, Driver, ModelConfig, StepDrivers, step};
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//!
//! let config = ModelConfig::new();
//! let mut rng = StdRng::seed_from_u64(42);
//! let rows = step(&state, &params, StepDrivers::Broadcast(Driver::new(15.0, 800.0)), &config, &mut rng)?;
//! ```

mod config;
mod drivers;
mod error;
mod params;
mod state;
mod step;

pub use config::ModelConfig;
pub use drivers::{Driver, DriverSeries, StepDrivers};
pub use error::ModelError;
pub use params::{Allocation, PARAM_DIM, ParamEnsemble, ParticleParams};
pub use state::{CarbonPools, NUM_VARS, OutputVar};
pub use step::{step, step_into};
