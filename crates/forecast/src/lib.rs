//! # demeter-forecast
//!
//! Ensemble forecast engine: iterates the process model over a time
//! horizon, threading the evolving carbon-pool state forward and
//! materializing the full `[step][particle][variable]` output tensor.
//!
//! Timesteps are strictly sequential (step t needs step t-1's state);
//! particles within a step run in parallel inside `demeter-model`.
//!
//! ```ignore
//! use demeter_forecast::run_forecast;
//!
//! let output = run_forecast(&initial, &params, &drivers, &config, &mut rng)?;
//! let final_state = output.state_at(output.n_steps() - 1);
//! ```

mod error;
mod forecast;
mod output;

pub use error::ForecastError;
pub use forecast::{fill_segment, run_forecast};
pub use output::ForecastOutput;
