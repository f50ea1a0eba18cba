//! # demeter-filter
//!
//! Resample-move particle filter for sequential ecosystem data
//! assimilation.
//!
//! # Forecast-analysis loop
//!
//! ```text
//!  ┌──────────────┐  every step   ┌─────────────────┐  obs present  ┌───────────────┐
//!  │   Forecast    │─────────────▶│  slot mapping    │──────────────▶│  weight update │
//!  │  (one step)   │              │ (cadence check)  │               │  + ESS check   │
//!  └──────▲───────┘              └─────────────────┘               └───────┬───────┘
//!         │                                                 ESS < N/2      ▼
//!         │                                              ┌────────────────────┐
//!         └──────────────────────────────────────────────│   resample-move     │
//!                         new ensemble                   │ (multinomial + kernel│
//!                                                        │  parameter smoother) │
//!                                                        └────────────────────┘
//! ```
//!
//! Weights are carried un-normalized; normalization happens only inside the
//! effective-sample-size computation and weighted summaries. Resampling
//! resets every weight to 1.
//!
//! # Quick start
//!
//! ```ignore
//! use demeter_filter::{Ensemble, FilterConfig, ObservationSeries, run_assimilation};
//!
//! let ensemble = Ensemble::with_uniform_weights(state, params)?;
//! let config = FilterConfig::new().with_smoothing(0.95);
//! let result = run_assimilation(ensemble, &drivers, &observations, &model_config, &config, &mut rng)?;
//! ```

mod analysis;
mod config;
mod ensemble;
mod error;
mod ess;
mod history;
mod linalg;
mod observation;
mod resample;
mod run;
mod smoother;
mod weights;

pub use analysis::{AnalysisRecord, analysis_step};
pub use config::FilterConfig;
pub use ensemble::Ensemble;
pub use error::FilterError;
pub use ess::effective_sample_size;
pub use history::{ParamSnapshot, ParameterHistory};
pub use observation::{Observation, ObservationSeries};
pub use resample::{multinomial_indices, resample_move};
pub use run::{AssimilationResult, run_assimilation};
pub use smoother::smooth_params;
pub use weights::{CumulativeWeights, cumulative_weights, update_weights};
