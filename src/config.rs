use std::path::PathBuf;

use serde::Deserialize;

/// Top-level Demeter configuration.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DemeterConfig {
    /// Global RNG seed.
    #[serde(default)]
    pub seed: Option<u64>,

    /// I/O settings.
    #[serde(default)]
    pub io: IoToml,

    /// Process-model settings.
    #[serde(default)]
    pub model: ModelToml,

    /// Ensemble settings.
    #[serde(default)]
    pub ensemble: EnsembleToml,

    /// Particle-filter settings.
    #[serde(default)]
    pub filter: FilterToml,

    /// Prior distribution settings.
    #[serde(default)]
    pub priors: PriorsToml,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct IoToml {
    pub drivers: Option<PathBuf>,
    pub observations: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub summary: Option<PathBuf>,
    #[serde(default = "default_temp_var")]
    pub temp_var: String,
    #[serde(default = "default_par_var")]
    pub par_var: String,
    #[serde(default = "default_obs_var")]
    pub obs_var: String,
    #[serde(default = "default_obs_sd_var")]
    pub obs_sd_var: String,
    #[serde(default = "default_compression")]
    pub compression: String,
    #[serde(default = "default_row_group_size")]
    pub row_group_size: usize,
}

fn default_temp_var() -> String {
    "tair".to_string()
}
fn default_par_var() -> String {
    "par".to_string()
}
fn default_obs_var() -> String {
    "lai".to_string()
}
fn default_obs_sd_var() -> String {
    "lai_sd".to_string()
}
fn default_compression() -> String {
    "snappy".to_string()
}
fn default_row_group_size() -> usize {
    1_000_000
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelToml {
    #[serde(default = "default_timestep_secs")]
    pub timestep_secs: f64,
    #[serde(default = "default_night_par_threshold")]
    pub night_par_threshold: f64,
}

impl Default for ModelToml {
    fn default() -> Self {
        Self {
            timestep_secs: default_timestep_secs(),
            night_par_threshold: default_night_par_threshold(),
        }
    }
}

fn default_timestep_secs() -> f64 {
    1800.0
}
fn default_night_par_threshold() -> f64 {
    1e-20
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnsembleToml {
    #[serde(default = "default_n_particles")]
    pub n_particles: usize,
}

impl Default for EnsembleToml {
    fn default() -> Self {
        Self {
            n_particles: default_n_particles(),
        }
    }
}

fn default_n_particles() -> usize {
    5000
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilterToml {
    /// Observed output variable (snake_case column name, e.g. "lai").
    #[serde(default = "default_observed")]
    pub observed: String,
    /// Observation cadence in forecast steps. The default pairs a
    /// 30-minute model step with an 8-day observation product.
    #[serde(default = "default_cadence")]
    pub cadence: usize,
    #[serde(default = "default_ess_fraction")]
    pub ess_fraction: f64,
    #[serde(default = "default_smoothing")]
    pub smoothing: f64,
    #[serde(default = "default_true")]
    pub resample: bool,
}

impl Default for FilterToml {
    fn default() -> Self {
        Self {
            observed: default_observed(),
            cadence: default_cadence(),
            ess_fraction: default_ess_fraction(),
            smoothing: default_smoothing(),
            resample: true,
        }
    }
}

fn default_observed() -> String {
    "lai".to_string()
}
fn default_cadence() -> usize {
    384
}
fn default_ess_fraction() -> f64 {
    0.5
}
fn default_smoothing() -> f64 {
    0.98
}
fn default_true() -> bool {
    true
}

/// One univariate prior in TOML form, tagged by `dist`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "dist", rename_all = "lowercase")]
pub enum PriorToml {
    Fixed { value: f64 },
    Uniform { lo: f64, hi: f64 },
    Normal { mean: f64, sd: f64 },
    Lognormal { location: f64, scale: f64 },
    Beta { alpha: f64, beta: f64 },
}

/// Prior overrides; any field left unset falls back to the reference
/// elicitation.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct PriorsToml {
    pub sla: Option<PriorToml>,
    pub lue: Option<PriorToml>,
    pub q10: Option<PriorToml>,
    pub r_basal: Option<PriorToml>,
    pub litterfall: Option<PriorToml>,
    pub mortality: Option<PriorToml>,
    pub sigma_leaf: Option<PriorToml>,
    pub sigma_wood: Option<PriorToml>,
    pub sigma_soil: Option<PriorToml>,
    /// Dirichlet concentration for the allocation fractions.
    pub alloc: Option<[f64; 3]>,
    pub initial_leaf: Option<PriorToml>,
    pub initial_wood: Option<PriorToml>,
    pub initial_soil: Option<PriorToml>,
}
