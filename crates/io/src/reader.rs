//! High-level driver and observation readers.

use std::path::Path;

use demeter_filter::Observation;
use demeter_model::Driver;
use tracing::info;

use crate::error::IoError;
use crate::netcdf_read::{open_file, read_1d_f64};

/// Configuration for reading the forcing file.
///
/// Each variable is looked up under its configured name first, then the
/// built-in aliases.
#[derive(Debug, Clone)]
pub struct DriverReaderConfig {
    /// Primary name of the air-temperature variable.
    temp_var: String,
    /// Primary name of the PAR variable.
    par_var: String,
}

impl DriverReaderConfig {
    /// Fallback names for the temperature variable.
    const TEMP_ALIASES: [&'static str; 3] = ["tair", "temp", "air_temperature"];
    /// Fallback names for the PAR variable.
    const PAR_ALIASES: [&'static str; 3] = ["par", "ppfd", "rad"];

    /// Creates a configuration with the default variable names
    /// (`tair`, `par`).
    pub fn new() -> Self {
        Self {
            temp_var: "tair".to_string(),
            par_var: "par".to_string(),
        }
    }

    /// Sets the temperature variable name.
    pub fn with_temp_var(mut self, name: impl Into<String>) -> Self {
        self.temp_var = name.into();
        self
    }

    /// Sets the PAR variable name.
    pub fn with_par_var(mut self, name: impl Into<String>) -> Self {
        self.par_var = name.into();
        self
    }

    /// Returns the temperature variable name.
    pub fn temp_var(&self) -> &str {
        &self.temp_var
    }

    /// Returns the PAR variable name.
    pub fn par_var(&self) -> &str {
        &self.par_var
    }
}

impl Default for DriverReaderConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Reads the per-timestep forcing series from a NetCDF file.
///
/// Both variables must be 1-D with equal length; the model does not
/// support gaps, so non-finite values fail validation here rather than
/// poisoning the forecast.
///
/// # Errors
///
/// Returns [`IoError`] on a missing file or variable, mismatched lengths,
/// or non-finite forcing values.
pub fn read_drivers(path: &Path, config: &DriverReaderConfig) -> Result<Vec<Driver>, IoError> {
    let file = open_file(path)?;

    let temp_aliases: Vec<&str> = std::iter::once(config.temp_var())
        .chain(DriverReaderConfig::TEMP_ALIASES)
        .collect();
    let par_aliases: Vec<&str> = std::iter::once(config.par_var())
        .chain(DriverReaderConfig::PAR_ALIASES)
        .collect();

    let temp = read_1d_f64(&file, &temp_aliases, path)?;
    let par = read_1d_f64(&file, &par_aliases, path)?;
    if par.len() != temp.len() {
        return Err(IoError::LengthMismatch {
            name: config.par_var().to_string(),
            expected: temp.len(),
            got: par.len(),
        });
    }

    let bad = temp
        .iter()
        .chain(par.iter())
        .filter(|v| !v.is_finite())
        .count();
    if bad > 0 {
        return Err(IoError::Validation {
            count: bad,
            details: "forcing values must be finite (the model has no gap handling)".to_string(),
        });
    }

    info!(path = %path.display(), n_steps = temp.len(), "drivers loaded");
    Ok(temp
        .into_iter()
        .zip(par)
        .map(|(t, p)| Driver::new(t, p))
        .collect())
}

/// Configuration for reading the observation file.
#[derive(Debug, Clone)]
pub struct ObsReaderConfig {
    /// Primary name of the observed-value variable.
    value_var: String,
    /// Primary name of the observation-uncertainty variable.
    sd_var: String,
}

impl ObsReaderConfig {
    /// Fallback names for the value variable.
    const VALUE_ALIASES: [&'static str; 2] = ["lai", "obs"];
    /// Fallback names for the uncertainty variable.
    const SD_ALIASES: [&'static str; 2] = ["lai_sd", "obs_sd"];

    /// Creates a configuration with the default variable names
    /// (`lai`, `lai_sd`).
    pub fn new() -> Self {
        Self {
            value_var: "lai".to_string(),
            sd_var: "lai_sd".to_string(),
        }
    }

    /// Sets the value variable name.
    pub fn with_value_var(mut self, name: impl Into<String>) -> Self {
        self.value_var = name.into();
        self
    }

    /// Sets the uncertainty variable name.
    pub fn with_sd_var(mut self, name: impl Into<String>) -> Self {
        self.sd_var = name.into();
        self
    }

    /// Returns the value variable name.
    pub fn value_var(&self) -> &str {
        &self.value_var
    }

    /// Returns the uncertainty variable name.
    pub fn sd_var(&self) -> &str {
        &self.sd_var
    }
}

impl Default for ObsReaderConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Reads observation slots from a NetCDF file.
///
/// A NaN in either the value or the uncertainty marks a missing slot
/// (`None`), the filter's "skip analysis" signal.
///
/// # Errors
///
/// Returns [`IoError`] on a missing file or variable, or mismatched
/// lengths.
pub fn read_observations(
    path: &Path,
    config: &ObsReaderConfig,
) -> Result<Vec<Option<Observation>>, IoError> {
    let file = open_file(path)?;

    let value_aliases: Vec<&str> = std::iter::once(config.value_var())
        .chain(ObsReaderConfig::VALUE_ALIASES)
        .collect();
    let sd_aliases: Vec<&str> = std::iter::once(config.sd_var())
        .chain(ObsReaderConfig::SD_ALIASES)
        .collect();

    let values = read_1d_f64(&file, &value_aliases, path)?;
    let sds = read_1d_f64(&file, &sd_aliases, path)?;
    if sds.len() != values.len() {
        return Err(IoError::LengthMismatch {
            name: config.sd_var().to_string(),
            expected: values.len(),
            got: sds.len(),
        });
    }

    let slots: Vec<Option<Observation>> = values
        .into_iter()
        .zip(sds)
        .map(|(v, sd)| (v.is_finite() && sd.is_finite()).then(|| Observation::new(v, sd)))
        .collect();

    let n_missing = slots.iter().filter(|s| s.is_none()).count();
    info!(
        path = %path.display(),
        n_slots = slots.len(),
        n_missing,
        "observations loaded"
    );
    Ok(slots)
}
