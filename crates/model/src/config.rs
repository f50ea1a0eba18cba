//! Model configuration: timestep, unit conversion, and night threshold.

use crate::error::ModelError;

/// Configuration for the process-model step.
///
/// # Example
///
/// ```
/// use demeter_model::ModelConfig;
///
/// let config = ModelConfig::new().with_timestep_secs(3600.0);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// Length of one model timestep in seconds.
    timestep_secs: f64,
    /// PAR at or below this value is treated as night (GPP forced to zero).
    night_par_threshold: f64,
    /// Conversion from leaf carbon (Mg/ha) to leaf area index via SLA.
    lai_conversion: f64,
}

impl ModelConfig {
    /// Creates a configuration with the reference defaults:
    /// 30-minute timestep, 1e-20 night threshold, 0.1 Mg/ha -> kg/m2.
    pub fn new() -> Self {
        Self {
            timestep_secs: 1800.0,
            night_par_threshold: 1e-20,
            lai_conversion: 0.1,
        }
    }

    /// Sets the timestep length in seconds.
    pub fn with_timestep_secs(mut self, secs: f64) -> Self {
        self.timestep_secs = secs;
        self
    }

    /// Sets the night PAR threshold.
    pub fn with_night_par_threshold(mut self, threshold: f64) -> Self {
        self.night_par_threshold = threshold;
        self
    }

    /// Returns the timestep length in seconds.
    pub fn timestep_secs(&self) -> f64 {
        self.timestep_secs
    }

    /// Returns the night PAR threshold.
    pub fn night_par_threshold(&self) -> f64 {
        self.night_par_threshold
    }

    /// Returns the leaf-carbon-to-LAI conversion factor.
    pub fn lai_conversion(&self) -> f64 {
        self.lai_conversion
    }

    /// Conversion from a carbon flux (umol CO2 m-2 s-1) to a pool increment
    /// (Mg C ha-1 per timestep).
    ///
    /// Folds umol->mol (1e-6), 12 g C per mol, g->Mg (1e-6), m2->ha (1e4),
    /// and seconds per timestep into one multiplier.
    pub fn flux_to_pool(&self) -> f64 {
        self.timestep_secs * 1e-6 * 12.0 * 1e-6 * 1e4
    }

    /// Validates this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidConfig`] if the timestep is not strictly
    /// positive and finite, or the night threshold is negative or non-finite.
    pub fn validate(&self) -> Result<(), ModelError> {
        if !self.timestep_secs.is_finite() || self.timestep_secs <= 0.0 {
            return Err(ModelError::InvalidConfig {
                reason: format!("timestep_secs must be positive, got {}", self.timestep_secs),
            });
        }
        if !self.night_par_threshold.is_finite() || self.night_par_threshold < 0.0 {
            return Err(ModelError::InvalidConfig {
                reason: format!(
                    "night_par_threshold must be non-negative, got {}",
                    self.night_par_threshold
                ),
            });
        }
        if !self.lai_conversion.is_finite() || self.lai_conversion <= 0.0 {
            return Err(ModelError::InvalidConfig {
                reason: format!("lai_conversion must be positive, got {}", self.lai_conversion),
            });
        }
        Ok(())
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self::new()
    }
}
