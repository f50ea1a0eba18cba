//! Filter configuration.

use demeter_model::OutputVar;

use crate::error::FilterError;

/// Configuration for the analysis step and sequential loop.
///
/// # Example
///
/// ```
/// use demeter_filter::FilterConfig;
/// use demeter_model::OutputVar;
///
/// let config = FilterConfig::new()
///     .with_observed(OutputVar::Lai)
///     .with_smoothing(0.95);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct FilterConfig {
    /// Output variable the observations constrain.
    observed: OutputVar,
    /// Resample when `ess < ess_fraction * N`.
    ess_fraction: f64,
    /// Kernel smoothing factor h in [0, 1].
    smoothing: f64,
    /// Whether resample-move runs at all (false = the non-resampling
    /// filter: weights accumulate across the whole horizon).
    resample: bool,
}

impl FilterConfig {
    /// Creates a configuration with the defaults: observed LAI, resample
    /// below N/2, smoothing h = 0.98 (the Liu-West discount convention).
    pub fn new() -> Self {
        Self {
            observed: OutputVar::Lai,
            ess_fraction: 0.5,
            smoothing: 0.98,
            resample: true,
        }
    }

    /// Sets the observed output variable.
    pub fn with_observed(mut self, var: OutputVar) -> Self {
        self.observed = var;
        self
    }

    /// Sets the ESS resampling threshold as a fraction of N.
    pub fn with_ess_fraction(mut self, fraction: f64) -> Self {
        self.ess_fraction = fraction;
        self
    }

    /// Sets the kernel smoothing factor.
    pub fn with_smoothing(mut self, h: f64) -> Self {
        self.smoothing = h;
        self
    }

    /// Enables or disables resample-move.
    pub fn with_resample(mut self, resample: bool) -> Self {
        self.resample = resample;
        self
    }

    /// Returns the observed output variable.
    pub fn observed(&self) -> OutputVar {
        self.observed
    }

    /// Returns the ESS threshold fraction.
    pub fn ess_fraction(&self) -> f64 {
        self.ess_fraction
    }

    /// Returns the kernel smoothing factor.
    pub fn smoothing(&self) -> f64 {
        self.smoothing
    }

    /// Returns whether resample-move is enabled.
    pub fn resample(&self) -> bool {
        self.resample
    }

    /// Validates this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::InvalidConfig`] if the ESS fraction is
    /// outside (0, 1] or [`FilterError::InvalidSmoothing`] if h is
    /// outside [0, 1].
    pub fn validate(&self) -> Result<(), FilterError> {
        if !self.ess_fraction.is_finite() || self.ess_fraction <= 0.0 || self.ess_fraction > 1.0 {
            return Err(FilterError::InvalidConfig {
                reason: format!("ess_fraction must be in (0, 1], got {}", self.ess_fraction),
            });
        }
        if !(0.0..=1.0).contains(&self.smoothing) || self.smoothing.is_nan() {
            return Err(FilterError::InvalidSmoothing { h: self.smoothing });
        }
        Ok(())
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self::new()
    }
}
