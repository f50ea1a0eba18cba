//! Prior distribution specifications.

use rand::Rng;
use rand_distr::{Beta, Distribution, LogNormal, Normal, Uniform};

use crate::error::PriorError;

/// A univariate prior for one parameter or initial pool.
///
/// Distributions with positive support (lognormal, beta) are the usual
/// choice for rates, sigmas, and pools; the ensemble contract expects
/// strictly positive draws wherever the model divides or normalizes.
#[derive(Debug, Clone, PartialEq)]
pub enum PriorSpec {
    /// A degenerate point mass (useful for sensitivity runs and tests).
    Fixed {
        /// The constant value.
        value: f64,
    },
    /// Uniform on [lo, hi).
    Uniform {
        /// Lower bound.
        lo: f64,
        /// Upper bound.
        hi: f64,
    },
    /// Normal with the given mean and standard deviation.
    Normal {
        /// Mean.
        mean: f64,
        /// Standard deviation.
        sd: f64,
    },
    /// Lognormal: `exp(N(location, scale))`, matching R's
    /// `rlnorm(meanlog, sdlog)`.
    LogNormal {
        /// Mean of the underlying Normal.
        location: f64,
        /// Standard deviation of the underlying Normal.
        scale: f64,
    },
    /// Beta on (0, 1), for per-timestep turnover fractions.
    Beta {
        /// First shape parameter.
        alpha: f64,
        /// Second shape parameter.
        beta: f64,
    },
}

impl PriorSpec {
    /// Draws `n` independent samples.
    ///
    /// # Errors
    ///
    /// Returns [`PriorError::InvalidSpec`] if the distribution parameters
    /// are rejected (non-finite value, `sd < 0`, `hi <= lo`, non-positive
    /// shape).
    pub fn draw_vec(
        &self,
        name: &'static str,
        n: usize,
        rng: &mut impl Rng,
    ) -> Result<Vec<f64>, PriorError> {
        let invalid = |reason: String| PriorError::InvalidSpec { name, reason };
        match *self {
            PriorSpec::Fixed { value } => {
                if !value.is_finite() {
                    return Err(invalid(format!("fixed value {value} is not finite")));
                }
                Ok(vec![value; n])
            }
            PriorSpec::Uniform { lo, hi } => {
                let dist =
                    Uniform::new(lo, hi).map_err(|e| invalid(format!("uniform({lo}, {hi}): {e}")))?;
                Ok((0..n).map(|_| dist.sample(rng)).collect())
            }
            PriorSpec::Normal { mean, sd } => {
                let dist =
                    Normal::new(mean, sd).map_err(|e| invalid(format!("normal({mean}, {sd}): {e}")))?;
                Ok((0..n).map(|_| dist.sample(rng)).collect())
            }
            PriorSpec::LogNormal { location, scale } => {
                let dist = LogNormal::new(location, scale)
                    .map_err(|e| invalid(format!("lognormal({location}, {scale}): {e}")))?;
                Ok((0..n).map(|_| dist.sample(rng)).collect())
            }
            PriorSpec::Beta { alpha, beta } => {
                let dist = Beta::new(alpha, beta)
                    .map_err(|e| invalid(format!("beta({alpha}, {beta}): {e}")))?;
                Ok((0..n).map(|_| dist.sample(rng)).collect())
            }
        }
    }
}

/// Dirichlet prior over the three allocation fractions
/// (respiration, wood, leaf). Draws are strictly positive and sum to 1 by
/// construction.
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationPrior {
    /// Dirichlet concentration parameters.
    pub concentration: [f64; 3],
}

impl AllocationPrior {
    /// Creates an allocation prior.
    pub fn new(concentration: [f64; 3]) -> Self {
        Self { concentration }
    }

    /// Draws `n` allocation triples.
    ///
    /// # Errors
    ///
    /// Returns [`PriorError::InvalidSpec`] for non-positive concentrations.
    pub fn draw_vec(
        &self,
        n: usize,
        rng: &mut impl Rng,
    ) -> Result<Vec<[f64; 3]>, PriorError> {
        let dist = rand_distr::Dirichlet::new(self.concentration).map_err(|e| {
            PriorError::InvalidSpec {
                name: "alloc",
                reason: format!("dirichlet({:?}): {e}", self.concentration),
            }
        })?;
        Ok((0..n).map(|_| dist.sample(rng)).collect())
    }
}

/// The full prior bundle: one spec per parameter field plus the initial
/// carbon pools.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterPriors {
    /// Specific leaf area.
    pub sla: PriorSpec,
    /// Light-use efficiency.
    pub lue: PriorSpec,
    /// Q10 temperature sensitivity.
    pub q10: PriorSpec,
    /// Basal heterotrophic respiration rate.
    pub r_basal: PriorSpec,
    /// Litterfall fraction per timestep.
    pub litterfall: PriorSpec,
    /// Mortality fraction per timestep.
    pub mortality: PriorSpec,
    /// Leaf-pool process-error standard deviation.
    pub sigma_leaf: PriorSpec,
    /// Wood-pool process-error standard deviation.
    pub sigma_wood: PriorSpec,
    /// Soil-pool process-error standard deviation.
    pub sigma_soil: PriorSpec,
    /// Allocation fractions.
    pub alloc: AllocationPrior,
    /// Initial leaf carbon.
    pub initial_leaf: PriorSpec,
    /// Initial wood carbon.
    pub initial_wood: PriorSpec,
    /// Initial soil organic carbon.
    pub initial_soil: PriorSpec,
}

impl ParameterPriors {
    /// The reference elicitation for a temperate deciduous site with a
    /// 30-minute timestep: lognormal rates, beta turnover fractions, and
    /// a respiration-leaning Dirichlet allocation.
    pub fn reference() -> Self {
        Self {
            sla: PriorSpec::LogNormal {
                location: 1.6,
                scale: 0.25,
            },
            lue: PriorSpec::LogNormal {
                location: -3.9,
                scale: 0.3,
            },
            q10: PriorSpec::LogNormal {
                location: 0.74,
                scale: 0.12,
            },
            r_basal: PriorSpec::LogNormal {
                location: -1.6,
                scale: 0.3,
            },
            litterfall: PriorSpec::Beta {
                alpha: 4.0,
                beta: 2000.0,
            },
            mortality: PriorSpec::Beta {
                alpha: 2.0,
                beta: 2000.0,
            },
            sigma_leaf: PriorSpec::LogNormal {
                location: -2.3,
                scale: 0.5,
            },
            sigma_wood: PriorSpec::LogNormal {
                location: -2.3,
                scale: 0.5,
            },
            sigma_soil: PriorSpec::LogNormal {
                location: -2.3,
                scale: 0.5,
            },
            alloc: AllocationPrior::new([5.0, 2.5, 2.5]),
            initial_leaf: PriorSpec::LogNormal {
                location: 1.6,
                scale: 0.3,
            },
            initial_wood: PriorSpec::LogNormal {
                location: 4.6,
                scale: 0.3,
            },
            initial_soil: PriorSpec::LogNormal {
                location: 4.4,
                scale: 0.3,
            },
        }
    }
}
