//! Meteorological forcing and its alignment to the ensemble shape.

use crate::error::ModelError;

/// Forcing for one timestep: air temperature (degrees C) and
/// photosynthetically active radiation (umol m-2 s-1).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Driver {
    /// Air temperature.
    pub temp: f64,
    /// Incident PAR.
    pub par: f64,
}

impl Driver {
    /// Creates a driver record.
    pub fn new(temp: f64, par: f64) -> Self {
        Self { temp, par }
    }
}

/// A complete forcing series, shared across particles or per-particle.
///
/// The process model wants one driver per particle per timestep; this type
/// performs the alignment, broadcasting a shared series or indexing into a
/// per-particle grid.
#[derive(Debug, Clone)]
pub enum DriverSeries {
    /// One record per timestep, broadcast to every particle.
    Shared(Vec<Driver>),
    /// One record per timestep per particle, stored step-major.
    PerParticle {
        /// Number of particles per step.
        n_particles: usize,
        /// Flattened `[step][particle]` records.
        data: Vec<Driver>,
    },
}

impl DriverSeries {
    /// Builds a broadcast series from per-timestep records.
    pub fn shared(records: Vec<Driver>) -> Self {
        Self::Shared(records)
    }

    /// Builds a per-particle series from one row of records per timestep.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::EmptyEnsemble`] if the first row is empty and
    /// [`ModelError::LengthMismatch`] if the rows are not rectangular.
    pub fn per_particle(rows: Vec<Vec<Driver>>) -> Result<Self, ModelError> {
        let n_particles = rows.first().map(Vec::len).unwrap_or(0);
        if n_particles == 0 {
            return Err(ModelError::EmptyEnsemble);
        }
        let mut data = Vec::with_capacity(rows.len() * n_particles);
        for row in &rows {
            if row.len() != n_particles {
                return Err(ModelError::LengthMismatch {
                    name: "driver row",
                    expected: n_particles,
                    got: row.len(),
                });
            }
            data.extend_from_slice(row);
        }
        Ok(Self::PerParticle { n_particles, data })
    }

    /// Number of timesteps covered by the series.
    pub fn n_steps(&self) -> usize {
        match self {
            Self::Shared(records) => records.len(),
            Self::PerParticle { n_particles, data } => data.len() / n_particles,
        }
    }

    /// Forcing for timestep `t`, aligned for per-particle lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::StepOutOfRange`] if `t` is past the series end.
    pub fn at(&self, t: usize) -> Result<StepDrivers<'_>, ModelError> {
        let n_steps = self.n_steps();
        if t >= n_steps {
            return Err(ModelError::StepOutOfRange { step: t, n_steps });
        }
        Ok(match self {
            Self::Shared(records) => StepDrivers::Broadcast(records[t]),
            Self::PerParticle { n_particles, data } => {
                StepDrivers::PerParticle(&data[t * n_particles..(t + 1) * n_particles])
            }
        })
    }
}

/// One timestep's forcing, resolved per particle.
#[derive(Debug, Clone, Copy)]
pub enum StepDrivers<'a> {
    /// The same record for every particle.
    Broadcast(Driver),
    /// One record per particle.
    PerParticle(&'a [Driver]),
}

impl StepDrivers<'_> {
    /// The driver record for particle `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i` is out of range for a per-particle slice; the step
    /// validates ensemble length up front.
    pub fn get(&self, i: usize) -> Driver {
        match self {
            Self::Broadcast(d) => *d,
            Self::PerParticle(slice) => slice[i],
        }
    }

    /// Checks that this step's forcing covers an ensemble of `n` particles.
    pub(crate) fn check_len(&self, n: usize) -> Result<(), ModelError> {
        if let Self::PerParticle(slice) = self {
            if slice.len() != n {
                return Err(ModelError::LengthMismatch {
                    name: "step drivers",
                    expected: n,
                    got: slice.len(),
                });
            }
        }
        Ok(())
    }
}
