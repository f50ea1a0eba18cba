//! The dense forecast output tensor.

use demeter_model::{CarbonPools, NUM_VARS, OutputVar};

use crate::error::ForecastError;

/// Fully materialized `[step][particle][variable]` tensor.
///
/// Written once per forecast step; downstream analysis needs random access
/// across time windows, so this is a dense array rather than a stream.
#[derive(Debug, Clone)]
pub struct ForecastOutput {
    data: Vec<f64>,
    n_steps: usize,
    n_particles: usize,
}

impl ForecastOutput {
    /// Allocates a zero-filled tensor.
    pub fn zeros(n_steps: usize, n_particles: usize) -> Self {
        Self {
            data: vec![0.0; n_steps * n_particles * NUM_VARS],
            n_steps,
            n_particles,
        }
    }

    /// Number of timesteps.
    pub fn n_steps(&self) -> usize {
        self.n_steps
    }

    /// Number of particles.
    pub fn n_particles(&self) -> usize {
        self.n_particles
    }

    /// The flat backing data, step-major then particle-major.
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// One particle's output row at a step.
    ///
    /// # Panics
    ///
    /// Panics if `step` or `particle` is out of range.
    pub fn row(&self, step: usize, particle: usize) -> &[f64] {
        let base = (step * self.n_particles + particle) * NUM_VARS;
        &self.data[base..base + NUM_VARS]
    }

    /// A single value.
    ///
    /// # Panics
    ///
    /// Panics if `step` or `particle` is out of range.
    pub fn value(&self, step: usize, particle: usize, var: OutputVar) -> f64 {
        self.row(step, particle)[var.index()]
    }

    /// One variable across all particles at a step.
    ///
    /// # Errors
    ///
    /// Returns [`ForecastError::StepOutOfRange`] if `step` is out of range.
    pub fn var_at(&self, step: usize, var: OutputVar) -> Result<Vec<f64>, ForecastError> {
        if step >= self.n_steps {
            return Err(ForecastError::StepOutOfRange {
                step,
                n_steps: self.n_steps,
            });
        }
        Ok((0..self.n_particles)
            .map(|i| self.row(step, i)[var.index()])
            .collect())
    }

    /// The carbon-pool slice at a step, for threading into the next
    /// forecast segment.
    ///
    /// # Errors
    ///
    /// Returns [`ForecastError::StepOutOfRange`] if `step` is out of range.
    pub fn state_at(&self, step: usize) -> Result<Vec<CarbonPools>, ForecastError> {
        if step >= self.n_steps {
            return Err(ForecastError::StepOutOfRange {
                step,
                n_steps: self.n_steps,
            });
        }
        Ok((0..self.n_particles)
            .map(|i| {
                let row = self.row(step, i);
                CarbonPools::new(
                    row[OutputVar::LeafCarbon.index()],
                    row[OutputVar::WoodCarbon.index()],
                    row[OutputVar::SoilCarbon.index()],
                )
            })
            .collect())
    }

    /// Mutable flat slice for the segment `[start, end)`, used by the
    /// forecast engine to fill steps in place.
    pub(crate) fn segment_mut(&mut self, start: usize, end: usize) -> &mut [f64] {
        let row = self.n_particles * NUM_VARS;
        &mut self.data[start * row..end * row]
    }

    /// Replaces every NaN or infinite value in `[start, end)` with zero,
    /// returning how many values were coerced.
    ///
    /// Degenerate parameter draws (for example a zero-variance prior
    /// tail) can poison individual particles; the clamp keeps the run
    /// alive at a documented accuracy cost.
    pub(crate) fn sanitize_segment(&mut self, start: usize, end: usize) -> usize {
        let mut clamped = 0;
        for v in self.segment_mut(start, end) {
            if !v.is_finite() {
                *v = 0.0;
                clamped += 1;
            }
        }
        clamped
    }
}
