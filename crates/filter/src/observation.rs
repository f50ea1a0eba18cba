//! Observations and their alignment to forecast timesteps.

use crate::error::FilterError;

/// One remote-sensing measurement: value plus uncertainty.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    /// Observed value (same units as the observed output variable).
    pub value: f64,
    /// Observation standard deviation.
    pub sd: f64,
}

impl Observation {
    /// Creates an observation record.
    pub fn new(value: f64, sd: f64) -> Self {
        Self { value, sd }
    }
}

/// A sequence of observation slots at a fixed cadence of forecast steps.
///
/// Slot j covers forecast step `(j+1)*cadence - 1`: with a 30-minute model
/// step and an 8-day observation product, `cadence = 384` puts one slot at
/// the end of each 8-day window. A `None` slot is a missing observation
/// ("skip analysis"), not an error.
#[derive(Debug, Clone)]
pub struct ObservationSeries {
    slots: Vec<Option<Observation>>,
    cadence: usize,
}

impl ObservationSeries {
    /// Builds a series from slots and a cadence in forecast steps.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::InvalidConfig`] if `cadence` is zero.
    pub fn new(slots: Vec<Option<Observation>>, cadence: usize) -> Result<Self, FilterError> {
        if cadence == 0 {
            return Err(FilterError::InvalidConfig {
                reason: "observation cadence must be at least 1 step".to_string(),
            });
        }
        Ok(Self { slots, cadence })
    }

    /// Number of observation slots (including missing ones).
    pub fn n_slots(&self) -> usize {
        self.slots.len()
    }

    /// The cadence in forecast steps.
    pub fn cadence(&self) -> usize {
        self.cadence
    }

    /// The slot contents, missing or not.
    ///
    /// # Panics
    ///
    /// Panics if `slot >= n_slots()`.
    pub fn slot(&self, slot: usize) -> Option<Observation> {
        self.slots[slot]
    }

    /// Maps a forecast step to its observation slot, if the step is
    /// analysis-eligible and the slot exists.
    pub fn slot_for_step(&self, step: usize) -> Option<usize> {
        if (step + 1) % self.cadence != 0 {
            return None;
        }
        let slot = (step + 1) / self.cadence - 1;
        (slot < self.slots.len()).then_some(slot)
    }

    /// The forecast step covered by a slot.
    pub fn step_for_slot(&self, slot: usize) -> usize {
        (slot + 1) * self.cadence - 1
    }

    /// The observation at a forecast step: `None` when the step is not
    /// analysis-eligible or the slot is missing.
    pub fn at_step(&self, step: usize) -> Option<Observation> {
        self.slot_for_step(step).and_then(|s| self.slots[s])
    }

    /// Number of slots needed to cover a horizon of `n_steps`.
    pub fn slots_for_horizon(&self, n_steps: usize) -> usize {
        n_steps / self.cadence
    }
}
