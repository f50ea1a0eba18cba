//! Fixed-schema parameter ensemble, reindexed atomically on resampling.

use crate::error::ModelError;

/// Number of scalar parameter dimensions per particle (nine scalars plus
/// the three allocation fractions). This is the column count of the flat
/// matrix used by the kernel smoother.
pub const PARAM_DIM: usize = 12;

/// Split of gross primary production among respiration, wood growth, and
/// leaf growth. Components are non-negative and sum to 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Allocation {
    /// Fraction respired (autotrophic respiration).
    pub respiration: f64,
    /// Fraction allocated to wood growth.
    pub wood: f64,
    /// Fraction allocated to leaf growth.
    pub leaf: f64,
}

impl Allocation {
    /// Creates an allocation triple (not yet normalized).
    pub fn new(respiration: f64, wood: f64, leaf: f64) -> Self {
        Self {
            respiration,
            wood,
            leaf,
        }
    }

    /// Sum of the three fractions.
    pub fn sum(&self) -> f64 {
        self.respiration + self.wood + self.leaf
    }

    /// Returns true if each component is non-negative and the triple sums
    /// to 1 within `tol`.
    pub fn is_closed(&self, tol: f64) -> bool {
        self.respiration >= 0.0
            && self.wood >= 0.0
            && self.leaf >= 0.0
            && (self.sum() - 1.0).abs() <= tol
    }
}

/// Per-particle parameters viewed as one plain-scalar bundle.
///
/// A cheap `Copy` snapshot of particle `i` across every field of the
/// ensemble, consumed by the process-model step.
#[derive(Debug, Clone, Copy)]
pub struct ParticleParams {
    /// Specific leaf area.
    pub sla: f64,
    /// Light-use efficiency.
    pub lue: f64,
    /// Q10 temperature sensitivity of soil respiration.
    pub q10: f64,
    /// Basal heterotrophic respiration rate.
    pub r_basal: f64,
    /// Fraction of the leaf pool lost to litterfall per timestep.
    pub litter_frac: f64,
    /// Fraction of the wood pool lost to mortality per timestep.
    pub mort_frac: f64,
    /// Process-error standard deviation of the leaf pool.
    pub sigma_leaf: f64,
    /// Process-error standard deviation of the wood pool.
    pub sigma_wood: f64,
    /// Process-error standard deviation of the soil pool.
    pub sigma_soil: f64,
    /// Allocation fractions.
    pub alloc: Allocation,
}

/// Struct-of-arrays parameter ensemble.
///
/// Every field is a `Vec` of length N, index-aligned with the state and
/// weight arrays: index i refers to the same logical particle everywhere.
/// Resampling goes through [`ParamEnsemble::gather`], which reindexes every
/// field in one transaction so the schema cannot drift.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamEnsemble {
    sla: Vec<f64>,
    lue: Vec<f64>,
    q10: Vec<f64>,
    r_basal: Vec<f64>,
    litter_frac: Vec<f64>,
    mort_frac: Vec<f64>,
    sigma_leaf: Vec<f64>,
    sigma_wood: Vec<f64>,
    sigma_soil: Vec<f64>,
    alloc: Vec<Allocation>,
}

impl ParamEnsemble {
    /// Column names of the flat parameter matrix, in
    /// [`ParamEnsemble::to_rows`] order.
    pub const COLUMNS: [&'static str; PARAM_DIM] = [
        "sla",
        "lue",
        "q10",
        "r_basal",
        "litter_frac",
        "mort_frac",
        "sigma_leaf",
        "sigma_wood",
        "sigma_soil",
        "alloc_resp",
        "alloc_wood",
        "alloc_leaf",
    ];

    /// Builds an ensemble from per-field arrays.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::EmptyEnsemble`] for zero-length input and
    /// [`ModelError::LengthMismatch`] if any field disagrees with `sla`'s
    /// length.
    #[allow(clippy::too_many_arguments)]
    pub fn from_fields(
        sla: Vec<f64>,
        lue: Vec<f64>,
        q10: Vec<f64>,
        r_basal: Vec<f64>,
        litter_frac: Vec<f64>,
        mort_frac: Vec<f64>,
        sigma_leaf: Vec<f64>,
        sigma_wood: Vec<f64>,
        sigma_soil: Vec<f64>,
        alloc: Vec<Allocation>,
    ) -> Result<Self, ModelError> {
        let n = sla.len();
        if n == 0 {
            return Err(ModelError::EmptyEnsemble);
        }
        let check = |name: &'static str, got: usize| -> Result<(), ModelError> {
            if got != n {
                return Err(ModelError::LengthMismatch {
                    name,
                    expected: n,
                    got,
                });
            }
            Ok(())
        };
        check("lue", lue.len())?;
        check("q10", q10.len())?;
        check("r_basal", r_basal.len())?;
        check("litter_frac", litter_frac.len())?;
        check("mort_frac", mort_frac.len())?;
        check("sigma_leaf", sigma_leaf.len())?;
        check("sigma_wood", sigma_wood.len())?;
        check("sigma_soil", sigma_soil.len())?;
        check("alloc", alloc.len())?;

        Ok(Self {
            sla,
            lue,
            q10,
            r_basal,
            litter_frac,
            mort_frac,
            sigma_leaf,
            sigma_wood,
            sigma_soil,
            alloc,
        })
    }

    /// Number of particles.
    pub fn len(&self) -> usize {
        self.sla.len()
    }

    /// Returns true if the ensemble holds no particles.
    pub fn is_empty(&self) -> bool {
        self.sla.is_empty()
    }

    /// Snapshot of particle `i`'s parameters.
    ///
    /// # Panics
    ///
    /// Panics if `i >= len()`.
    pub fn particle(&self, i: usize) -> ParticleParams {
        ParticleParams {
            sla: self.sla[i],
            lue: self.lue[i],
            q10: self.q10[i],
            r_basal: self.r_basal[i],
            litter_frac: self.litter_frac[i],
            mort_frac: self.mort_frac[i],
            sigma_leaf: self.sigma_leaf[i],
            sigma_wood: self.sigma_wood[i],
            sigma_soil: self.sigma_soil[i],
            alloc: self.alloc[i],
        }
    }

    /// Reindexes every field by `indices` in one transaction.
    ///
    /// Duplicate indices produce independent value copies, so later
    /// perturbation of one resampled particle cannot leak into another that
    /// shares the same source index.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::LengthMismatch`] if `indices` is not N long,
    /// or [`ModelError::ParticleOutOfRange`] for an out-of-bounds index.
    pub fn gather(&self, indices: &[usize]) -> Result<Self, ModelError> {
        let n = self.len();
        if indices.len() != n {
            return Err(ModelError::LengthMismatch {
                name: "indices",
                expected: n,
                got: indices.len(),
            });
        }
        if let Some(&bad) = indices.iter().find(|&&i| i >= n) {
            return Err(ModelError::ParticleOutOfRange { index: bad, len: n });
        }

        let pick = |src: &[f64]| indices.iter().map(|&i| src[i]).collect();
        Ok(Self {
            sla: pick(&self.sla),
            lue: pick(&self.lue),
            q10: pick(&self.q10),
            r_basal: pick(&self.r_basal),
            litter_frac: pick(&self.litter_frac),
            mort_frac: pick(&self.mort_frac),
            sigma_leaf: pick(&self.sigma_leaf),
            sigma_wood: pick(&self.sigma_wood),
            sigma_soil: pick(&self.sigma_soil),
            alloc: indices.iter().map(|&i| self.alloc[i]).collect(),
        })
    }

    /// Flattens the ensemble into one row of [`PARAM_DIM`] values per
    /// particle, in [`ParamEnsemble::COLUMNS`] order. Used by the kernel
    /// smoother, which needs a plain matrix.
    pub fn to_rows(&self) -> Vec<[f64; PARAM_DIM]> {
        (0..self.len())
            .map(|i| {
                [
                    self.sla[i],
                    self.lue[i],
                    self.q10[i],
                    self.r_basal[i],
                    self.litter_frac[i],
                    self.mort_frac[i],
                    self.sigma_leaf[i],
                    self.sigma_wood[i],
                    self.sigma_soil[i],
                    self.alloc[i].respiration,
                    self.alloc[i].wood,
                    self.alloc[i].leaf,
                ]
            })
            .collect()
    }

    /// Rebuilds an ensemble from flat rows produced by
    /// [`ParamEnsemble::to_rows`].
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::EmptyEnsemble`] for empty input.
    pub fn from_rows(rows: &[[f64; PARAM_DIM]]) -> Result<Self, ModelError> {
        if rows.is_empty() {
            return Err(ModelError::EmptyEnsemble);
        }
        let col = |c: usize| rows.iter().map(|r| r[c]).collect::<Vec<f64>>();
        Ok(Self {
            sla: col(0),
            lue: col(1),
            q10: col(2),
            r_basal: col(3),
            litter_frac: col(4),
            mort_frac: col(5),
            sigma_leaf: col(6),
            sigma_wood: col(7),
            sigma_soil: col(8),
            alloc: rows
                .iter()
                .map(|r| Allocation::new(r[9], r[10], r[11]))
                .collect(),
        })
    }

    /// Enforces domain constraints after a stochastic parameter update:
    /// truncates every negative value to zero, then renormalizes each
    /// allocation triple to sum to exactly 1.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::DegenerateAllocation`] if a triple sums to
    /// zero after truncation. The prior generator guarantees strictly
    /// positive draws, so this only fires on contract violations.
    pub fn constrain(&mut self) -> Result<(), ModelError> {
        for field in [
            &mut self.sla,
            &mut self.lue,
            &mut self.q10,
            &mut self.r_basal,
            &mut self.litter_frac,
            &mut self.mort_frac,
            &mut self.sigma_leaf,
            &mut self.sigma_wood,
            &mut self.sigma_soil,
        ] {
            for v in field.iter_mut() {
                if *v < 0.0 {
                    *v = 0.0;
                }
            }
        }

        for (i, a) in self.alloc.iter_mut().enumerate() {
            a.respiration = a.respiration.max(0.0);
            a.wood = a.wood.max(0.0);
            a.leaf = a.leaf.max(0.0);
            let sum = a.sum();
            if sum <= 0.0 {
                return Err(ModelError::DegenerateAllocation { particle: i });
            }
            a.respiration /= sum;
            a.wood /= sum;
            a.leaf /= sum;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn small_ensemble() -> ParamEnsemble {
        ParamEnsemble::from_fields(
            vec![4.0, 5.0, 6.0],
            vec![0.02, 0.03, 0.04],
            vec![2.0, 2.1, 2.2],
            vec![0.2, 0.25, 0.3],
            vec![0.001, 0.002, 0.003],
            vec![0.0001, 0.0002, 0.0003],
            vec![0.1, 0.2, 0.3],
            vec![0.4, 0.5, 0.6],
            vec![0.7, 0.8, 0.9],
            vec![
                Allocation::new(0.5, 0.3, 0.2),
                Allocation::new(0.4, 0.4, 0.2),
                Allocation::new(0.6, 0.2, 0.2),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_empty_rejected() {
        let err = ParamEnsemble::from_fields(
            vec![],
            vec![],
            vec![],
            vec![],
            vec![],
            vec![],
            vec![],
            vec![],
            vec![],
            vec![],
        )
        .unwrap_err();
        assert!(matches!(err, ModelError::EmptyEnsemble));
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let err = ParamEnsemble::from_fields(
            vec![1.0, 2.0],
            vec![1.0],
            vec![1.0, 2.0],
            vec![1.0, 2.0],
            vec![1.0, 2.0],
            vec![1.0, 2.0],
            vec![1.0, 2.0],
            vec![1.0, 2.0],
            vec![1.0, 2.0],
            vec![Allocation::new(1.0, 0.0, 0.0); 2],
        )
        .unwrap_err();
        assert!(matches!(err, ModelError::LengthMismatch { name: "lue", .. }));
    }

    #[test]
    fn test_gather_reindexes_every_field() {
        let params = small_ensemble();
        let gathered = params.gather(&[2, 0, 2]).unwrap();

        // Particle 0 of the result is source particle 2 across all fields.
        let p = gathered.particle(0);
        assert_eq!(p.sla, 6.0);
        assert_eq!(p.lue, 0.04);
        assert_eq!(p.sigma_soil, 0.9);
        assert_eq!(p.alloc, Allocation::new(0.6, 0.2, 0.2));

        // Duplicated source index 2 appears at positions 0 and 2.
        assert_eq!(gathered.particle(2).sla, 6.0);
        assert_eq!(gathered.particle(1).sla, 4.0);
    }

    #[test]
    fn test_gather_duplicates_are_value_copies() {
        let params = small_ensemble();
        let mut gathered = params.gather(&[1, 1, 1]).unwrap();
        // Mutating one copy must not affect the others.
        gathered.sla[0] = 99.0;
        assert_eq!(gathered.sla[1], 5.0);
        assert_eq!(gathered.sla[2], 5.0);
    }

    #[test]
    fn test_gather_bad_index() {
        let params = small_ensemble();
        let err = params.gather(&[0, 3, 1]).unwrap_err();
        assert!(matches!(
            err,
            ModelError::ParticleOutOfRange { index: 3, len: 3 }
        ));
    }

    #[test]
    fn test_gather_wrong_length() {
        let params = small_ensemble();
        assert!(params.gather(&[0, 1]).is_err());
    }

    #[test]
    fn test_rows_round_trip() {
        let params = small_ensemble();
        let rows = params.to_rows();
        assert_eq!(rows.len(), 3);
        let back = ParamEnsemble::from_rows(&rows).unwrap();
        assert_eq!(back, params);
    }

    #[test]
    fn test_constrain_truncates_and_renormalizes() {
        let mut params = small_ensemble();
        params.sla[1] = -2.0;
        params.alloc[0] = Allocation::new(-0.2, 0.6, 0.6);

        params.constrain().unwrap();

        assert_eq!(params.sla[1], 0.0);
        let a = params.alloc[0];
        assert_eq!(a.respiration, 0.0);
        assert_abs_diff_eq!(a.sum(), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(a.wood, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_constrain_degenerate_allocation() {
        let mut params = small_ensemble();
        params.alloc[2] = Allocation::new(-1.0, -1.0, 0.0);
        let err = params.constrain().unwrap_err();
        assert!(matches!(
            err,
            ModelError::DegenerateAllocation { particle: 2 }
        ));
    }

    #[test]
    fn test_allocation_closure_check() {
        assert!(Allocation::new(0.5, 0.3, 0.2).is_closed(1e-12));
        assert!(!Allocation::new(0.5, 0.3, 0.3).is_closed(1e-12));
        assert!(!Allocation::new(-0.1, 0.6, 0.5).is_closed(1e-12));
    }
}
