//! Stack-allocated small linear algebra for the kernel smoother.
//!
//! The parameter space has a fixed, small dimension, so these types avoid
//! heap allocation in the per-resample covariance and noise-draw work.

/// Stack-allocated vector of dimension `D`.
#[derive(Clone, Copy)]
pub(crate) struct SmallVec<const D: usize> {
    pub(crate) data: [f64; D],
}

/// Stack-allocated D x D matrix stored in column-major order.
///
/// `cols[c][r]` = element at row r, column c.
#[derive(Clone, Copy)]
pub(crate) struct SmallMat<const D: usize> {
    pub(crate) cols: [[f64; D]; D],
}

impl<const D: usize> SmallVec<D> {
    /// Returns a zero-initialized vector.
    #[inline(always)]
    pub(crate) fn zeros() -> Self {
        Self { data: [0.0; D] }
    }
}

impl<const D: usize> SmallMat<D> {
    /// Returns a zero-initialized matrix.
    #[inline(always)]
    pub(crate) fn zeros() -> Self {
        Self {
            cols: [[0.0; D]; D],
        }
    }

    /// Returns the element at `(row, col)`.
    #[inline(always)]
    pub(crate) fn get(&self, row: usize, col: usize) -> f64 {
        self.cols[col][row]
    }

    /// Sets the element at `(row, col)` to `val`.
    #[inline(always)]
    pub(crate) fn set(&mut self, row: usize, col: usize, val: f64) {
        self.cols[col][row] = val;
    }

    /// Computes the matrix-vector product `self * v`.
    #[inline(always)]
    pub(crate) fn mul_vec(&self, v: &SmallVec<D>) -> SmallVec<D> {
        let mut result = SmallVec::zeros();
        for i in 0..D {
            let mut sum = 0.0;
            for k in 0..D {
                sum += self.get(i, k) * v.data[k];
            }
            result.data[i] = sum;
        }
        result
    }

    /// Adds `jitter` to every diagonal element.
    pub(crate) fn add_diagonal(&mut self, jitter: f64) {
        for i in 0..D {
            self.cols[i][i] += jitter;
        }
    }

    /// Largest diagonal element.
    pub(crate) fn max_diagonal(&self) -> f64 {
        (0..D).fold(f64::NEG_INFINITY, |m, i| m.max(self.cols[i][i]))
    }

    /// Cholesky factorization: returns lower-triangular L with
    /// `L * L^T = self`, or `None` if the matrix is not positive definite.
    pub(crate) fn cholesky(&self) -> Option<SmallMat<D>> {
        let mut l = SmallMat::zeros();
        for j in 0..D {
            let mut diag = self.get(j, j);
            for k in 0..j {
                diag -= l.get(j, k) * l.get(j, k);
            }
            if !(diag > 0.0) || !diag.is_finite() {
                return None;
            }
            let diag_sqrt = diag.sqrt();
            l.set(j, j, diag_sqrt);
            for i in (j + 1)..D {
                let mut sum = self.get(i, j);
                for k in 0..j {
                    sum -= l.get(i, k) * l.get(j, k);
                }
                l.set(i, j, sum / diag_sqrt);
            }
        }
        Some(l)
    }
}

/// Column means of a row-major sample matrix.
pub(crate) fn column_means<const D: usize>(rows: &[[f64; D]]) -> SmallVec<D> {
    let mut means = SmallVec::zeros();
    if rows.is_empty() {
        return means;
    }
    for row in rows {
        for (m, &v) in means.data.iter_mut().zip(row.iter()) {
            *m += v;
        }
    }
    let n = rows.len() as f64;
    for m in means.data.iter_mut() {
        *m /= n;
    }
    means
}

/// Empirical covariance with N-1 denominator (matching R's `cov()`).
/// Returns the zero matrix for fewer than 2 rows.
pub(crate) fn covariance<const D: usize>(
    rows: &[[f64; D]],
    means: &SmallVec<D>,
) -> SmallMat<D> {
    let mut cov = SmallMat::zeros();
    let n = rows.len();
    if n < 2 {
        return cov;
    }
    let denom = (n - 1) as f64;
    for row in rows {
        for a in 0..D {
            let da = row[a] - means.data[a];
            for b in a..D {
                let db = row[b] - means.data[b];
                cov.cols[b][a] += da * db / denom;
            }
        }
    }
    // Mirror the upper triangle.
    for a in 0..D {
        for b in (a + 1)..D {
            let v = cov.get(a, b);
            cov.set(b, a, v);
        }
    }
    cov
}
