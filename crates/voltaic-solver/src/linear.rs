//! Dense linear solve: Gaussian elimination with partial pivoting.

use nalgebra::{DMatrix, DVector};

use crate::error::{Error, Result};

/// Pivot tolerance relative to the largest |entry| of the matrix.
const PIVOT_RTOL: f64 = 1e-12;

/// Solve `Ax = b` by Gaussian elimination with partial pivoting on
/// absolute value. A zero or non-finite pivot means the system is
/// singular or inconsistent.
pub fn solve_dense(a: &DMatrix<f64>, b: &DVector<f64>) -> Result<DVector<f64>> {
    let n = a.nrows();
    if a.ncols() != n {
        return Err(Error::DimensionMismatch {
            expected: n,
            actual: a.ncols(),
        });
    }
    if b.len() != n {
        return Err(Error::DimensionMismatch {
            expected: n,
            actual: b.len(),
        });
    }

    let mut m = a.clone();
    let mut x = b.clone();

    let scale = m.iter().fold(0.0_f64, |acc, &v| acc.max(v.abs()));
    let tol = scale * PIVOT_RTOL;

    for k in 0..n {
        let mut pivot_row = k;
        let mut pivot = m[(k, k)].abs();
        for r in (k + 1)..n {
            let v = m[(r, k)].abs();
            if v > pivot {
                pivot = v;
                pivot_row = r;
            }
        }
        if !pivot.is_finite() || pivot <= tol {
            return Err(Error::Singular);
        }
        if pivot_row != k {
            m.swap_rows(k, pivot_row);
            x.swap_rows(k, pivot_row);
        }

        let diag = m[(k, k)];
        for r in (k + 1)..n {
            let factor = m[(r, k)] / diag;
            if factor == 0.0 {
                continue;
            }
            for c in k..n {
                m[(r, c)] -= factor * m[(k, c)];
            }
            x[r] -= factor * x[k];
        }
    }

    for k in (0..n).rev() {
        let mut acc = x[k];
        for c in (k + 1)..n {
            acc -= m[(k, c)] * x[c];
        }
        x[k] = acc / m[(k, k)];
    }

    Ok(x)
}
