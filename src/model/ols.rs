// Least-squares solve for small treatment-coded designs
//
// The normal equations are formed directly and factored with a Cholesky
// decomposition. (X'X)^-1 is kept because every downstream quantity
// (standard errors, marginal means, leverage) needs it.

use crate::error::{AnalysisError, Result};
use nalgebra::{Cholesky, DMatrix, DVector};

/// Squared Cholesky pivot, relative to the matching diagonal of X'X, below
/// which a column is treated as collinear with the ones before it
const PIVOT_TOLERANCE: f64 = 1e-10;

/// Result of solving the normal equations
#[derive(Debug, Clone)]
pub struct LeastSquares {
    pub coefficients: DVector<f64>,
    pub xtx_inv: DMatrix<f64>,
    pub fitted: DVector<f64>,
    pub residuals: DVector<f64>,
    pub rss: f64,
}

fn singular() -> AnalysisError {
    AnalysisError::degenerate("design matrix is singular (collinear or empty factor levels)")
}

/// Ordinary least squares of `y` on the columns of `x`
pub fn solve(x: &DMatrix<f64>, y: &DVector<f64>) -> Result<LeastSquares> {
    if x.nrows() != y.len() {
        return Err(AnalysisError::invalid(
            "response",
            format!("{} responses for {} design rows", y.len(), x.nrows()),
        ));
    }

    let xtx = x.tr_mul(x);
    let chol = Cholesky::new(xtx.clone()).ok_or_else(singular)?;

    // Rounding can let an exactly collinear design through with a tiny pivot
    let l = chol.l();
    if (0..xtx.ncols()).any(|j| l[(j, j)].powi(2) <= PIVOT_TOLERANCE * xtx[(j, j)]) {
        return Err(singular());
    }

    let coefficients = chol.solve(&x.tr_mul(y));
    let xtx_inv = chol.inverse();
    let fitted = x * &coefficients;
    let residuals = y - &fitted;
    let rss = residuals.norm_squared();

    Ok(LeastSquares {
        coefficients,
        xtx_inv,
        fitted,
        residuals,
        rss,
    })
}

/// `v' m v` for a square matrix
pub fn quadratic_form(m: &DMatrix<f64>, v: &[f64]) -> f64 {
    let v = DVector::from_column_slice(v);
    v.dot(&(m * &v))
}
