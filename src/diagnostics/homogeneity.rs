// Residual spread checks: Koenker's studentised Breusch-Pagan test
//
// Squared residuals are regressed on the fitted values; with a single
// regressor the auxiliary R² is the squared correlation, and `n R²` is
// asymptotically chi-square with 1 degree of freedom.

use crate::diagnostics::influence::ModelDiagnostics;
use crate::error::{AnalysisError, Result};
use serde::Serialize;
use statrs::distribution::{ChiSquared, ContinuousCDF};
use statrs::statistics::Statistics;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BreuschPagan {
    pub statistic: f64,
    pub df: f64,
    pub p_value: f64,
    /// corr(fitted, sqrt|studentised residual|), the scale-location trend
    pub spread_correlation: f64,
}

/// Pearson correlation, 0 when either side has no variance
fn correlation(a: &[f64], b: &[f64]) -> f64 {
    if a.len() < 2 {
        return 0.0;
    }
    let var_a = a.iter().variance();
    let var_b = b.iter().variance();
    if !(var_a > f64::EPSILON && var_b > f64::EPSILON) {
        return 0.0;
    }
    (a.iter().covariance(b.iter()) / (var_a * var_b).sqrt()).clamp(-1.0, 1.0)
}

pub fn breusch_pagan(diagnostics: &ModelDiagnostics) -> Result<BreuschPagan> {
    let n = diagnostics.len();
    if n < 3 {
        return Err(AnalysisError::invalid(
            "residuals",
            format!("spread test needs at least 3 residuals, got {}", n),
        ));
    }

    let squared: Vec<f64> = diagnostics.residuals.iter().map(|e| e * e).collect();
    let r = correlation(&squared, &diagnostics.fitted);
    let statistic = n as f64 * r * r;

    let chi = ChiSquared::new(1.0).map_err(|e| AnalysisError::invalid("df", e.to_string()))?;
    let p_value = if statistic > 0.0 { chi.sf(statistic) } else { 1.0 };

    let (fitted, root_abs): (Vec<f64>, Vec<f64>) = diagnostics
        .fitted
        .iter()
        .zip(&diagnostics.studentized)
        .filter(|(_, r)| r.is_finite())
        .map(|(&f, r)| (f, r.abs().sqrt()))
        .unzip();

    Ok(BreuschPagan {
        statistic,
        df: 1.0,
        p_value,
        spread_correlation: correlation(&fitted, &root_abs),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diagnostics(residuals: Vec<f64>, fitted: Vec<f64>) -> ModelDiagnostics {
        let n = residuals.len();
        ModelDiagnostics {
            studentized: residuals.clone(),
            residuals,
            fitted,
            leverage: vec![0.1; n],
            cooks_distance: vec![0.0; n],
        }
    }

    #[test]
    fn test_constant_fitted_values_pass() {
        let d = diagnostics(vec![-1.0, 2.0, -3.0, 2.0], vec![5.0; 4]);
        let bp = breusch_pagan(&d).unwrap();
        assert_eq!(bp.statistic, 0.0);
        assert_eq!(bp.p_value, 1.0);
        assert_eq!(bp.spread_correlation, 0.0);
    }

    #[test]
    fn test_fanning_residuals_flagged() {
        let fitted: Vec<f64> = (1..=40).map(f64::from).collect();
        let residuals: Vec<f64> = fitted
            .iter()
            .enumerate()
            .map(|(i, f)| if i % 2 == 0 { *f } else { -*f })
            .collect();
        let bp = breusch_pagan(&diagnostics(residuals, fitted)).unwrap();
        assert!(bp.statistic > 10.0);
        assert!(bp.p_value < 0.01);
        assert!(bp.spread_correlation > 0.9);
    }

    #[test]
    fn test_too_few_residuals() {
        assert!(breusch_pagan(&diagnostics(vec![1.0, -1.0], vec![0.0, 1.0])).is_err());
    }
}
