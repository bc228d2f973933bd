// Coefficient tables, Wald intervals and overall fit statistics

use super::LinearModel;
use crate::error::{AnalysisError, Result};
use crate::interval::ConfidenceInterval;
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, FisherSnedecor, StudentsT};
use statrs::statistics::Statistics;

/// One row of the coefficient table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoefficientRow {
    pub term: String,
    pub estimate: f64,
    pub std_error: f64,
    pub t_statistic: f64,
    /// Two-sided p-value at the residual degrees of freedom
    pub p_value: f64,
}

/// Confidence interval for one named coefficient
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TermInterval {
    pub term: String,
    pub interval: ConfidenceInterval,
}

/// Overall goodness of fit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FitSummary {
    pub n_obs: usize,
    pub df_model: usize,
    pub df_residual: usize,
    /// Residual standard error
    pub sigma: f64,
    pub r_squared: f64,
    pub adj_r_squared: f64,
    /// Overall F test; absent for the intercept-only model
    pub f_statistic: Option<f64>,
    pub f_p_value: Option<f64>,
}

fn students_t(df: usize) -> Result<StudentsT> {
    StudentsT::new(0.0, 1.0, df as f64).map_err(|e| AnalysisError::invalid("df", e.to_string()))
}

impl LinearModel {
    /// Estimate, standard error, t statistic and p-value for every term
    pub fn coefficient_table(&self) -> Result<Vec<CoefficientRow>> {
        let t_dist = students_t(self.df_residual())?;
        let std_errors = self.std_errors();

        Ok(self
            .terms()
            .iter()
            .zip(self.coefficients())
            .zip(std_errors)
            .map(|((term, &estimate), std_error)| {
                let t_statistic = estimate / std_error;
                CoefficientRow {
                    term: term.clone(),
                    estimate,
                    std_error,
                    t_statistic,
                    p_value: 2.0 * t_dist.sf(t_statistic.abs()),
                }
            })
            .collect())
    }

    /// R², adjusted R², residual standard error and the overall F test
    pub fn fit_summary(&self) -> Result<FitSummary> {
        let n = self.n_obs();
        let df_model = self.n_params() - 1;
        let df_residual = self.df_residual();

        let mean = self.response().iter().mean();
        let tss: f64 = self.response().iter().map(|y| (y - mean).powi(2)).sum();
        let rss = self.rss();

        let r_squared = if df_model == 0 { 0.0 } else { 1.0 - rss / tss };
        let adj_r_squared =
            1.0 - (1.0 - r_squared) * (n as f64 - 1.0) / df_residual as f64;

        let (f_statistic, f_p_value) = if df_model == 0 {
            (None, None)
        } else {
            let f = ((tss - rss) / df_model as f64) / self.sigma2();
            let dist = FisherSnedecor::new(df_model as f64, df_residual as f64)
                .map_err(|e| AnalysisError::invalid("df", e.to_string()))?;
            (Some(f), Some(dist.sf(f)))
        };

        Ok(FitSummary {
            n_obs: n,
            df_model,
            df_residual,
            sigma: self.sigma(),
            r_squared,
            adj_r_squared,
            f_statistic,
            f_p_value,
        })
    }
}

/// Wald intervals for every coefficient at confidence `level`
///
/// The critical value is the Student-t quantile at the model's residual
/// degrees of freedom.
pub fn confidence_intervals(model: &LinearModel, level: f64) -> Result<Vec<TermInterval>> {
    let df = model.df_residual() as f64;
    model
        .terms()
        .iter()
        .zip(model.coefficients())
        .zip(model.std_errors())
        .map(|((term, &estimate), se)| {
            Ok(TermInterval {
                term: term.clone(),
                interval: ConfidenceInterval::t_interval(estimate, se, level, df)?,
            })
        })
        .collect()
}
