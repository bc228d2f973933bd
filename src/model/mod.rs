// Ordinary least squares models of plant height
//
// Three model shapes are supported, each as an explicit function taking an
// immutable table and an explicit reference level:
// - intercept only:          height ~ 1
// - single factor:           height ~ type
// - factor plus block:       height ~ type + pair   (paired design)
//
// A fitted `LinearModel` is read-only. Changing the reference level means
// releveling the table and fitting a new model.

mod design;
mod inference;
mod ols;

pub use design::{FactorEncoding, INTERCEPT};
pub use inference::{confidence_intervals, CoefficientRow, FitSummary, TermInterval};
pub use nalgebra::{DMatrix, DVector};
pub use ols::quadratic_form;

use crate::data::{Column, ObservationTable};
use crate::error::{AnalysisError, Result};
use serde::Serialize;
use tracing::{debug, info};

/// Which model shape was fitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    InterceptOnly,
    Factor,
    BlockedFactor,
}

/// A fitted OLS model
#[derive(Debug, Clone)]
pub struct LinearModel {
    kind: ModelKind,
    factors: Vec<FactorEncoding>,
    terms: Vec<String>,
    design: DMatrix<f64>,
    response: DVector<f64>,
    coefficients: DVector<f64>,
    xtx_inv: DMatrix<f64>,
    fitted: DVector<f64>,
    residuals: DVector<f64>,
    rss: f64,
    df_residual: usize,
}

impl LinearModel {
    fn fit(table: &ObservationTable, kind: ModelKind, factors: Vec<FactorEncoding>) -> Result<Self> {
        let (design, terms) = design::build_design(table, &factors);
        let n = design.nrows();
        let p = terms.len();

        if n <= p {
            return Err(AnalysisError::degenerate(format!(
                "{} observations for {} parameters leaves no residual degrees of freedom",
                n, p
            )));
        }

        let response = DVector::from_vec(table.heights());
        let ls = ols::solve(&design, &response)?;
        debug!("Fitted {:?} model: terms={:?}, rss={:.4}", kind, terms, ls.rss);

        Ok(Self {
            kind,
            factors,
            terms,
            design,
            response,
            coefficients: ls.coefficients,
            xtx_inv: ls.xtx_inv,
            fitted: ls.fitted,
            residuals: ls.residuals,
            rss: ls.rss,
            df_residual: n - p,
        })
    }

    pub fn kind(&self) -> ModelKind {
        self.kind
    }

    /// Factors in model order; empty for the intercept-only model
    pub fn factors(&self) -> &[FactorEncoding] {
        &self.factors
    }

    pub fn factor(&self, column: Column) -> Option<&FactorEncoding> {
        self.factors.iter().find(|f| f.column == column)
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn coefficients(&self) -> &[f64] {
        self.coefficients.as_slice()
    }

    pub fn coefficient(&self, term: &str) -> Option<f64> {
        self.term_index(term).map(|i| self.coefficients[i])
    }

    pub fn term_index(&self, term: &str) -> Option<usize> {
        self.terms.iter().position(|t| t == term)
    }

    pub fn design(&self) -> &DMatrix<f64> {
        &self.design
    }

    pub fn response(&self) -> &[f64] {
        self.response.as_slice()
    }

    pub fn fitted(&self) -> &[f64] {
        self.fitted.as_slice()
    }

    pub fn residuals(&self) -> &[f64] {
        self.residuals.as_slice()
    }

    /// `(X'X)^-1`
    pub fn xtx_inverse(&self) -> &DMatrix<f64> {
        &self.xtx_inv
    }

    pub fn rss(&self) -> f64 {
        self.rss
    }

    pub fn n_obs(&self) -> usize {
        self.design.nrows()
    }

    pub fn n_params(&self) -> usize {
        self.design.ncols()
    }

    pub fn df_residual(&self) -> usize {
        self.df_residual
    }

    /// Residual variance `RSS / df_residual`
    pub fn sigma2(&self) -> f64 {
        self.rss / self.df_residual as f64
    }

    /// Residual standard error
    pub fn sigma(&self) -> f64 {
        self.sigma2().sqrt()
    }

    /// Coefficient covariance `sigma² (X'X)^-1`
    pub fn covariance(&self) -> DMatrix<f64> {
        self.xtx_inv.scale(self.sigma2())
    }

    pub fn std_errors(&self) -> Vec<f64> {
        self.covariance().diagonal().iter().map(|v| v.sqrt()).collect()
    }

    /// Model prediction for a design row
    pub fn predict_row(&self, x: &[f64]) -> f64 {
        DVector::from_column_slice(x).dot(&self.coefficients)
    }

    /// R-style formula, e.g. `height ~ type + pair`
    pub fn formula(&self) -> String {
        if self.factors.is_empty() {
            return "height ~ 1".to_string();
        }
        let rhs: Vec<&str> = self.factors.iter().map(|f| f.column.name()).collect();
        format!("height ~ {}", rhs.join(" + "))
    }
}

/// Fit `height ~ 1`; the single coefficient is the grand mean
pub fn fit_intercept_only(table: &ObservationTable) -> Result<LinearModel> {
    let model = LinearModel::fit(table, ModelKind::InterceptOnly, Vec::new())?;
    info!(
        "Intercept-only model: mean={:.4}, se={:.4}",
        model.coefficients[0],
        model.std_errors()[0]
    );
    Ok(model)
}

/// Fit `height ~ factor` with treatment coding against `reference_level`
///
/// For the two-level `type` factor the slope is the difference of group means
/// and its standard error is the pooled equal-variance standard error.
pub fn fit_with_factor(
    table: &ObservationTable,
    factor_column: Column,
    reference_level: &str,
) -> Result<LinearModel> {
    let factor = FactorEncoding::new(table, factor_column, reference_level)?;
    let model = LinearModel::fit(table, ModelKind::Factor, vec![factor])?;
    info!(
        "Factor model height ~ {} (reference {}): {} terms, df={}",
        factor_column,
        reference_level,
        model.terms.len(),
        model.df_residual
    );
    Ok(model)
}

/// Fit `height ~ factor + block`, the additive model for a blocked design
///
/// The block reference is the block column's current reference level.
pub fn fit_with_blocked_factor(
    table: &ObservationTable,
    factor_column: Column,
    reference_level: &str,
    block_column: Column,
) -> Result<LinearModel> {
    if block_column == factor_column {
        return Err(AnalysisError::invalid(
            "block_column",
            "block and factor must be different columns",
        ));
    }
    let factor = FactorEncoding::new(table, factor_column, reference_level)?;
    let block = FactorEncoding::new(table, block_column, table.reference_level(block_column)?)?;
    let model = LinearModel::fit(table, ModelKind::BlockedFactor, vec![factor, block])?;
    info!(
        "Blocked model height ~ {} + {}: {} terms, df={}",
        factor_column,
        block_column,
        model.terms.len(),
        model.df_residual
    );
    Ok(model)
}
