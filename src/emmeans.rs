//! Estimated marginal means from a fitted model
//!
//! Each level's mean is the model prediction with that level's treatment
//! indicators switched on and every other factor averaged over its levels with
//! equal weight. Standard errors come from the coefficient covariance matrix,
//! so they reflect the model's pooled variance rather than per-group spread.

use crate::data::Column;
use crate::error::{AnalysisError, Result};
use crate::interval::ConfidenceInterval;
use crate::model::{quadratic_form, LinearModel};
use serde::Serialize;

/// Default coverage for marginal mean intervals
pub const DEFAULT_LEVEL: f64 = 0.95;

/// Model-implied mean of one factor level
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarginalMean {
    pub level: String,
    pub emmean: f64,
    pub se: f64,
    pub df: usize,
    pub interval: ConfidenceInterval,
}

/// Difference between two marginal means
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Contrast {
    /// `"<level> - <other>"`
    pub label: String,
    pub estimate: f64,
    pub se: f64,
    pub interval: ConfidenceInterval,
}

/// Marginal means of one factor, with the linear combinations used to build them
#[derive(Debug, Clone, Serialize)]
pub struct EmmTable {
    pub factor: Column,
    pub confidence_level: f64,
    pub means: Vec<MarginalMean>,
    pub contrasts: Vec<Contrast>,
}

impl EmmTable {
    pub fn mean_for(&self, level: &str) -> Option<&MarginalMean> {
        self.means.iter().find(|m| m.level == level)
    }
}

/// Linear combination of coefficients that predicts `level` of `column`
fn level_weights(model: &LinearModel, column: Column, level: &str) -> Vec<f64> {
    let mut x = vec![1.0];
    for factor in model.factors() {
        if factor.column == column {
            x.extend(factor.indicators(level));
        } else {
            x.extend(factor.averaged_indicators());
        }
    }
    x
}

/// Marginal means and pairwise contrasts for `column`
///
/// `level` is the interval coverage; `None` uses [`DEFAULT_LEVEL`].
pub fn estimated_marginal_means(
    model: &LinearModel,
    column: Column,
    level: Option<f64>,
) -> Result<EmmTable> {
    let confidence_level = level.unwrap_or(DEFAULT_LEVEL);
    let factor = model.factor(column).ok_or_else(|| {
        AnalysisError::invalid(
            "model",
            format!("model has no factor '{}' to average over", column),
        )
    })?;

    let covariance = model.covariance();
    let df = model.df_residual();

    let weights: Vec<(String, Vec<f64>)> = factor
        .levels
        .iter()
        .map(|l| (l.clone(), level_weights(model, column, l)))
        .collect();

    let means = weights
        .iter()
        .map(|(name, x)| {
            let emmean = model.predict_row(x);
            let se = quadratic_form(&covariance, x).sqrt();
            Ok(MarginalMean {
                level: name.clone(),
                emmean,
                se,
                df,
                interval: ConfidenceInterval::t_interval(emmean, se, confidence_level, df as f64)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let mut contrasts = Vec::new();
    for (i, (name_a, x_a)) in weights.iter().enumerate() {
        for (name_b, x_b) in weights.iter().skip(i + 1) {
            let diff: Vec<f64> = x_a.iter().zip(x_b).map(|(a, b)| a - b).collect();
            let estimate = model.predict_row(&diff);
            let se = quadratic_form(&covariance, &diff).sqrt();
            contrasts.push(Contrast {
                label: format!("{} - {}", name_a, name_b),
                estimate,
                se,
                interval: ConfidenceInterval::t_interval(estimate, se, confidence_level, df as f64)?,
            });
        }
    }

    tracing::info!(
        "Estimated marginal means for '{}': {}",
        column,
        means
            .iter()
            .map(|m| format!("{}={:.3}", m.level, m.emmean))
            .collect::<Vec<_>>()
            .join(", ")
    );

    Ok(EmmTable {
        factor: column,
        confidence_level,
        means,
        contrasts,
    })
}
