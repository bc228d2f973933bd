//! Confidence intervals from an estimate and its standard error

use crate::error::{AnalysisError, Result};
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, Normal, StudentsT};

/// Two-sided interval around a point estimate
///
/// Immutable once built; construct with [`ConfidenceInterval::from_multiplier`]
/// or [`ConfidenceInterval::t_interval`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConfidenceInterval {
    pub estimate: f64,
    pub lower: f64,
    pub upper: f64,
    /// Nominal coverage in (0, 1)
    pub level: f64,
}

impl ConfidenceInterval {
    /// `estimate ± multiplier * se`
    ///
    /// `level` records the two-sided normal coverage implied by the
    /// multiplier, e.g. 0.9545 for the classic "two standard errors" rule.
    pub fn from_multiplier(estimate: f64, se: f64, multiplier: f64) -> Result<Self> {
        validate_estimate(estimate)?;
        validate_non_negative("se", se)?;
        validate_non_negative("multiplier", multiplier)?;

        let level = 2.0 * standard_normal().cdf(multiplier) - 1.0;
        Ok(Self {
            estimate,
            lower: estimate - multiplier * se,
            upper: estimate + multiplier * se,
            level,
        })
    }

    /// Student-t interval with exact coverage `level` at `df` degrees of freedom
    pub fn t_interval(estimate: f64, se: f64, level: f64, df: f64) -> Result<Self> {
        let multiplier = t_multiplier(level, df)?;
        let interval = Self::from_multiplier(estimate, se, multiplier)?;
        Ok(Self { level, ..interval })
    }

    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    pub fn contains(&self, value: f64) -> bool {
        self.lower <= value && value <= self.upper
    }
}

/// Two-sided t critical value: the `(1 + level) / 2` quantile
pub fn t_multiplier(level: f64, df: f64) -> Result<f64> {
    validate_level(level)?;
    if df.is_nan() || df <= 0.0 {
        return Err(AnalysisError::invalid(
            "df",
            format!("degrees of freedom must be positive, got {}", df),
        ));
    }
    let dist = StudentsT::new(0.0, 1.0, df)
        .map_err(|e| AnalysisError::invalid("df", e.to_string()))?;
    Ok(dist.inverse_cdf((1.0 + level) / 2.0))
}

pub(crate) fn standard_normal() -> Normal {
    Normal::standard()
}

pub(crate) fn validate_level(level: f64) -> Result<()> {
    if level > 0.0 && level < 1.0 {
        Ok(())
    } else {
        Err(AnalysisError::invalid(
            "level",
            format!("confidence level must lie in (0, 1), got {}", level),
        ))
    }
}

fn validate_estimate(estimate: f64) -> Result<()> {
    if estimate.is_finite() {
        Ok(())
    } else {
        Err(AnalysisError::invalid(
            "estimate",
            format!("must be finite, got {}", estimate),
        ))
    }
}

fn validate_non_negative(parameter: &str, value: f64) -> Result<()> {
    if value.is_nan() || value < 0.0 || value.is_infinite() {
        Err(AnalysisError::invalid(
            parameter,
            format!("must be a finite non-negative number, got {}", value),
        ))
    } else {
        Ok(())
    }
}
