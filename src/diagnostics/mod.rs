// Model assumption checks
//
// Three independently requestable checks on a fitted model:
// - normality: Shapiro-Wilk on the residuals, with Q-Q coordinates
// - homogeneity: Koenker Breusch-Pagan against fitted values
// - outliers: Cook's distance above a threshold (default 4/n)
//
// Checks only read the model.

mod homogeneity;
mod influence;
mod normality;

pub use homogeneity::{breusch_pagan, BreuschPagan};
pub use influence::ModelDiagnostics;
pub use normality::{qq_points, shapiro_wilk, QqPoint, ShapiroWilk};

use crate::error::{AnalysisError, Result};
use crate::model::LinearModel;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticCheck {
    Normality,
    Homogeneity,
    Outliers,
}

impl DiagnosticCheck {
    pub const ALL: [DiagnosticCheck; 3] = [
        DiagnosticCheck::Normality,
        DiagnosticCheck::Homogeneity,
        DiagnosticCheck::Outliers,
    ];

    pub fn name(self) -> &'static str {
        match self {
            DiagnosticCheck::Normality => "normality",
            DiagnosticCheck::Homogeneity => "homogeneity",
            DiagnosticCheck::Outliers => "outliers",
        }
    }
}

impl fmt::Display for DiagnosticCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DiagnosticCheck {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.name() == wanted)
            .ok_or_else(|| {
                AnalysisError::invalid(
                    "check",
                    format!(
                        "unknown check '{}' (expected normality, homogeneity or outliers)",
                        s
                    ),
                )
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Pass,
    Flagged,
}

impl Verdict {
    fn flagged_if(condition: bool) -> Self {
        if condition {
            Verdict::Flagged
        } else {
            Verdict::Pass
        }
    }

    pub fn is_flagged(self) -> bool {
        self == Verdict::Flagged
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Pass => f.write_str("pass"),
            Verdict::Flagged => f.write_str("flagged"),
        }
    }
}

/// Thresholds for the diagnostic checks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticsConfig {
    /// Significance level for the normality and homogeneity tests
    pub alpha: f64,

    /// Cook's distance cut-off; `None` means `4 / n`
    pub cooks_threshold: Option<f64>,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            alpha: 0.05,
            cooks_threshold: None,
        }
    }
}

impl DiagnosticsConfig {
    pub fn validate(&self) -> std::result::Result<(), String> {
        if !(self.alpha > 0.0 && self.alpha < 1.0) {
            return Err(format!("alpha must be in (0, 1), got {}", self.alpha));
        }
        if let Some(t) = self.cooks_threshold {
            if !(t.is_finite() && t > 0.0) {
                return Err(format!("cooks_threshold must be positive, got {}", t));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalityCheck {
    pub verdict: Verdict,
    pub shapiro_wilk: ShapiroWilk,
    /// Theoretical quantiles against sorted studentised residuals
    pub qq: Vec<QqPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HomogeneityCheck {
    pub verdict: Verdict,
    pub breusch_pagan: BreuschPagan,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutlierCheck {
    pub verdict: Verdict,
    pub threshold: f64,
    pub cooks_distance: Vec<f64>,
    /// Row indices whose Cook's distance exceeds `threshold`
    pub flagged: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "check", rename_all = "lowercase")]
pub enum CheckResult {
    Normality(NormalityCheck),
    Homogeneity(HomogeneityCheck),
    Outliers(OutlierCheck),
}

impl CheckResult {
    pub fn check(&self) -> DiagnosticCheck {
        match self {
            CheckResult::Normality(_) => DiagnosticCheck::Normality,
            CheckResult::Homogeneity(_) => DiagnosticCheck::Homogeneity,
            CheckResult::Outliers(_) => DiagnosticCheck::Outliers,
        }
    }

    pub fn verdict(&self) -> Verdict {
        match self {
            CheckResult::Normality(c) => c.verdict,
            CheckResult::Homogeneity(c) => c.verdict,
            CheckResult::Outliers(c) => c.verdict,
        }
    }
}

/// A requested check that could not be computed for this model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedCheck {
    pub check: DiagnosticCheck,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagnosticsReport {
    pub n_obs: usize,
    pub leverage: Vec<f64>,
    pub results: Vec<CheckResult>,
    pub skipped: Vec<SkippedCheck>,
}

impl DiagnosticsReport {
    pub fn get(&self, check: DiagnosticCheck) -> Option<&CheckResult> {
        self.results.iter().find(|r| r.check() == check)
    }

    pub fn normality(&self) -> Option<&NormalityCheck> {
        self.results.iter().find_map(|r| match r {
            CheckResult::Normality(c) => Some(c),
            _ => None,
        })
    }

    pub fn homogeneity(&self) -> Option<&HomogeneityCheck> {
        self.results.iter().find_map(|r| match r {
            CheckResult::Homogeneity(c) => Some(c),
            _ => None,
        })
    }

    pub fn outliers(&self) -> Option<&OutlierCheck> {
        self.results.iter().find_map(|r| match r {
            CheckResult::Outliers(c) => Some(c),
            _ => None,
        })
    }

    pub fn any_flagged(&self) -> bool {
        self.results.iter().any(|r| r.verdict().is_flagged())
    }
}

fn normality_check(diag: &ModelDiagnostics, alpha: f64) -> Result<NormalityCheck> {
    let sw = shapiro_wilk(&diag.residuals)?;
    Ok(NormalityCheck {
        verdict: Verdict::flagged_if(sw.p_value < alpha),
        shapiro_wilk: sw,
        qq: qq_points(&diag.studentized),
    })
}

fn homogeneity_check(diag: &ModelDiagnostics, alpha: f64) -> Result<HomogeneityCheck> {
    let bp = breusch_pagan(diag)?;
    Ok(HomogeneityCheck {
        verdict: Verdict::flagged_if(bp.p_value < alpha),
        breusch_pagan: bp,
    })
}

fn outlier_check(diag: &ModelDiagnostics, threshold: Option<f64>) -> OutlierCheck {
    let threshold = threshold.unwrap_or(4.0 / diag.len() as f64);
    let flagged: Vec<usize> = diag
        .cooks_distance
        .iter()
        .enumerate()
        .filter(|(_, d)| **d > threshold)
        .map(|(i, _)| i)
        .collect();

    OutlierCheck {
        verdict: Verdict::flagged_if(!flagged.is_empty()),
        threshold,
        cooks_distance: diag.cooks_distance.clone(),
        flagged,
    }
}

/// Run the requested checks, in request order, each at most once
///
/// A check whose statistic is undefined for the model (for example
/// identical residuals) is recorded in `skipped` and the rest still run.
pub fn check_model(
    model: &LinearModel,
    checks: &[DiagnosticCheck],
    config: &DiagnosticsConfig,
) -> Result<DiagnosticsReport> {
    config
        .validate()
        .map_err(|reason| AnalysisError::invalid("diagnostics", reason))?;

    let diag = ModelDiagnostics::compute(model);
    let mut results = Vec::with_capacity(checks.len());
    let mut skipped = Vec::new();
    let mut seen = Vec::with_capacity(checks.len());

    for &check in checks {
        if seen.contains(&check) {
            continue;
        }
        seen.push(check);

        let computed = match check {
            DiagnosticCheck::Normality => {
                normality_check(&diag, config.alpha).map(CheckResult::Normality)
            }
            DiagnosticCheck::Homogeneity => {
                homogeneity_check(&diag, config.alpha).map(CheckResult::Homogeneity)
            }
            DiagnosticCheck::Outliers => Ok(CheckResult::Outliers(outlier_check(
                &diag,
                config.cooks_threshold,
            ))),
        };
        let result = match computed {
            Ok(result) => result,
            Err(AnalysisError::InvalidInput { reason, .. }) => {
                tracing::warn!("Diagnostic check '{}' skipped: {}", check, reason);
                skipped.push(SkippedCheck { check, reason });
                continue;
            }
            Err(e) => return Err(e),
        };

        match result.verdict() {
            Verdict::Flagged => tracing::warn!("Diagnostic check '{}' flagged", check),
            Verdict::Pass => tracing::info!("Diagnostic check '{}' passed", check),
        }
        results.push(result);
    }

    Ok(DiagnosticsReport {
        n_obs: diag.len(),
        leverage: diag.leverage,
        results,
        skipped,
    })
}

#[cfg(test)]
mod tests;
