//! Aggregate analysis report and the renderer seam
//!
//! The pipeline only produces plain records. Turning them into text, JSON or
//! CSV is the job of a [`ReportRenderer`].

use crate::config::AnalysisConfig;
use crate::data::LoadReport;
use crate::diagnostics::DiagnosticsReport;
use crate::emmeans::EmmTable;
use crate::hypothesis::TTestResult;
use crate::interval::ConfidenceInterval;
use crate::model::{CoefficientRow, FitSummary, ModelKind, TermInterval};
use crate::summary::{DifferenceSummary, FiveNumberSummary, GroupStats, PairedTable};
use serde::Serialize;

/// Intervals for the mean paired difference
#[derive(Debug, Clone, Serialize)]
pub struct PairedIntervals {
    /// `mean ± 2 se`
    pub rough: ConfidenceInterval,
    /// Student t interval at the configured level
    pub exact: ConfidenceInterval,
}

/// Coefficient table, intervals and fit statistics of one fitted model
#[derive(Debug, Clone, Serialize)]
pub struct ModelReport {
    pub name: String,
    pub kind: ModelKind,
    pub formula: String,
    /// Baseline `type` level, `None` for the intercept-only model
    pub reference_level: Option<String>,
    pub coefficients: Vec<CoefficientRow>,
    pub intervals: Vec<TermInterval>,
    pub fit: FitSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct TTests {
    pub paired: TTestResult,
    pub two_sample: TTestResult,
}

/// Everything one pipeline run produces
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub input: String,
    pub config: AnalysisConfig,
    pub load: LoadReport,
    pub groups: Vec<GroupStats>,
    pub five_number: Vec<FiveNumberSummary>,
    pub paired: PairedTable,
    pub differences: DifferenceSummary,
    pub paired_intervals: PairedIntervals,
    pub t_tests: TTests,
    pub models: Vec<ModelReport>,
    pub emmeans: EmmTable,
    pub diagnostics: DiagnosticsReport,
}

impl AnalysisReport {
    pub fn model(&self, name: &str) -> Option<&ModelReport> {
        self.models.iter().find(|m| m.name == name)
    }
}

/// Renders a finished report into one output format
pub trait ReportRenderer {
    fn render(&self, report: &AnalysisReport) -> String;
}
