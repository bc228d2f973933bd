//! JSON output format for analysis reports
//!
//! `--format json`: the whole report, pretty-printed. NaN values (for example
//! the sd of a single-value group) serialise as `null`.

use crate::report::{AnalysisReport, ReportRenderer};

/// Pretty-printed JSON renderer
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRenderer;

impl JsonRenderer {
    pub fn to_json(report: &AnalysisReport) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(report)?)
    }
}

impl ReportRenderer for JsonRenderer {
    fn render(&self, report: &AnalysisReport) -> String {
        match Self::to_json(report) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!("JSON serialization failed: {}", e);
                serde_json::json!({ "error": e.to_string() }).to_string()
            }
        }
    }
}
