//! CSV output format for model coefficient tables
//!
//! `--format csv`: one row per model term, for spreadsheet analysis and
//! machine parsing. Interval bounds use the report's confidence level.

use crate::report::{AnalysisReport, ModelReport, ReportRenderer};
use serde::Serialize;

const HEADER: [&str; 9] = [
    "model",
    "formula",
    "term",
    "estimate",
    "std_error",
    "t_statistic",
    "p_value",
    "lower",
    "upper",
];

/// One coefficient row as written to the file
#[derive(Serialize)]
struct CsvRow<'a> {
    model: &'a str,
    formula: &'a str,
    term: &'a str,
    estimate: f64,
    std_error: f64,
    t_statistic: f64,
    p_value: f64,
    lower: f64,
    upper: f64,
}

/// Coefficient-table CSV renderer
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvRenderer;

impl CsvRenderer {
    fn write_model<W: std::io::Write>(
        writer: &mut csv::Writer<W>,
        model: &ModelReport,
    ) -> csv::Result<()> {
        for (row, interval) in model.coefficients.iter().zip(&model.intervals) {
            writer.serialize(CsvRow {
                model: &model.name,
                formula: &model.formula,
                term: &row.term,
                estimate: row.estimate,
                std_error: row.std_error,
                t_statistic: row.t_statistic,
                p_value: row.p_value,
                lower: interval.interval.lower,
                upper: interval.interval.upper,
            })?;
        }
        Ok(())
    }

    pub fn to_csv(report: &AnalysisReport) -> anyhow::Result<String> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());
        writer.write_record(HEADER)?;
        for model in &report.models {
            Self::write_model(&mut writer, model)?;
        }
        let bytes = writer.into_inner().map_err(|e| anyhow::anyhow!(e.to_string()))?;
        Ok(String::from_utf8(bytes)?)
    }
}

impl ReportRenderer for CsvRenderer {
    fn render(&self, report: &AnalysisReport) -> String {
        match Self::to_csv(report) {
            Ok(csv) => csv,
            Err(e) => {
                tracing::warn!("CSV serialization failed: {}", e);
                format!("{}\n", HEADER.join(","))
            }
        }
    }
}
