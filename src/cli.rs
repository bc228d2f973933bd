//! CLI argument parsing for maize-stats

use crate::config::{AnalysisConfig, HeightBounds};
use crate::diagnostics::DiagnosticCheck;
use crate::error::{AnalysisError, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for the analysis report
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format (default)
    Text,
    /// JSON format for machine parsing
    Json,
    /// CSV coefficient tables for spreadsheet analysis
    Csv,
}

#[derive(Parser, Debug)]
#[command(name = "maize-stats")]
#[command(version)]
#[command(
    about = "Paired-design analysis of plant heights: summaries, intervals, linear models and diagnostics",
    long_about = None
)]
pub struct Cli {
    /// CSV file with pair, type and height columns
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// TOML configuration file (flags below override its values)
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Confidence level for all t intervals (e.g. 0.95)
    #[arg(long = "confidence", value_name = "LEVEL")]
    pub confidence: Option<f64>,

    /// Reference level of the type factor (Cross or Self)
    #[arg(long = "reference", value_name = "LEVEL")]
    pub reference: Option<String>,

    /// Diagnostic check to run (normality, homogeneity, outliers); repeatable
    #[arg(long = "check", value_name = "NAME")]
    pub checks: Vec<DiagnosticCheck>,

    /// Lower plausibility bound for heights (requires --max-height)
    #[arg(long = "min-height", value_name = "X", requires = "max_height")]
    pub min_height: Option<f64>,

    /// Upper plausibility bound for heights (requires --min-height)
    #[arg(long = "max-height", value_name = "Y", requires = "min_height")]
    pub max_height: Option<f64>,

    /// Enable debug logging to stderr
    #[arg(long = "debug")]
    pub debug: bool,
}

impl Cli {
    /// Configuration file (or defaults) with command-line overrides applied
    pub fn resolve_config(&self) -> Result<AnalysisConfig> {
        let mut config = match &self.config {
            Some(path) => AnalysisConfig::from_file(path)?,
            None => AnalysisConfig::default(),
        };

        if let Some(level) = self.confidence {
            config.confidence_level = level;
        }
        if let Some(reference) = &self.reference {
            config.reference_level = reference.clone();
        }
        if !self.checks.is_empty() {
            config.checks = self.checks.clone();
        }
        if let (Some(min), Some(max)) = (self.min_height, self.max_height) {
            config.height_bounds = Some(HeightBounds { min, max });
        }

        config
            .validate()
            .map_err(|reason| AnalysisError::invalid("config", reason))?;
        Ok(config)
    }
}
