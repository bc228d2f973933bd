// Analysis configuration
//
// Loaded from a TOML file; CLI flags override individual fields afterwards.
// Every field has a default, so an empty file is a valid configuration.

use crate::data::LoadOptions;
use crate::diagnostics::{DiagnosticCheck, DiagnosticsConfig};
use crate::error::{AnalysisError, LoadFailure, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Inclusive plausibility range for heights; values outside are reported
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeightBounds {
    pub min: f64,
    pub max: f64,
}

/// Settings for one run of the analysis pipeline
///
/// # Example
/// ```
/// use maize_stats::config::AnalysisConfig;
///
/// let config = AnalysisConfig::from_toml_str("confidence_level = 0.9").unwrap();
/// assert_eq!(config.confidence_level, 0.9);
/// assert_eq!(config.reference_level, "Cross");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Coverage of every t-based interval in the report
    ///
    /// Default: 0.95
    pub confidence_level: f64,

    /// Baseline `type` level for the treatment-coded models
    ///
    /// The report also carries the model refitted against the other level.
    /// Default: "Cross"
    pub reference_level: String,

    /// Heights outside this range are listed in the load report
    pub height_bounds: Option<HeightBounds>,

    /// Diagnostic checks to run on the single-factor model
    ///
    /// Default: all of normality, homogeneity and outliers
    pub checks: Vec<DiagnosticCheck>,

    pub diagnostics: DiagnosticsConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            confidence_level: 0.95,
            reference_level: "Cross".to_string(),
            height_bounds: None,
            checks: DiagnosticCheck::ALL.to_vec(),
            diagnostics: DiagnosticsConfig::default(),
        }
    }
}

impl AnalysisConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| AnalysisError::invalid("config", e.to_string()))?;
        config
            .validate()
            .map_err(|reason| AnalysisError::invalid("config", reason))?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| AnalysisError::Load {
            path: path.to_path_buf(),
            source: LoadFailure::Io(e),
        })?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Self::from_toml_str(&content)
    }

    /// Validate configuration
    pub fn validate(&self) -> std::result::Result<(), String> {
        if !(self.confidence_level > 0.0 && self.confidence_level < 1.0) {
            return Err(format!(
                "confidence_level must be in (0, 1), got {}",
                self.confidence_level
            ));
        }

        if self.reference_level.trim().is_empty() {
            return Err("reference_level must not be empty".to_string());
        }

        if let Some(bounds) = self.height_bounds {
            if !(bounds.min.is_finite() && bounds.max.is_finite() && bounds.min <= bounds.max) {
                return Err(format!(
                    "height_bounds must satisfy min <= max, got [{}, {}]",
                    bounds.min, bounds.max
                ));
            }
        }

        self.diagnostics.validate()
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            height_bounds: self.height_bounds.map(|b| (b.min, b.max)),
        }
    }
}
