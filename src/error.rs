//! Error types shared by every analysis stage
//!
//! Each stage fails with one of four kinds. None of them is retried: every
//! computation is deterministic, so the caller must change the input instead.

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by the analysis library
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The input file could not be opened or parsed
    #[error("Failed to load {}: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: LoadFailure,
    },

    /// A pair id is missing its Cross or Self counterpart (or has several)
    #[error("Pair {pair} cannot be paired: {reason}")]
    Pairing { pair: u32, reason: String },

    /// Not enough data or factor levels to estimate the requested model
    #[error("Degenerate model: {reason}")]
    DegenerateModel { reason: String },

    /// A numeric or named argument is outside its valid domain
    #[error("Invalid value for {parameter}: {reason}")]
    InvalidInput { parameter: String, reason: String },
}

/// Underlying cause of an [`AnalysisError::Load`]
#[derive(Debug, Error)]
pub enum LoadFailure {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("required column '{0}' not found in header")]
    MissingColumn(String),

    #[error("invalid {column} value '{value}' on line {line}")]
    InvalidValue {
        line: u64,
        column: String,
        value: String,
    },
}

impl AnalysisError {
    /// Shorthand for [`AnalysisError::InvalidInput`]
    pub fn invalid(parameter: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            parameter: parameter.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for [`AnalysisError::DegenerateModel`]
    pub fn degenerate(reason: impl Into<String>) -> Self {
        Self::DegenerateModel {
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
