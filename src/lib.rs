//! maize-stats - Paired-design analysis of plant height measurements
//!
//! This library loads a small long-format table of paired Cross/Self plant
//! heights, summarises it, builds confidence intervals, fits ordinary least
//! squares models with treatment-coded factors, derives estimated marginal
//! means and checks model assumptions. Every stage returns plain records that
//! the text, JSON and CSV renderers turn into output.

pub mod cli;
pub mod config;
pub mod csv_output;
pub mod data;
pub mod diagnostics;
pub mod emmeans;
pub mod error;
pub mod hypothesis;
pub mod interval;
pub mod json_output;
pub mod model;
pub mod pipeline;
pub mod report;
pub mod summary;
pub mod text_output;

pub use error::{AnalysisError, LoadFailure, Result};

#[cfg(test)]
pub(crate) mod test_support;
