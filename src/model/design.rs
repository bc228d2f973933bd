// Treatment coding of categorical factors into a design matrix

use crate::data::{Column, ObservationTable};
use crate::error::{AnalysisError, Result};
use nalgebra::DMatrix;
use serde::Serialize;

pub const INTERCEPT: &str = "(Intercept)";

/// A categorical column with an explicit level order, reference first
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactorEncoding {
    pub column: Column,
    pub levels: Vec<String>,
}

impl FactorEncoding {
    /// Encode `column` with `reference` as the baseline level
    ///
    /// Non-reference levels keep the table's level order. A column with fewer
    /// than two observed levels cannot carry a contrast.
    pub fn new(table: &ObservationTable, column: Column, reference: &str) -> Result<Self> {
        if !column.is_categorical() {
            return Err(AnalysisError::invalid(
                "factor_column",
                format!("'{}' is continuous and cannot be a factor", column),
            ));
        }

        let observed = table.levels(column)?;
        if observed.len() < 2 {
            return Err(AnalysisError::degenerate(format!(
                "factor '{}' has {} distinct level(s), need at least 2",
                column,
                observed.len()
            )));
        }

        if !observed.iter().any(|l| l == reference) {
            return Err(AnalysisError::invalid(
                "reference_level",
                format!(
                    "level '{}' not present in '{}' (levels: {})",
                    reference,
                    column,
                    observed.join(", ")
                ),
            ));
        }

        let mut levels = vec![reference.to_string()];
        levels.extend(observed.iter().filter(|l| *l != reference).cloned());
        Ok(Self { column, levels })
    }

    pub fn reference(&self) -> &str {
        &self.levels[0]
    }

    /// Levels that receive an indicator column
    pub fn contrast_levels(&self) -> &[String] {
        &self.levels[1..]
    }

    /// Coefficient names, e.g. `typeSelf`
    pub fn term_names(&self) -> Vec<String> {
        self.contrast_levels()
            .iter()
            .map(|l| format!("{}{}", self.column, l))
            .collect()
    }

    /// Indicator values for one level of this factor
    pub fn indicators(&self, level: &str) -> Vec<f64> {
        self.contrast_levels()
            .iter()
            .map(|l| if l == level { 1.0 } else { 0.0 })
            .collect()
    }

    /// Indicator values averaged over all levels with equal weight
    pub fn averaged_indicators(&self) -> Vec<f64> {
        let weight = 1.0 / self.levels.len() as f64;
        vec![weight; self.contrast_levels().len()]
    }
}

/// Build the design matrix and term names for an intercept plus `factors`
pub fn build_design(table: &ObservationTable, factors: &[FactorEncoding]) -> (DMatrix<f64>, Vec<String>) {
    let mut terms = vec![INTERCEPT.to_string()];
    for factor in factors {
        terms.extend(factor.term_names());
    }

    let mut values = Vec::with_capacity(table.len() * terms.len());
    for obs in table.rows() {
        values.push(1.0);
        for factor in factors {
            let level = obs.level(factor.column).unwrap_or_default();
            values.extend(factor.indicators(&level));
        }
    }

    (DMatrix::from_row_slice(table.len(), terms.len(), &values), terms)
}
