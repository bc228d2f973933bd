//! Observation table for paired plant height measurements
//!
//! A table is an immutable value: operations such as [`relevel`] and
//! [`ObservationTable::distinct`] return a new table and leave the input as is.

mod loader;

pub use loader::{
    load_observations, normalize_header, parse_observations, LoadOptions, LoadReport, LoadedData,
};

use crate::error::{AnalysisError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

/// Pollination treatment of a plant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PlantType {
    /// Cross-fertilised
    Cross,
    /// Self-fertilised
    #[serde(rename = "Self")]
    SelfFertilised,
}

impl PlantType {
    pub fn label(&self) -> &'static str {
        match self {
            PlantType::Cross => "Cross",
            PlantType::SelfFertilised => "Self",
        }
    }
}

impl fmt::Display for PlantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

impl FromStr for PlantType {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "Cross" => Ok(PlantType::Cross),
            "Self" => Ok(PlantType::SelfFertilised),
            other => Err(AnalysisError::invalid(
                "type",
                format!("unknown label '{}', expected Cross or Self", other),
            )),
        }
    }
}

/// Canonical column names of the observation table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Column {
    Pair,
    Type,
    Height,
}

impl Column {
    pub fn name(&self) -> &'static str {
        match self {
            Column::Pair => "pair",
            Column::Type => "type",
            Column::Height => "height",
        }
    }

    /// Whether the column can be used as a model factor
    pub fn is_categorical(&self) -> bool {
        !matches!(self, Column::Height)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for Column {
    type Err = AnalysisError;

    /// Accepts any header spelling that normalises to a canonical name
    fn from_str(s: &str) -> Result<Self> {
        match normalize_header(s).as_str() {
            "pair" => Ok(Column::Pair),
            "type" => Ok(Column::Type),
            "height" => Ok(Column::Height),
            _ => Err(AnalysisError::invalid(
                "column",
                format!("unknown column '{}'", s),
            )),
        }
    }
}

/// One measured plant
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub pair: u32,
    #[serde(rename = "type")]
    pub plant_type: PlantType,
    pub height: f64,
}

impl Observation {
    /// Level label of a categorical column for this row
    pub fn level(&self, column: Column) -> Option<String> {
        match column {
            Column::Pair => Some(self.pair.to_string()),
            Column::Type => Some(self.plant_type.label().to_string()),
            Column::Height => None,
        }
    }

    /// Bit-exact identity used for duplicate detection
    fn key(&self) -> (u32, PlantType, u64) {
        (self.pair, self.plant_type, self.height.to_bits())
    }
}

/// Ordered, immutable table of observations with explicit factor level order
///
/// The first entry of each level list is the reference level used when the
/// column is encoded as a treatment-coded factor.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationTable {
    rows: Vec<Observation>,
    levels: BTreeMap<Column, Vec<String>>,
}

impl ObservationTable {
    /// Build a table; factor levels are ordered by first appearance
    pub fn new(rows: Vec<Observation>) -> Self {
        let mut levels = BTreeMap::new();
        for column in [Column::Pair, Column::Type] {
            let mut seen = HashSet::new();
            let order: Vec<String> = rows
                .iter()
                .filter_map(|r| r.level(column))
                .filter(|l| seen.insert(l.clone()))
                .collect();
            levels.insert(column, order);
        }
        Self { rows, levels }
    }

    pub fn rows(&self) -> &[Observation] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn heights(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.height).collect()
    }

    /// Heights of one treatment group, in row order
    pub fn heights_for(&self, plant_type: PlantType) -> Vec<f64> {
        self.rows
            .iter()
            .filter(|r| r.plant_type == plant_type)
            .map(|r| r.height)
            .collect()
    }

    /// Level order of a categorical column (reference first)
    pub fn levels(&self, column: Column) -> Result<&[String]> {
        self.levels
            .get(&column)
            .map(Vec::as_slice)
            .ok_or_else(|| {
                AnalysisError::invalid(
                    "factor_column",
                    format!("column '{}' is not categorical", column),
                )
            })
    }

    /// Current reference level of a categorical column
    pub fn reference_level(&self, column: Column) -> Result<&str> {
        self.levels(column)?
            .first()
            .map(String::as_str)
            .ok_or_else(|| {
                AnalysisError::invalid("factor_column", format!("column '{}' has no levels", column))
            })
    }

    /// Number of rows that exactly repeat an earlier row
    pub fn duplicate_count(&self) -> usize {
        let mut seen = HashSet::new();
        self.rows.iter().filter(|r| !seen.insert(r.key())).count()
    }

    /// New table with repeated rows removed, keeping first occurrences
    pub fn distinct(&self) -> Self {
        let mut seen = HashSet::new();
        let rows = self
            .rows
            .iter()
            .filter(|r| seen.insert(r.key()))
            .copied()
            .collect();
        Self {
            rows,
            levels: self.levels.clone(),
        }
    }
}

/// Return a copy of `table` whose `column` uses `new_reference` as baseline
///
/// The remaining levels keep their relative order.
pub fn relevel(
    table: &ObservationTable,
    column: Column,
    new_reference: &str,
) -> Result<ObservationTable> {
    let current = table.levels(column)?;
    let position = current
        .iter()
        .position(|l| l == new_reference)
        .ok_or_else(|| {
            AnalysisError::invalid(
                "new_reference",
                format!(
                    "level '{}' not present in column '{}' (levels: {})",
                    new_reference,
                    column,
                    current.join(", ")
                ),
            )
        })?;

    let mut order = current.to_vec();
    let reference = order.remove(position);
    order.insert(0, reference);

    let mut releveled = table.clone();
    releveled.levels.insert(column, order);
    tracing::debug!("Releveled '{}' with reference '{}'", column, new_reference);
    Ok(releveled)
}
