//! Descriptive statistics for the observation table
//!
//! Group means and standard deviations use `statrs::statistics::Statistics`
//! (sample standard deviation, n-1 denominator). Quantile summaries go through
//! trueno vectors and aprender's `DescriptiveStats`.

use crate::data::{Column, ObservationTable, PlantType};
use crate::error::{AnalysisError, Result};
use aprender::stats::DescriptiveStats;
use serde::Serialize;
use statrs::statistics::Statistics;
use std::collections::BTreeMap;
use trueno::Vector;

/// Mean, standard deviation and count of one `type` group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupStats {
    pub label: String,
    pub mean: f64,
    /// Sample standard deviation; NaN when `count < 2`
    pub sd: f64,
    pub count: usize,
}

/// Minimum, quartiles and maximum of one `type` group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FiveNumberSummary {
    pub label: String,
    pub min: f32,
    pub q1: f32,
    pub median: f32,
    pub q3: f32,
    pub max: f32,
}

/// One pair in wide form
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PairedRow {
    pub pair: u32,
    pub cross: f64,
    #[serde(rename = "self")]
    pub self_fertilised: f64,
    /// `cross - self_fertilised`
    pub difference: f64,
}

/// Wide-format table, one row per pair id in ascending order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairedTable {
    pub rows: Vec<PairedRow>,
}

impl PairedTable {
    pub fn differences(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.difference).collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Summary of the within-pair differences
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DifferenceSummary {
    pub mean: f64,
    pub sd: f64,
    /// `sd / sqrt(n)`
    pub se: f64,
    pub n: usize,
}

fn plant_type_of(label: &str) -> Result<PlantType> {
    label.parse()
}

/// Group-wise mean, sd and count, in the table's `type` level order
pub fn group_summary(table: &ObservationTable) -> Result<Vec<GroupStats>> {
    table
        .levels(Column::Type)?
        .iter()
        .map(|label| {
            let heights = table.heights_for(plant_type_of(label)?);
            Ok(GroupStats {
                label: label.clone(),
                mean: heights.iter().mean(),
                sd: heights.iter().std_dev(),
                count: heights.len(),
            })
        })
        .collect()
}

/// Five-number summary per `type` group
pub fn five_number_summary(table: &ObservationTable) -> Result<Vec<FiveNumberSummary>> {
    let quantile_err =
        |e: String| AnalysisError::invalid("height", format!("quantile failed: {}", e));

    table
        .levels(Column::Type)?
        .iter()
        .map(|label| {
            let heights: Vec<f32> = table
                .heights_for(plant_type_of(label)?)
                .into_iter()
                .map(|h| h as f32)
                .collect();
            if heights.is_empty() {
                return Err(AnalysisError::invalid(
                    "height",
                    format!("group '{}' is empty", label),
                ));
            }

            let v = Vector::from_slice(&heights);
            let stats = DescriptiveStats::new(&v);
            Ok(FiveNumberSummary {
                label: label.clone(),
                min: v.min().unwrap_or(f32::NAN),
                q1: stats.quantile(0.25).map_err(|e| quantile_err(e.to_string()))?,
                median: stats.quantile(0.5).map_err(|e| quantile_err(e.to_string()))?,
                q3: stats.quantile(0.75).map_err(|e| quantile_err(e.to_string()))?,
                max: v.max().unwrap_or(f32::NAN),
            })
        })
        .collect()
}

/// Pivot to one row per pair with its Cross and Self heights
///
/// Every pair must have exactly one value of each type. The first offending
/// pair (lowest id) aborts the pivot; no partial table is returned.
pub fn pivot_pairs(table: &ObservationTable) -> Result<PairedTable> {
    let mut by_pair: BTreeMap<u32, (Vec<f64>, Vec<f64>)> = BTreeMap::new();
    for row in table.rows() {
        let entry = by_pair.entry(row.pair).or_default();
        match row.plant_type {
            PlantType::Cross => entry.0.push(row.height),
            PlantType::SelfFertilised => entry.1.push(row.height),
        }
    }

    let mut rows = Vec::with_capacity(by_pair.len());
    for (pair, (cross, selfed)) in by_pair {
        match (cross.as_slice(), selfed.as_slice()) {
            ([c], [s]) => rows.push(PairedRow {
                pair,
                cross: *c,
                self_fertilised: *s,
                difference: c - s,
            }),
            _ => {
                let reason = format!(
                    "expected one Cross and one Self value, found {} Cross and {} Self",
                    cross.len(),
                    selfed.len()
                );
                tracing::warn!("Pairing failed for pair {}: {}", pair, reason);
                return Err(AnalysisError::Pairing { pair, reason });
            }
        }
    }

    tracing::debug!("Pivoted {} pairs", rows.len());
    Ok(PairedTable { rows })
}

/// Mean, sd and standard error of the paired differences
pub fn difference_summary(paired: &PairedTable) -> Result<DifferenceSummary> {
    let n = paired.len();
    if n < 2 {
        return Err(AnalysisError::invalid(
            "paired",
            format!("need at least 2 pairs, got {}", n),
        ));
    }

    let diffs = paired.differences();
    let sd = diffs.iter().std_dev();
    Ok(DifferenceSummary {
        mean: diffs.iter().mean(),
        sd,
        se: sd / (n as f64).sqrt(),
        n,
    })
}
