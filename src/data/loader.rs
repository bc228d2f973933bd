//! CSV loading and cleaning
//!
//! Reads a comma-delimited file into an [`ObservationTable`] and reports data
//! quality findings (missing cells, duplicate rows, height range) instead of
//! silently fixing them.

use super::{Observation, ObservationTable, PlantType};
use crate::error::{AnalysisError, LoadFailure, Result};
use serde::Serialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

/// Caller-controlled loading options
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Plausible height range `(min, max)`; values outside are reported
    pub height_bounds: Option<(f64, f64)>,
}

/// Data quality findings gathered while loading
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadReport {
    /// Data rows in the file (header excluded)
    pub rows_read: usize,
    /// Rows excluded because a required cell was missing
    pub rows_dropped: usize,
    /// Empty or `NA` cells across all columns
    pub missing_cells: usize,
    /// Rows repeating an earlier row exactly
    pub duplicate_rows: usize,
    pub height_min: Option<f64>,
    pub height_max: Option<f64>,
    /// Table row indices whose height lies outside `height_bounds`
    pub out_of_range: Vec<usize>,
}

/// Loaded table plus its quality report
#[derive(Debug, Clone)]
pub struct LoadedData {
    pub table: ObservationTable,
    pub report: LoadReport,
}

/// Normalise a header name to lower snake case
///
/// `" Plant Height "` and `"plantHeight"` both become `plant_height`.
pub fn normalize_header(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut prev: Option<char> = None;
    for c in raw.trim().chars() {
        if c.is_alphanumeric() {
            if c.is_uppercase()
                && prev.is_some_and(|p| p.is_lowercase() || p.is_ascii_digit())
            {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else if !out.ends_with('_') {
            out.push('_');
        }
        prev = Some(c);
    }
    out.trim_matches('_').to_string()
}

fn is_missing(cell: &str) -> bool {
    cell.is_empty() || cell == "NA"
}

struct ColumnIndices {
    pair: usize,
    plant_type: usize,
    height: usize,
}

fn locate_columns(headers: &csv::StringRecord) -> std::result::Result<ColumnIndices, LoadFailure> {
    let normalized: Vec<String> = headers.iter().map(normalize_header).collect();
    debug!("Normalized headers: {:?}", normalized);

    let find = |name: &str| {
        normalized
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| LoadFailure::MissingColumn(name.to_string()))
    };

    Ok(ColumnIndices {
        pair: find("pair")?,
        plant_type: find("type")?,
        height: find("height")?,
    })
}

/// Parse observations from any reader
///
/// Errors carry no path; [`load_observations`] attaches it.
pub fn parse_observations<R: Read>(
    reader: R,
    options: &LoadOptions,
) -> std::result::Result<LoadedData, LoadFailure> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let columns = locate_columns(csv_reader.headers()?)?;

    let mut rows = Vec::new();
    let mut rows_read = 0;
    let mut rows_dropped = 0;
    let mut missing_cells = 0;

    for record in csv_reader.records() {
        let record = record?;
        rows_read += 1;
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        missing_cells += record.iter().filter(|c| is_missing(c)).count();

        let pair_cell = record.get(columns.pair).unwrap_or("");
        let type_cell = record.get(columns.plant_type).unwrap_or("");
        let height_cell = record.get(columns.height).unwrap_or("");

        if [pair_cell, type_cell, height_cell].iter().any(|c| is_missing(c)) {
            warn!("Line {}: missing required value, row excluded", line);
            rows_dropped += 1;
            continue;
        }

        let invalid = |column: &str, value: &str| LoadFailure::InvalidValue {
            line,
            column: column.to_string(),
            value: value.to_string(),
        };

        let pair: u32 = pair_cell.parse().map_err(|_| invalid("pair", pair_cell))?;
        let plant_type: PlantType = type_cell.parse().map_err(|_| invalid("type", type_cell))?;
        let height: f64 = height_cell
            .parse()
            .ok()
            .filter(|h: &f64| h.is_finite())
            .ok_or_else(|| invalid("height", height_cell))?;

        rows.push(Observation {
            pair,
            plant_type,
            height,
        });
    }

    let table = ObservationTable::new(rows);
    let report = build_report(&table, rows_read, rows_dropped, missing_cells, options);
    Ok(LoadedData { table, report })
}

fn build_report(
    table: &ObservationTable,
    rows_read: usize,
    rows_dropped: usize,
    missing_cells: usize,
    options: &LoadOptions,
) -> LoadReport {
    let heights = table.heights();
    let height_min = heights.iter().copied().reduce(f64::min);
    let height_max = heights.iter().copied().reduce(f64::max);

    if let (Some(min), Some(max)) = (height_min, height_max) {
        info!("Height range: min={:.3}, max={:.3}", min, max);
    }

    let out_of_range: Vec<usize> = match options.height_bounds {
        Some((lo, hi)) => heights
            .iter()
            .enumerate()
            .filter(|(_, h)| **h < lo || **h > hi)
            .map(|(i, _)| i)
            .collect(),
        None => Vec::new(),
    };
    if !out_of_range.is_empty() {
        warn!(
            "{} height values outside plausible range: rows {:?}",
            out_of_range.len(),
            out_of_range
        );
    }

    let duplicate_rows = table.duplicate_count();
    if duplicate_rows > 0 {
        warn!("{} duplicate rows found (not removed)", duplicate_rows);
    }
    if missing_cells > 0 {
        warn!("{} missing cells found", missing_cells);
    }

    LoadReport {
        rows_read,
        rows_dropped,
        missing_cells,
        duplicate_rows,
        height_min,
        height_max,
        out_of_range,
    }
}

/// Load and validate the observation file at `path`
pub fn load_observations(path: impl AsRef<Path>, options: &LoadOptions) -> Result<LoadedData> {
    let path = path.as_ref();
    let wrap = |source: LoadFailure| AnalysisError::Load {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(|e| wrap(e.into()))?;
    let loaded = parse_observations(file, options).map_err(wrap)?;

    info!(
        "Loaded {} observations from {} ({} rows read)",
        loaded.table.len(),
        path.display(),
        loaded.report.rows_read
    );
    Ok(loaded)
}
