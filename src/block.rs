//! Line block extraction: wide day × station columns to long rows.
//!
//! Each metro line occupies a contiguous column range bounded by its own day
//! counter and total column. The range is reshaped into one row per
//! (day, station) cell, keeping the raw value text for the normalizer.

use crate::error::{Result, RidershipError};
use crate::models::{LineBlockSpec, LongRow};
use crate::month::MonthIndex;
use crate::raw_table::RawTable;
use std::path::Path;
use tracing::debug;

/// Reshape one line block into long rows.
///
/// Only rows retained by the month reconstruction are read. Rows are emitted
/// station by station, each station covering every retained row in file
/// order. The total column is excluded.
pub fn extract_line_block(
    table: &RawTable,
    months: &MonthIndex,
    spec: &LineBlockSpec,
    path: &Path,
) -> Result<Vec<LongRow>> {
    let locate = |column: &str| {
        table
            .column_index(column)
            .ok_or_else(|| RidershipError::MissingColumn {
                path: path.to_path_buf(),
                column: column.to_string(),
                line: spec.line.to_string(),
            })
    };

    let day_index = locate(spec.day_column.as_str())?;
    let total_index = locate(spec.total_column.as_str())?;

    if total_index <= day_index {
        return Err(RidershipError::InvalidBlockRange {
            line: spec.line.to_string(),
            day_column: spec.day_column.clone(),
            total_column: spec.total_column.clone(),
        });
    }

    let station_columns = (day_index + 1)..total_index;
    let mut rows = Vec::with_capacity(station_columns.len() * months.len());

    for column in station_columns.clone() {
        let station_code = &table.columns()[column];
        for entry in months.entries() {
            rows.push(LongRow {
                day: table.cell(entry.row, day_index).map(str::to_string),
                month_index: entry.month_index,
                station_code: station_code.clone(),
                raw_value: table.cell(entry.row, column).map(str::to_string),
                line: spec.line,
            });
        }
    }

    debug!(
        "Extracted {} long rows for line {} ({} station columns)",
        rows.len(),
        spec.line,
        station_columns.len()
    );

    Ok(rows)
}

/// Extract every configured block, in layout order
pub fn extract_all_blocks(
    table: &RawTable,
    months: &MonthIndex,
    layout: &[LineBlockSpec],
    path: &Path,
) -> Result<Vec<LongRow>> {
    let mut all_rows = Vec::new();
    for spec in layout {
        all_rows.extend(extract_line_block(table, months, spec, path)?);
    }
    Ok(all_rows)
}
