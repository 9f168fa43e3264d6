//! Month reconstruction from day-of-month counter resets.
//!
//! Raw exports carry no month column: a year of daily rows is laid out
//! top to bottom and a new month starts wherever the day counter goes down.
//! The reconstruction runs once per file on the primary day column and is
//! shared by every line block, since all blocks describe the same rows.

use crate::error::{Result, RidershipError};
use crate::raw_table::RawTable;
use std::path::Path;
use tracing::debug;

/// Month index of each retained raw row, in file order
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MonthIndex {
    entries: Vec<MonthEntry>,
    /// Rows whose primary day field was not numeric
    pub rows_discarded: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthEntry {
    /// Row position in the raw table
    pub row: usize,
    pub month_index: u32,
}

impl MonthIndex {
    pub fn entries(&self) -> &[MonthEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Highest month index reached
    pub fn month_count(&self) -> u32 {
        self.entries.last().map(|e| e.month_index).unwrap_or(0)
    }
}

/// Coerce a raw day field to a number, as a spreadsheet would
pub fn coerce_day(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Running month index over an ordered day sequence.
///
/// Starts at 1 and increments on every strict decrease; the first value has
/// no predecessor and never counts as a reset.
pub fn month_sequence(days: &[f64]) -> Vec<u32> {
    days.iter()
        .scan((None::<f64>, 1u32), |(previous, month), &day| {
            if previous.is_some_and(|p| day < p) {
                *month += 1;
            }
            *previous = Some(day);
            Some(*month)
        })
        .collect()
}

/// Build the month index from the table's primary day column
pub fn reconstruct_months(table: &RawTable, day_column: &str, path: &Path) -> Result<MonthIndex> {
    let column = table
        .column_index(day_column)
        .ok_or_else(|| RidershipError::MissingColumn {
            path: path.to_path_buf(),
            column: day_column.to_string(),
            line: "primary day counter".to_string(),
        })?;

    let mut rows = Vec::new();
    let mut days = Vec::new();
    for row in 0..table.height() {
        if let Some(day) = table.cell(row, column).and_then(coerce_day) {
            rows.push(row);
            days.push(day);
        }
    }

    let months = month_sequence(&days);
    let entries: Vec<MonthEntry> = rows
        .into_iter()
        .zip(months)
        .map(|(row, month_index)| MonthEntry { row, month_index })
        .collect();

    let index = MonthIndex {
        rows_discarded: table.height() - entries.len(),
        entries,
    };

    debug!(
        "Reconstructed {} months over {} rows ({} non-numeric rows discarded)",
        index.month_count(),
        index.len(),
        index.rows_discarded
    );

    Ok(index)
}
