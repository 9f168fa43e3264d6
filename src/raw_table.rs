//! In-memory table of a raw ridership export.
//!
//! Header cells are trimmed, then named after spreadsheet-export conventions:
//! an empty header cell becomes `Unnamed: <position>` and a repeated name
//! gets a `.N` suffix for its N-th repetition (`DIA`, `DIA.1`, `DIA.2`, ...).

use crate::constants::UNNAMED_COLUMN_PREFIX;
use std::collections::HashMap;
use tracing::debug;

/// Rows × named columns, every cell kept as raw text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTable {
    columns: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl RawTable {
    /// Build a table from a header record and body records.
    ///
    /// Short rows are padded with missing cells; fields beyond the header
    /// width are discarded.
    pub fn from_records(header: Vec<String>, records: Vec<Vec<String>>) -> Self {
        let columns = dedupe_column_names(name_empty_columns(header));
        let width = columns.len();

        let mut truncated = 0usize;
        let rows = records
            .into_iter()
            .map(|record| {
                if record.len() > width {
                    truncated += 1;
                }
                let mut row: Vec<Option<String>> = record
                    .into_iter()
                    .take(width)
                    .map(|cell| if cell.trim().is_empty() { None } else { Some(cell) })
                    .collect();
                row.resize(width, None);
                row
            })
            .collect();

        if truncated > 0 {
            debug!("{} rows had more fields than the header and were truncated", truncated);
        }

        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .and_then(|c| c.as_deref())
    }

    /// Remove placeholder columns created for empty header cells
    pub fn drop_unnamed_columns(self) -> Self {
        let keep: Vec<bool> = self
            .columns
            .iter()
            .map(|c| !c.starts_with(UNNAMED_COLUMN_PREFIX))
            .collect();

        let columns = self
            .columns
            .into_iter()
            .zip(&keep)
            .filter_map(|(c, &k)| k.then_some(c))
            .collect();

        let rows = self
            .rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .zip(&keep)
                    .filter_map(|(cell, &k)| k.then_some(cell))
                    .collect()
            })
            .collect();

        Self { columns, rows }
    }
}

fn name_empty_columns(header: Vec<String>) -> Vec<String> {
    header
        .into_iter()
        .enumerate()
        .map(|(i, name)| {
            let name = name.trim();
            if name.is_empty() {
                format!("{}: {}", UNNAMED_COLUMN_PREFIX, i)
            } else {
                name.to_string()
            }
        })
        .collect()
}

/// Suffix repeated column names with their repetition index.
///
/// A generated name that collides with a later literal name keeps counting,
/// so every resulting name is unique.
pub fn dedupe_column_names(names: Vec<String>) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut result = Vec::with_capacity(names.len());

    for name in names {
        let mut current = name;
        let mut count = counts.get(&current).copied().unwrap_or(0);
        while count > 0 {
            counts.insert(current.clone(), count + 1);
            current = format!("{}.{}", current, count);
            count = counts.get(&current).copied().unwrap_or(0);
        }
        counts.insert(current.clone(), count + 1);
        result.push(current);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_repeated_names_get_suffixes() {
        let names = strings(&["DIA", "JAB", "TOTAL", "DIA", "PSO", "TOTAL", "DIA", "TOTAL"]);
        assert_eq!(
            dedupe_column_names(names),
            strings(&["DIA", "JAB", "TOTAL", "DIA.1", "PSO", "TOTAL.1", "DIA.2", "TOTAL.2"])
        );
    }

    #[test]
    fn test_suffix_collision_keeps_counting() {
        let names = strings(&["A", "A.1", "A"]);
        assert_eq!(dedupe_column_names(names), strings(&["A", "A.1", "A.2"]));
    }

    #[test]
    fn test_empty_header_cells_are_dropped() {
        let table = RawTable::from_records(
            strings(&["DIA", "", "JAB", ""]),
            vec![strings(&["1", "", "12,5", "x"])],
        )
        .drop_unnamed_columns();

        assert_eq!(table.columns(), &["DIA".to_string(), "JAB".to_string()]);
        assert_eq!(table.cell(0, 1), Some("12,5"));
    }

    #[test]
    fn test_header_cells_are_trimmed() {
        let table = RawTable::from_records(
            strings(&[" DIA ", "JAB\t", " ", " DIA"]),
            vec![strings(&["1", "2", "", "1"])],
        );
        assert_eq!(
            table.columns(),
            &strings(&["DIA", "JAB", "Unnamed: 2", "DIA.1"])
        );
        assert_eq!(table.column_index("DIA"), Some(0));
    }

    #[test]
    fn test_ragged_rows_are_padded_and_truncated() {
        let table = RawTable::from_records(
            strings(&["DIA", "JAB"]),
            vec![strings(&["1"]), strings(&["2", "3", "4"])],
        );
        assert_eq!(table.height(), 2);
        assert_eq!(table.cell(0, 1), None);
        assert_eq!(table.cell(1, 1), Some("3"));
        assert_eq!(table.width(), 2);
    }
}
