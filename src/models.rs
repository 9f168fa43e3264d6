//! Core data structures and types for ridership processing.
//!
//! Defines metro line identifiers, the block layout of the raw export, the
//! intermediate long-format rows, the final [`Reading`] and the counters
//! reported for every processed file.

use crate::error::RidershipError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Metro lines known to the station lookup table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MetroLine {
    #[serde(rename = "1-AZUL")]
    Azul,
    #[serde(rename = "2-VERDE")]
    Verde,
    #[serde(rename = "3-VERMELHA")]
    Vermelha,
    #[serde(rename = "4-AMARELA")]
    Amarela,
    #[serde(rename = "15-PRATA")]
    Prata,
}

impl MetroLine {
    pub const ALL: [MetroLine; 5] = [
        MetroLine::Azul,
        MetroLine::Verde,
        MetroLine::Vermelha,
        MetroLine::Amarela,
        MetroLine::Prata,
    ];

    /// External identifier used in the output file and lookup keys
    pub fn as_str(&self) -> &'static str {
        match self {
            MetroLine::Azul => "1-AZUL",
            MetroLine::Verde => "2-VERDE",
            MetroLine::Vermelha => "3-VERMELHA",
            MetroLine::Amarela => "4-AMARELA",
            MetroLine::Prata => "15-PRATA",
        }
    }

    pub fn from_identifier(identifier: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|line| line.as_str() == identifier.trim())
    }
}

impl fmt::Display for MetroLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetroLine {
    type Err = RidershipError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_identifier(s).ok_or_else(|| RidershipError::UnknownLine {
            identifier: s.to_string(),
        })
    }
}

/// Column range of one line inside the raw export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineBlockSpec {
    /// Day-counter column opening the block (e.g. `DIA.1`)
    pub day_column: String,
    /// Total column closing the block (e.g. `TOTAL.1`)
    pub total_column: String,
    pub line: MetroLine,
}

impl LineBlockSpec {
    pub fn new(
        day_column: impl Into<String>,
        total_column: impl Into<String>,
        line: MetroLine,
    ) -> Self {
        Self {
            day_column: day_column.into(),
            total_column: total_column.into(),
            line,
        }
    }
}

/// One day × station cell of a line block, before normalization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LongRow {
    /// Raw day field of the block's own day column
    pub day: Option<String>,
    pub month_index: u32,
    /// Column name as found in the header, possibly with a `.N` suffix
    pub station_code: String,
    pub raw_value: Option<String>,
    pub line: MetroLine,
}

/// A long row whose day and flow have been validated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRow {
    pub day: u32,
    pub month_index: u32,
    pub station_code: String,
    pub flow: i64,
    pub line: MetroLine,
}

/// One normalized observation of the tidy dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reading {
    pub date: NaiveDate,
    pub line: MetroLine,
    pub station_code: String,
    pub station_name: String,
    pub flow: i64,
}

/// Rows dropped by each validation step of one file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizationStats {
    /// Long rows produced by all block extractions
    pub rows_extracted: usize,
    /// Repeated header rows leaking into the body
    pub header_rows: usize,
    /// Empty cells and sentinel dashes
    pub missing_values: usize,
    /// Values that did not parse as a finite number
    pub unparseable_values: usize,
    pub negative_values: usize,
    /// Day fields without a leading integer or outside 1..=31
    pub invalid_days: usize,
    /// Month index and day that do not form a date in the target year
    pub invalid_dates: usize,
    pub duplicate_keys: usize,
    /// Readings resolved to the unknown-station marker (kept, not dropped)
    pub unknown_stations: usize,
    pub readings_emitted: usize,
}

impl NormalizationStats {
    pub fn rows_dropped(&self) -> usize {
        self.header_rows
            + self.missing_values
            + self.unparseable_values
            + self.negative_values
            + self.invalid_days
            + self.invalid_dates
            + self.duplicate_keys
    }

    /// Share of extracted rows that became readings, as a percentage
    pub fn retention_rate(&self) -> f64 {
        if self.rows_extracted == 0 {
            0.0
        } else {
            (self.readings_emitted as f64 / self.rows_extracted as f64) * 100.0
        }
    }

    pub fn merge(&mut self, other: &NormalizationStats) {
        self.rows_extracted += other.rows_extracted;
        self.header_rows += other.header_rows;
        self.missing_values += other.missing_values;
        self.unparseable_values += other.unparseable_values;
        self.negative_values += other.negative_values;
        self.invalid_days += other.invalid_days;
        self.invalid_dates += other.invalid_dates;
        self.duplicate_keys += other.duplicate_keys;
        self.unknown_stations += other.unknown_stations;
        self.readings_emitted += other.readings_emitted;
    }
}

/// Processing statistics across all files of a run
#[derive(Debug, Default)]
pub struct ProcessingStats {
    pub files_processed: usize,
    pub files_failed: usize,
    pub total_readings: usize,
    pub normalization: NormalizationStats,
    pub output_paths: Vec<PathBuf>,
    pub processing_time_ms: u128,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_identifier_roundtrip() {
        for line in MetroLine::ALL {
            assert_eq!(line.as_str().parse::<MetroLine>().unwrap(), line);
        }
        assert_eq!(MetroLine::from_identifier(" 15-PRATA "), Some(MetroLine::Prata));
        assert!("5-LILAS".parse::<MetroLine>().is_err());
    }

    #[test]
    fn test_rows_dropped_excludes_unknown_stations() {
        let stats = NormalizationStats {
            rows_extracted: 10,
            missing_values: 2,
            invalid_days: 1,
            unknown_stations: 3,
            readings_emitted: 7,
            ..Default::default()
        };
        assert_eq!(stats.rows_dropped(), 3);
        assert!((stats.retention_rate() - 70.0).abs() < 1e-9);
    }

    #[test]
    fn test_merge_accumulates() {
        let mut total = NormalizationStats::default();
        let one = NormalizationStats {
            rows_extracted: 4,
            readings_emitted: 3,
            missing_values: 1,
            ..Default::default()
        };
        total.merge(&one);
        total.merge(&one);
        assert_eq!(total.rows_extracted, 8);
        assert_eq!(total.readings_emitted, 6);
        assert_eq!(total.missing_values, 2);
    }
}
