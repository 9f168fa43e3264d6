//! Value normalization of long rows.
//!
//! Raw cells hold passenger counts in thousands with a decimal comma
//! (`"12,345"`), a lone dash when nothing was reported, and occasional
//! junk from hand edits. Rows that cannot yield a non-negative count or a
//! day of month are dropped and counted; nothing is defaulted to zero.

use crate::constants::{FLOW_MULTIPLIER, MAX_DAY, MIN_DAY, SENTINEL_DASH};
use crate::models::{LongRow, NormalizationStats, NormalizedRow};
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

static REPETITION_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.\d+$").expect("repetition suffix pattern is valid"));

/// Why a long row did not become a normalized row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowRejection {
    HeaderRow,
    MissingValue,
    UnparseableValue,
    NegativeValue,
    InvalidDay,
}

impl RowRejection {
    fn record(&self, stats: &mut NormalizationStats) {
        match self {
            RowRejection::HeaderRow => stats.header_rows += 1,
            RowRejection::MissingValue => stats.missing_values += 1,
            RowRejection::UnparseableValue => stats.unparseable_values += 1,
            RowRejection::NegativeValue => stats.negative_values += 1,
            RowRejection::InvalidDay => stats.invalid_days += 1,
        }
    }
}

/// Trim a station code and drop the `.N` suffix added to repeated column names
pub fn clean_station_code(raw: &str) -> String {
    REPETITION_SUFFIX.replace(raw.trim(), "").trim().to_string()
}

/// Convert a raw cell into a passenger count
pub fn parse_flow(raw: Option<&str>) -> std::result::Result<i64, RowRejection> {
    let value = match raw.map(str::trim) {
        None | Some("") => return Err(RowRejection::MissingValue),
        Some(v) if v == SENTINEL_DASH => return Err(RowRejection::MissingValue),
        Some(v) => v,
    };

    let thousands = value
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or(RowRejection::UnparseableValue)?;

    let passengers = (thousands * FLOW_MULTIPLIER).round_ties_even();
    if passengers < 0.0 {
        return Err(RowRejection::NegativeValue);
    }

    Ok(passengers as i64)
}

/// Leading integer run of a day field, if it is a valid day of month
pub fn parse_day(raw: Option<&str>) -> Option<u32> {
    let trimmed = raw?.trim();
    let digits_end = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());

    trimmed[..digits_end]
        .parse::<u32>()
        .ok()
        .filter(|day| (MIN_DAY..=MAX_DAY).contains(day))
}

/// Validate a single long row
pub fn normalize_row(
    row: LongRow,
    header_token: &str,
) -> std::result::Result<NormalizedRow, RowRejection> {
    if row.day.as_deref().map(str::trim) == Some(header_token) {
        return Err(RowRejection::HeaderRow);
    }

    let flow = parse_flow(row.raw_value.as_deref())?;
    let day = parse_day(row.day.as_deref()).ok_or(RowRejection::InvalidDay)?;

    Ok(NormalizedRow {
        day,
        month_index: row.month_index,
        station_code: clean_station_code(&row.station_code),
        flow,
        line: row.line,
    })
}

/// Normalize the concatenated long rows of all blocks, preserving order
pub fn normalize_rows(
    rows: Vec<LongRow>,
    header_token: &str,
    stats: &mut NormalizationStats,
) -> Vec<NormalizedRow> {
    stats.rows_extracted += rows.len();

    let normalized: Vec<NormalizedRow> = rows
        .into_iter()
        .filter_map(|row| match normalize_row(row, header_token) {
            Ok(normalized) => Some(normalized),
            Err(rejection) => {
                rejection.record(stats);
                None
            }
        })
        .collect();

    debug!(
        "Normalized {} rows: {} missing, {} unparseable, {} negative, {} invalid days, {} header rows",
        normalized.len(),
        stats.missing_values,
        stats.unparseable_values,
        stats.negative_values,
        stats.invalid_days,
        stats.header_rows
    );

    normalized
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MetroLine;

    fn long_row(day: &str, code: &str, value: Option<&str>) -> LongRow {
        LongRow {
            day: Some(day.to_string()),
            month_index: 3,
            station_code: code.to_string(),
            raw_value: value.map(str::to_string),
            line: MetroLine::Azul,
        }
    }

    #[test]
    fn test_decimal_comma_in_thousands() {
        assert_eq!(parse_flow(Some("12,345")), Ok(12345));
        assert_eq!(parse_flow(Some(" 0,5 ")), Ok(500));
        assert_eq!(parse_flow(Some("7")), Ok(7000));
    }

    #[test]
    fn test_sentinel_and_empty_are_missing() {
        assert_eq!(parse_flow(Some("-")), Err(RowRejection::MissingValue));
        assert_eq!(parse_flow(Some("  ")), Err(RowRejection::MissingValue));
        assert_eq!(parse_flow(None), Err(RowRejection::MissingValue));
    }

    #[test]
    fn test_garbage_and_negative_values() {
        assert_eq!(parse_flow(Some("n/d")), Err(RowRejection::UnparseableValue));
        assert_eq!(parse_flow(Some("1.234,5")), Err(RowRejection::UnparseableValue));
        assert_eq!(parse_flow(Some("inf")), Err(RowRejection::UnparseableValue));
        assert_eq!(parse_flow(Some("-1,5")), Err(RowRejection::NegativeValue));
    }

    #[test]
    fn test_rounding_to_whole_passengers() {
        assert_eq!(parse_flow(Some("1,2344")), Ok(1234));
        assert_eq!(parse_flow(Some("1,2346")), Ok(1235));
    }

    #[test]
    fn test_day_leading_integer_run() {
        assert_eq!(parse_day(Some("5")), Some(5));
        assert_eq!(parse_day(Some("05.0")), Some(5));
        assert_eq!(parse_day(Some("12*")), Some(12));
        assert_eq!(parse_day(Some("0")), None);
        assert_eq!(parse_day(Some("32")), None);
        assert_eq!(parse_day(Some("x1")), None);
        assert_eq!(parse_day(None), None);
    }

    #[test]
    fn test_station_code_suffix_stripped() {
        assert_eq!(clean_station_code(" PSO.1 "), "PSO");
        assert_eq!(clean_station_code("ANR.12"), "ANR");
        assert_eq!(clean_station_code("JAB"), "JAB");
        assert_eq!(clean_station_code("A.B"), "A.B");
    }

    #[test]
    fn test_normalize_rows_counts_rejections() {
        let rows = vec![
            long_row("5", "JAB", Some("12,345")),
            long_row("6", "JAB", Some("-")),
            long_row("DIA", "JAB", Some("JAB")),
            long_row("40", "JAB", Some("1,0")),
            long_row("7", "CON.1", Some("abc")),
        ];

        let mut stats = NormalizationStats::default();
        let normalized = normalize_rows(rows, "DIA", &mut stats);

        assert_eq!(
            normalized,
            vec![NormalizedRow {
                day: 5,
                month_index: 3,
                station_code: "JAB".to_string(),
                flow: 12345,
                line: MetroLine::Azul,
            }]
        );
        assert_eq!(stats.rows_extracted, 5);
        assert_eq!(stats.missing_values, 1);
        assert_eq!(stats.header_rows, 1);
        assert_eq!(stats.invalid_days, 1);
        assert_eq!(stats.unparseable_values, 1);
    }
}
