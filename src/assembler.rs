//! Dataset assembly: dated, resolved, de-duplicated readings.
//!
//! This module also hosts [`parse_raw_file`], the single-file pipeline:
//! read → reconstruct months → extract blocks → normalize → resolve → assemble.

use crate::block::extract_all_blocks;
use crate::config::PipelineConfig;
use crate::error::{Result, RidershipError};
use crate::header::read_raw_report;
use crate::models::{MetroLine, NormalizationStats, NormalizedRow, Reading};
use crate::month::reconstruct_months;
use crate::normalize::normalize_rows;
use crate::stations::{is_unknown_station, resolve_station};
use chrono::NaiveDate;
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info, warn};

/// Clean readings of one raw file together with its drop counters
#[derive(Debug, Clone)]
pub struct ParsedFile {
    pub year: i32,
    pub readings: Vec<Reading>,
    pub stats: NormalizationStats,
}

/// Validate a 4-digit calendar year string
pub fn parse_year(value: &str) -> Result<i32> {
    let trimmed = value.trim();
    if trimmed.len() != 4 || !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return Err(RidershipError::InvalidYear {
            value: value.to_string(),
        });
    }
    trimmed.parse::<i32>().map_err(|_| RidershipError::InvalidYear {
        value: value.to_string(),
    })
}

/// Calendar date from a reconstructed month index and day, or `None` when
/// the pair does not exist in `year`
pub fn build_date(year: i32, month_index: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month_index, day)
}

/// Date, resolve and de-duplicate normalized rows, preserving their order.
///
/// Rows without a valid date are dropped. When a (date, line, station code)
/// key repeats, the first occurrence wins.
pub fn assemble_readings(
    rows: Vec<NormalizedRow>,
    year: i32,
    stats: &mut NormalizationStats,
) -> Vec<Reading> {
    let mut seen: HashSet<(NaiveDate, MetroLine, String)> = HashSet::new();
    let mut readings = Vec::with_capacity(rows.len());

    for row in rows {
        let Some(date) = build_date(year, row.month_index, row.day) else {
            stats.invalid_dates += 1;
            continue;
        };

        if !seen.insert((date, row.line, row.station_code.clone())) {
            stats.duplicate_keys += 1;
            continue;
        }

        let station_name = resolve_station(row.line, &row.station_code);
        if is_unknown_station(station_name) {
            stats.unknown_stations += 1;
        }

        readings.push(Reading {
            date,
            line: row.line,
            station_code: row.station_code,
            station_name: station_name.to_string(),
            flow: row.flow,
        });
    }

    if stats.invalid_dates > 0 {
        warn!(
            "Dropped {} rows whose month/day do not form a date in {}",
            stats.invalid_dates, year
        );
    }
    if stats.duplicate_keys > 0 {
        warn!(
            "Dropped {} rows repeating an existing (date, line, station) key",
            stats.duplicate_keys
        );
    }

    stats.readings_emitted += readings.len();
    readings
}

/// Run the complete single-file pipeline for one raw export and year
pub fn parse_raw_file(path: &Path, year: &str, config: &PipelineConfig) -> Result<ParsedFile> {
    let year = parse_year(year)?;
    config.validate()?;

    info!("Parsing raw report {} for year {}", path.display(), year);

    let report = read_raw_report(path, config)?;
    let primary_day = config
        .line_blocks
        .first()
        .map(|block| block.day_column.as_str())
        .unwrap_or(config.header_token.as_str());

    let months = reconstruct_months(&report.table, primary_day, path)?;
    if months.is_empty() {
        warn!(
            "No numeric day values under {} in {}",
            primary_day,
            path.display()
        );
    }
    let long_rows = extract_all_blocks(&report.table, &months, &config.line_blocks, path)?;

    let mut stats = NormalizationStats::default();
    let normalized = normalize_rows(long_rows, &config.header_token, &mut stats);
    let readings = assemble_readings(normalized, year, &mut stats);

    if stats.unknown_stations > 0 {
        let unknown_codes: Vec<String> = readings
            .iter()
            .filter(|r| is_unknown_station(&r.station_name))
            .map(|r| format!("{}:{}", r.line, r.station_code))
            .collect::<std::collections::BTreeSet<_>>()
            .into_iter()
            .collect();
        debug!("Uncatalogued station codes: {:?}", unknown_codes);
    }

    info!(
        "{}: {} readings from {} extracted rows ({} dropped, {} unknown stations)",
        year,
        stats.readings_emitted,
        stats.rows_extracted,
        stats.rows_dropped(),
        stats.unknown_stations
    );

    Ok(ParsedFile {
        year,
        readings,
        stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::UNKNOWN_STATION;

    fn row(month_index: u32, day: u32, code: &str, flow: i64) -> NormalizedRow {
        NormalizedRow {
            day,
            month_index,
            station_code: code.to_string(),
            flow,
            line: MetroLine::Azul,
        }
    }

    #[test]
    fn test_year_validation() {
        assert_eq!(parse_year("2024").unwrap(), 2024);
        assert_eq!(parse_year(" 2023 ").unwrap(), 2023);
        assert!(matches!(parse_year("24"), Err(RidershipError::InvalidYear { .. })));
        assert!(parse_year("20x4").is_err());
        assert!(parse_year("+202").is_err());
    }

    #[test]
    fn test_build_date() {
        assert_eq!(build_date(2024, 3, 5), NaiveDate::from_ymd_opt(2024, 3, 5));
        assert_eq!(build_date(2024, 2, 29), NaiveDate::from_ymd_opt(2024, 2, 29));
        assert_eq!(build_date(2023, 2, 29), None);
        assert_eq!(build_date(2024, 13, 1), None);
        assert_eq!(build_date(2024, 4, 31), None);
    }

    #[test]
    fn test_assemble_resolves_and_dates() {
        let mut stats = NormalizationStats::default();
        let readings = assemble_readings(vec![row(3, 5, "JAB", 12345)], 2024, &mut stats);

        assert_eq!(
            readings,
            vec![Reading {
                date: NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
                line: MetroLine::Azul,
                station_code: "JAB".to_string(),
                station_name: "Jabaquara".to_string(),
                flow: 12345,
            }]
        );
        assert_eq!(stats.readings_emitted, 1);
    }

    #[test]
    fn test_invalid_dates_and_duplicates_dropped() {
        let mut stats = NormalizationStats::default();
        let readings = assemble_readings(
            vec![
                row(13, 1, "JAB", 1),
                row(2, 30, "JAB", 2),
                row(1, 1, "JAB", 3),
                row(1, 1, "JAB", 4),
                row(1, 1, "ZZZ", 5),
            ],
            2024,
            &mut stats,
        );

        assert_eq!(readings.len(), 2);
        assert_eq!(readings[0].flow, 3);
        assert_eq!(readings[1].station_name, UNKNOWN_STATION);
        assert_eq!(stats.invalid_dates, 2);
        assert_eq!(stats.duplicate_keys, 1);
        assert_eq!(stats.unknown_stations, 1);
    }
}
