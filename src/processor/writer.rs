//! Clean dataset writing and reloading.
//!
//! Readings are written as a flat comma-separated file with the canonical
//! column order. The historical file concatenates several years and adds an
//! `ano` column. Reloading parses the date column back into dates.

use crate::constants::{DATE_FORMAT, columns};
use crate::error::{Result, RidershipError};
use crate::models::{MetroLine, Reading};

use polars::prelude::{
    Column, CsvReadOptions, CsvWriter, DataFrame, DataType, IntoLazy, LazyFrame, SerReader,
    SerWriter, UnionArgs, concat, lit,
};
use std::fs::File;
use std::path::Path;
use tracing::{debug, info};

/// Build the canonical five-column frame from readings
pub fn readings_to_frame(readings: &[Reading]) -> Result<DataFrame> {
    let dates: Vec<String> = readings
        .iter()
        .map(|r| r.date.format(DATE_FORMAT).to_string())
        .collect();
    let lines: Vec<&str> = readings.iter().map(|r| r.line.as_str()).collect();
    let codes: Vec<&str> = readings.iter().map(|r| r.station_code.as_str()).collect();
    let names: Vec<&str> = readings.iter().map(|r| r.station_name.as_str()).collect();
    let flows: Vec<i64> = readings.iter().map(|r| r.flow).collect();

    let df = DataFrame::new(vec![
        Column::new(columns::DATE.into(), dates),
        Column::new(columns::LINE.into(), lines),
        Column::new(columns::STATION_CODE.into(), codes),
        Column::new(columns::STATION_NAME.into(), names),
        Column::new(columns::FLOW.into(), flows),
    ])?;

    Ok(df)
}

fn write_frame(path: &Path, df: &mut DataFrame) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut file = File::create(path)?;
    CsvWriter::new(&mut file).include_header(true).finish(df)?;

    info!("Wrote {} rows to {}", df.height(), path.display());
    Ok(())
}

/// Write one year's readings in extraction order
pub fn write_dataset(path: &Path, readings: &[Reading]) -> Result<()> {
    let mut df = readings_to_frame(readings)?;
    write_frame(path, &mut df)
}

/// Concatenate per-year readings, in the given order, into one file with a
/// trailing year column
pub fn write_historical(path: &Path, years: &[(i32, &[Reading])]) -> Result<usize> {
    if years.is_empty() {
        return Err(RidershipError::configuration(
            "Cannot write a historical dataset without any year",
        ));
    }

    let frames: Vec<LazyFrame> = years
        .iter()
        .map(|(year, readings)| {
            readings_to_frame(readings)
                .map(|df| df.lazy().with_column(lit(*year).alias(columns::YEAR)))
        })
        .collect::<Result<_>>()?;

    debug!("Concatenating {} yearly frames", frames.len());
    let mut combined = concat(frames, UnionArgs::default())?.collect()?;
    write_frame(path, &mut combined)?;

    Ok(combined.height())
}

/// Reload a clean dataset, with or without the year column
pub fn load_dataset(path: &Path) -> Result<Vec<Reading>> {
    if !path.exists() {
        return Err(RidershipError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .map_parse_options(|opts| opts.with_try_parse_dates(true))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;

    let names: Vec<&str> = df.get_column_names().into_iter().map(|n| n.as_str()).collect();
    if names.len() < columns::ORDERED.len() || names[..columns::ORDERED.len()] != *columns::ORDERED
    {
        return Err(RidershipError::InvalidDataset {
            path: path.to_path_buf(),
            reason: format!(
                "expected leading columns {:?}, found {:?}",
                columns::ORDERED,
                names
            ),
        });
    }

    let invalid = |reason: String| RidershipError::InvalidDataset {
        path: path.to_path_buf(),
        reason,
    };

    let as_text = |name: &str| -> Result<polars::prelude::Series> {
        Ok(df
            .column(name)?
            .as_materialized_series()
            .cast(&DataType::String)?)
    };

    let dates = as_text(columns::DATE)?;
    let lines = as_text(columns::LINE)?;
    let codes = as_text(columns::STATION_CODE)?;
    let names = as_text(columns::STATION_NAME)?;
    let flows = df
        .column(columns::FLOW)?
        .as_materialized_series()
        .cast(&DataType::Int64)?;

    let mut readings = Vec::with_capacity(df.height());
    for (row, ((((date, line), code), name), flow)) in dates
        .str()?
        .into_iter()
        .zip(lines.str()?)
        .zip(codes.str()?)
        .zip(names.str()?)
        .zip(flows.i64()?)
        .enumerate()
    {
        let date = date
            .and_then(|d| chrono::NaiveDate::parse_from_str(d, DATE_FORMAT).ok())
            .ok_or_else(|| invalid(format!("row {} has no valid date", row + 1)))?;
        let line = line
            .and_then(MetroLine::from_identifier)
            .ok_or_else(|| invalid(format!("row {} has an unknown line", row + 1)))?;
        let flow = flow.ok_or_else(|| invalid(format!("row {} has no flow", row + 1)))?;
        let code = code
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| invalid(format!("row {} has no station code", row + 1)))?;
        let name = name
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| invalid(format!("row {} has no station name", row + 1)))?;

        readings.push(Reading {
            date,
            line,
            station_code: code.to_string(),
            station_name: name.to_string(),
            flow,
        });
    }

    debug!("Reloaded {} readings from {}", readings.len(), path.display());
    Ok(readings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn readings() -> Vec<Reading> {
        vec![
            Reading {
                date: NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
                line: MetroLine::Azul,
                station_code: "JAB".to_string(),
                station_name: "Jabaquara".to_string(),
                flow: 12345,
            },
            Reading {
                date: NaiveDate::from_ymd_opt(2024, 3, 6).unwrap(),
                line: MetroLine::Verde,
                station_code: "CNS".to_string(),
                station_name: "Consolação".to_string(),
                flow: 0,
            },
        ]
    }

    #[test]
    fn test_frame_has_canonical_columns() {
        let df = readings_to_frame(&readings()).unwrap();
        let names: Vec<&str> = df.get_column_names().into_iter().map(|n| n.as_str()).collect();
        assert_eq!(names, columns::ORDERED);
        assert_eq!(df.height(), 2);
    }

    #[test]
    fn test_write_then_reload_preserves_readings() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("metro_2024_clean.csv");

        write_dataset(&path, &readings()).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("data,linha,sigla,estacao,fluxo\n2024-03-05,1-AZUL,JAB,Jabaquara,12345\n"));

        assert_eq!(load_dataset(&path).unwrap(), readings());
    }

    #[test]
    fn test_repeated_writes_are_identical() {
        let dir = TempDir::new().unwrap();
        let first = dir.path().join("a.csv");
        let second = dir.path().join("b.csv");

        write_dataset(&first, &readings()).unwrap();
        write_dataset(&second, &readings()).unwrap();

        assert_eq!(std::fs::read(&first).unwrap(), std::fs::read(&second).unwrap());
    }

    #[test]
    fn test_historical_adds_year_column() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hist.csv");
        let data = readings();

        let rows = write_historical(&path, &[(2023, &data[..1]), (2024, &data[1..])]).unwrap();
        assert_eq!(rows, 2);

        let content = std::fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next(), Some("data,linha,sigla,estacao,fluxo,ano"));
        assert!(lines.next().unwrap().ends_with(",2023"));

        assert_eq!(load_dataset(&path).unwrap(), data);
    }

    #[test]
    fn test_reload_rejects_blank_station_fields() {
        let dir = TempDir::new().unwrap();
        let blank_code = dir.path().join("blank_code.csv");
        std::fs::write(
            &blank_code,
            "data,linha,sigla,estacao,fluxo\n2024-03-05,1-AZUL,JAB,Jabaquara,10\n2024-03-06,1-AZUL,,Jabaquara,12\n",
        )
        .unwrap();
        let blank_name = dir.path().join("blank_name.csv");
        std::fs::write(
            &blank_name,
            "data,linha,sigla,estacao,fluxo\n2024-03-05,1-AZUL,JAB,,10\n",
        )
        .unwrap();

        for path in [blank_code, blank_name] {
            assert!(matches!(
                load_dataset(&path),
                Err(RidershipError::InvalidDataset { .. })
            ));
        }
    }

    #[test]
    fn test_reload_rejects_foreign_layout() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("other.csv");
        std::fs::write(&path, "a,b\n1,2\n").unwrap();

        assert!(matches!(
            load_dataset(&path),
            Err(RidershipError::InvalidDataset { .. })
        ));
    }
}
