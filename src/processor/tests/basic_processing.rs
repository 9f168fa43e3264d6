//! Single-file processing tests

use super::{test_config, write_fixture};
use crate::constants::UNKNOWN_STATION;
use crate::models::MetroLine;
use crate::processor::RidershipProcessor;
use crate::processor::writer::load_dataset;
use chrono::NaiveDate;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_single_file_pipeline() {
    let temp_dir = TempDir::new().unwrap();
    let raw = write_fixture(temp_dir.path(), 2024);
    let output_dir = temp_dir.path().join("processed");

    let processor = RidershipProcessor::new(test_config(&output_dir)).unwrap();
    let processed = processor.process_file(&raw, "2024").unwrap();

    // 4 blocks x 2 stations x 4 days, one sentinel dash
    assert_eq!(processed.stats.rows_extracted, 32);
    assert_eq!(processed.stats.missing_values, 1);
    assert_eq!(processed.readings.len(), 31);
    assert_eq!(processed.stats.unknown_stations, 4);

    let first = &processed.readings[0];
    assert_eq!(first.date, NaiveDate::from_ymd_opt(2024, 1, 30).unwrap());
    assert_eq!(first.line, MetroLine::Azul);
    assert_eq!(first.station_name, "Jabaquara");
    assert_eq!(first.flow, 1000);

    let february: Vec<_> = processed
        .readings
        .iter()
        .filter(|r| r.date == NaiveDate::from_ymd_opt(2024, 2, 2).unwrap())
        .collect();
    assert_eq!(february.len(), 8);

    // Repeated column name on line 3 loses its suffix
    assert!(
        processed
            .readings
            .iter()
            .any(|r| r.line == MetroLine::Vermelha && r.station_code == "PSE" && r.station_name == "Sé")
    );
    assert!(
        processed
            .readings
            .iter()
            .filter(|r| r.station_code == "XYZ")
            .all(|r| r.station_name == UNKNOWN_STATION)
    );

    let output = processed.output_path.clone().unwrap();
    assert_eq!(output, output_dir.join("metro_2024_clean.csv"));
    assert_eq!(load_dataset(&output).unwrap(), processed.readings);
}

#[test]
fn test_every_reading_is_valid() {
    let temp_dir = TempDir::new().unwrap();
    let raw = write_fixture(temp_dir.path(), 2023);

    let processor = RidershipProcessor::new(test_config(temp_dir.path())).unwrap();
    let processed = processor.process_file(&raw, "2023").unwrap();

    assert!(processed.readings.iter().all(|r| r.flow >= 0));
    assert!(processed.readings.iter().all(|r| r.date.format("%Y").to_string() == "2023"));
}

#[test]
fn test_runs_are_byte_identical() {
    let temp_dir = TempDir::new().unwrap();
    let raw = write_fixture(temp_dir.path(), 2024);

    let first_dir = temp_dir.path().join("first");
    let second_dir = temp_dir.path().join("second");

    let first = RidershipProcessor::new(test_config(&first_dir))
        .unwrap()
        .process_file(&raw, "2024")
        .unwrap();
    let second = RidershipProcessor::new(test_config(&second_dir))
        .unwrap()
        .process_file(&raw, "2024")
        .unwrap();

    assert_eq!(
        fs::read(first.output_path.unwrap()).unwrap(),
        fs::read(second.output_path.unwrap()).unwrap()
    );
}

#[test]
fn test_per_year_output_can_be_disabled() {
    let temp_dir = TempDir::new().unwrap();
    let raw = write_fixture(temp_dir.path(), 2024);
    let output_dir = temp_dir.path().join("out");

    let config = test_config(&output_dir).without_per_year_output();
    let processed = RidershipProcessor::new(config)
        .unwrap()
        .process_file(&raw, "2024")
        .unwrap();

    assert!(processed.output_path.is_none());
    assert!(!output_dir.exists());
}
