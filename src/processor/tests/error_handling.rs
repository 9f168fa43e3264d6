//! Error handling tests

use super::{FIXTURE_BODY, latin1, test_config, write_fixture};
use crate::error::RidershipError;
use crate::models::{LineBlockSpec, MetroLine};
use crate::processor::RidershipProcessor;
use crate::processor::discovery::RawFile;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_nonexistent_raw_file() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("passageiros_dia_2024.csv");

    let processor = RidershipProcessor::new(test_config(temp_dir.path())).unwrap();
    match processor.process_file(&missing, "2024").unwrap_err() {
        RidershipError::FileNotFound { path } => assert_eq!(path, missing),
        other => panic!("Expected FileNotFound, got {:?}", other),
    }
}

#[test]
fn test_missing_header_token() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("passageiros_dia_2024.csv");
    fs::write(&path, latin1("Relatório;;\nsem cabeçalho;;\n1;2;3\n")).unwrap();

    let processor = RidershipProcessor::new(test_config(temp_dir.path())).unwrap();
    let err = processor.process_file(&path, "2024").unwrap_err();

    assert!(matches!(err, RidershipError::HeaderNotFound { ref token, .. } if token == "DIA"));
    assert!(err.is_configuration_error());
}

#[test]
fn test_missing_block_column() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("passageiros_dia_2024.csv");
    let mut content = String::from("DIA;JAB;TOTAL;DIA;TRI;TOTAL;\n");
    content.push_str("1;1,0;1,0;1;2,0;2,0;\n");
    fs::write(&path, latin1(&content)).unwrap();

    let processor = RidershipProcessor::new(test_config(temp_dir.path())).unwrap();
    let err = processor.process_file(&path, "2024").unwrap_err();

    assert!(matches!(err, RidershipError::MissingColumn { ref column, .. } if column == "DIA.2"));
}

#[test]
fn test_malformed_year() {
    let temp_dir = TempDir::new().unwrap();
    let raw = write_fixture(temp_dir.path(), 2024);

    let processor = RidershipProcessor::new(test_config(temp_dir.path())).unwrap();
    assert!(matches!(
        processor.process_file(&raw, "24").unwrap_err(),
        RidershipError::InvalidYear { .. }
    ));
}

#[test]
fn test_invalid_layout_rejected_up_front() {
    let temp_dir = TempDir::new().unwrap();
    let config = test_config(temp_dir.path()).with_line_blocks(vec![]);
    assert!(RidershipProcessor::new(config).is_err());

    let config = test_config(temp_dir.path())
        .with_line_blocks(vec![LineBlockSpec::new("DIA", "DIA", MetroLine::Azul)]);
    assert!(RidershipProcessor::new(config).unwrap_err().is_configuration_error());
}

#[test]
fn test_failed_year_does_not_abort_batch() {
    let temp_dir = TempDir::new().unwrap();
    let good = write_fixture(temp_dir.path(), 2023);
    let bad = temp_dir.path().join("passageiros_dia_2024.csv");
    fs::write(&bad, latin1(&FIXTURE_BODY.join("\n"))).unwrap();

    let processor = RidershipProcessor::new(test_config(&temp_dir.path().join("out"))).unwrap();
    let historical = processor
        .process_years(&[
            RawFile {
                path: good,
                year: "2023".to_string(),
            },
            RawFile {
                path: bad,
                year: "2024".to_string(),
            },
        ])
        .unwrap();

    assert_eq!(historical.stats.files_processed, 1);
    assert_eq!(historical.stats.files_failed, 1);
    assert_eq!(historical.year_numbers(), vec![2023]);
}

#[test]
fn test_empty_batch_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let processor = RidershipProcessor::new(test_config(temp_dir.path())).unwrap();
    assert!(processor.process_years(&[]).is_err());
}
