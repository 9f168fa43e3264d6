//! Processor tests over synthetic raw exports
//!
//! Fixtures mimic the operator export: a latin-1 banner, a header row with
//! four repeating line blocks and a trailing empty column.

pub mod basic_processing;
pub mod error_handling;

use crate::config::PipelineConfig;
use std::path::{Path, PathBuf};

pub const FIXTURE_HEADER: &str =
    "DIA;JAB;PSE;TOTAL;DIA;TRI;CNS;TOTAL;DIA;ITQ;PSE;TOTAL;DIA;VPM;XYZ;TOTAL;";

pub const FIXTURE_BODY: &[&str] = &[
    "30;1,0;2,0;3,0;30;4,0;5,0;9,0;30;6,0;7,0;13,0;30;8,0;9,0;17,0;",
    "31;1,5;-;1,5;31;4,5;5,5;10,0;31;6,5;7,5;14,0;31;8,5;9,5;18,0;",
    "1;2,0;2,5;4,5;1;4,0;5,0;9,0;1;6,0;7,0;13,0;1;8,0;9,0;17,0;",
    "2;2,2;2,6;4,8;2;4,1;5,1;9,2;2;6,1;7,1;13,2;2;8,1;9,1;17,2;",
    "TOTAL;6,7;7,1;13,8;;;;;;;;;;;;;",
];

/// Encode text as ISO-8859-1 bytes
pub fn latin1(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(c).expect("fixture text fits in latin-1"))
        .collect()
}

pub fn fixture_content() -> String {
    let mut content = String::from("Relatório de Passageiros Transportados;;;\nMédia por dia útil;;;\n;;;\n");
    content.push_str(FIXTURE_HEADER);
    content.push('\n');
    for row in FIXTURE_BODY {
        content.push_str(row);
        content.push('\n');
    }
    content
}

/// Write a raw export for `year` into `dir`
pub fn write_fixture(dir: &Path, year: i32) -> PathBuf {
    let path = dir.join(format!("passageiros_dia_{}.csv", year));
    std::fs::write(&path, latin1(&fixture_content())).unwrap();
    path
}

pub fn test_config(output_dir: &Path) -> PipelineConfig {
    PipelineConfig::default()
        .with_output_dir(output_dir)
        .without_progress()
}
