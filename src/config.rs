//! Configuration management and validation.
//!
//! Holds the raw export conventions (encoding, delimiter, header token), the
//! block layout mapping column groups to metro lines, and output settings.

use crate::constants::{
    DEFAULT_OUTPUT_DIR, HEADER_TOKEN, RAW_DELIMITER, RAW_FILE_PATTERN, TOTAL_TOKEN,
};
use crate::error::{Result, RidershipError};
use crate::models::{LineBlockSpec, MetroLine};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;
use std::str::FromStr;

/// Text encoding of the raw export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RawEncoding {
    /// ISO-8859-1, used by every historical export
    Latin1,
    /// UTF-8, invalid sequences replaced
    Utf8,
}

impl RawEncoding {
    pub fn decode(&self, bytes: &[u8]) -> String {
        match self {
            // Every latin-1 byte is the code point of the same value
            RawEncoding::Latin1 => bytes.iter().map(|&b| char::from(b)).collect(),
            RawEncoding::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
        }
    }
}

impl FromStr for RawEncoding {
    type Err = RidershipError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "latin1" | "iso88591" => Ok(RawEncoding::Latin1),
            "utf8" => Ok(RawEncoding::Utf8),
            other => Err(RidershipError::configuration(format!(
                "Unsupported encoding '{}' (expected latin1 or utf8)",
                other
            ))),
        }
    }
}

/// Global configuration for ridership processing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Text encoding of raw exports
    pub encoding: RawEncoding,

    /// Field delimiter of raw exports
    pub delimiter: u8,

    /// First field of the header row
    pub header_token: String,

    /// Column groups to extract, one per metro line, in output order
    pub line_blocks: Vec<LineBlockSpec>,

    /// Directory receiving clean datasets
    pub output_dir: PathBuf,

    /// Glob pattern for raw exports inside an input directory
    pub raw_file_pattern: String,

    /// Write one clean file per processed year
    pub write_per_year: bool,

    /// Show progress bars while processing several years
    pub show_progress: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            encoding: RawEncoding::Latin1,
            delimiter: RAW_DELIMITER,
            header_token: HEADER_TOKEN.to_string(),
            line_blocks: default_line_blocks(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            raw_file_pattern: RAW_FILE_PATTERN.to_string(),
            write_per_year: true,
            show_progress: true,
        }
    }
}

/// Block layout of the operator export: the four lines it reports, each
/// group's columns suffixed by its occurrence index
pub fn default_line_blocks() -> Vec<LineBlockSpec> {
    let occurrence = |token: &str, index: usize| match index {
        0 => token.to_string(),
        n => format!("{}.{}", token, n),
    };

    [
        MetroLine::Azul,
        MetroLine::Verde,
        MetroLine::Vermelha,
        MetroLine::Prata,
    ]
    .into_iter()
    .enumerate()
    .map(|(i, line)| LineBlockSpec::new(occurrence(HEADER_TOKEN, i), occurrence(TOTAL_TOKEN, i), line))
    .collect()
}

impl PipelineConfig {
    pub fn with_encoding(mut self, encoding: RawEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    pub fn with_line_blocks(mut self, line_blocks: Vec<LineBlockSpec>) -> Self {
        self.line_blocks = line_blocks;
        self
    }

    pub fn without_per_year_output(mut self) -> Self {
        self.write_per_year = false;
        self
    }

    pub fn without_progress(mut self) -> Self {
        self.show_progress = false;
        self
    }

    /// Reject layouts that can never match a raw export
    pub fn validate(&self) -> Result<()> {
        if self.line_blocks.is_empty() {
            return Err(RidershipError::configuration(
                "At least one line block must be configured",
            ));
        }
        if self.header_token.trim().is_empty() {
            return Err(RidershipError::configuration("Header token must not be empty"));
        }

        let mut seen_lines = HashSet::new();
        for block in &self.line_blocks {
            if block.day_column == block.total_column {
                return Err(RidershipError::configuration(format!(
                    "Line {} uses '{}' as both day and total column",
                    block.line, block.day_column
                )));
            }
            if !seen_lines.insert(block.line) {
                return Err(RidershipError::configuration(format!(
                    "Line {} is configured more than once",
                    block.line
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout_is_valid() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.line_blocks.len(), 4);
        assert_eq!(config.line_blocks[3].line, MetroLine::Prata);
        assert_eq!(config.line_blocks[0].day_column, "DIA");
        assert_eq!(config.line_blocks[2].total_column, "TOTAL.2");
        assert_eq!(config.encoding, RawEncoding::Latin1);
    }

    #[test]
    fn test_duplicate_line_rejected() {
        let config = PipelineConfig::default().with_line_blocks(vec![
            LineBlockSpec::new("DIA", "TOTAL", MetroLine::Azul),
            LineBlockSpec::new("DIA.1", "TOTAL.1", MetroLine::Azul),
        ]);
        assert!(config.validate().unwrap_err().is_configuration_error());
    }

    #[test]
    fn test_latin1_decoding() {
        let bytes = [b'S', 0xE9, b';', b'C', b'o', b'n', b'c', b'e', b'i', 0xE7, 0xE3, b'o'];
        assert_eq!(RawEncoding::Latin1.decode(&bytes), "Sé;Conceição");
    }

    #[test]
    fn test_encoding_parsing() {
        assert_eq!("latin-1".parse::<RawEncoding>().unwrap(), RawEncoding::Latin1);
        assert_eq!("ISO-8859-1".parse::<RawEncoding>().unwrap(), RawEncoding::Latin1);
        assert_eq!("UTF8".parse::<RawEncoding>().unwrap(), RawEncoding::Utf8);
        assert!("cp1252".parse::<RawEncoding>().is_err());
    }
}
