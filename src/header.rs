//! Raw report reading and header detection.
//!
//! Operator exports start with an arbitrary banner (titles, notes, blank
//! rows) before the real header row, whose first field is the day token.
//! The file is decoded with the configured legacy encoding, the header row is
//! located, and everything from it onwards is loaded as a delimited table.

use crate::config::PipelineConfig;
use crate::error::{Result, RidershipError};
use crate::raw_table::RawTable;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// A raw export loaded from disk
#[derive(Debug, Clone)]
pub struct RawReport {
    pub path: PathBuf,
    /// Zero-based line number of the header row
    pub header_line: usize,
    pub table: RawTable,
}

/// Find the line whose first field equals `token`, returning its line number
/// and byte offset within `content`
pub fn locate_header(content: &str, token: &str, delimiter: u8) -> Option<(usize, usize)> {
    let delimiter = char::from(delimiter);
    let mut offset = 0usize;

    for (line_num, line) in content.split_inclusive('\n').enumerate() {
        let first_field = line.trim().split(delimiter).next().unwrap_or("").trim();
        if first_field == token {
            return Some((line_num, offset));
        }
        offset += line.len();
    }

    None
}

/// Load a raw export as a [`RawTable`] starting at its header row
pub fn read_raw_report(path: &Path, config: &PipelineConfig) -> Result<RawReport> {
    if !path.exists() {
        return Err(RidershipError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let bytes = std::fs::read(path)?;
    let content = config.encoding.decode(&bytes);
    parse_raw_content(&content, path, config)
}

/// Parse already-decoded export content; `path` is used for error context
pub fn parse_raw_content(content: &str, path: &Path, config: &PipelineConfig) -> Result<RawReport> {
    let (header_line, offset) = locate_header(content, &config.header_token, config.delimiter)
        .ok_or_else(|| RidershipError::HeaderNotFound {
            path: path.to_path_buf(),
            token: config.header_token.clone(),
        })?;

    debug!(
        "Header row found at line {} of {}",
        header_line + 1,
        path.display()
    );

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(config.delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content[offset..].as_bytes());

    let mut records = reader.records();
    let header = match records.next() {
        Some(record) => record?.iter().map(str::to_string).collect::<Vec<_>>(),
        None => {
            return Err(RidershipError::HeaderNotFound {
                path: path.to_path_buf(),
                token: config.header_token.clone(),
            });
        }
    };

    let mut body = Vec::new();
    for record in records {
        let record = record?;
        body.push(record.iter().map(str::to_string).collect::<Vec<_>>());
    }

    let table = RawTable::from_records(header, body).drop_unnamed_columns();

    info!(
        "Loaded {} rows x {} columns from {}",
        table.height(),
        table.width(),
        path.display()
    );
    debug!("Columns detected: {:?}", table.columns());

    Ok(RawReport {
        path: path.to_path_buf(),
        header_line,
        table,
    })
}
