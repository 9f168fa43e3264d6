//! Raw export discovery.
//!
//! Yearly exports are named `passageiros_dia_<YYYY>.csv`. The year is taken
//! from the file name and files are returned in calendar order.

use crate::constants::RAW_FILE_YEAR_REGEX;
use crate::error::{Result, RidershipError};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{debug, warn};

static YEAR_IN_FILE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(RAW_FILE_YEAR_REGEX).expect("year file name pattern is valid"));

/// A raw export paired with the year it reports
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFile {
    pub path: PathBuf,
    pub year: String,
}

/// Year encoded in a raw export file name
pub fn year_from_file_name(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_str()?;
    YEAR_IN_FILE_NAME
        .captures(name)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Find raw exports matching `pattern` inside `dir`, sorted by year
pub fn discover_raw_files(dir: &Path, pattern: &str) -> Result<Vec<RawFile>> {
    if !dir.is_dir() {
        return Err(RidershipError::FileNotFound {
            path: dir.to_path_buf(),
        });
    }

    let full_pattern = dir.join(pattern);
    let full_pattern = full_pattern.to_string_lossy();
    debug!("Searching for raw exports with pattern {}", full_pattern);

    let entries = glob::glob(&full_pattern).map_err(|e| {
        RidershipError::configuration(format!("Invalid raw file pattern '{}': {}", pattern, e))
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let path = match entry {
            Ok(path) => path,
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };

        match year_from_file_name(&path) {
            Some(year) => files.push(RawFile { path, year }),
            None => debug!("Ignoring {} (no year in file name)", path.display()),
        }
    }

    files.sort_by(|a, b| a.year.cmp(&b.year).then_with(|| a.path.cmp(&b.path)));
    debug!("Found {} raw exports", files.len());

    Ok(files)
}
