//! Metro Ridership Library
//!
//! Turns the operator's semicolon-delimited daily ridership exports into a
//! tidy `(date, line, station, flow)` series and compares a fixed station
//! cluster against the rest of the network.
//!
//! This library provides tools for:
//! - Locating the header row behind an arbitrary banner and decoding legacy text
//! - Reconstructing months from day-counter resets
//! - Reshaping per-line column blocks into long rows
//! - Normalizing values in thousands with a decimal comma, counting every drop
//! - Resolving station codes through static per-line tables
//! - Writing and reloading clean datasets
//! - Descriptive, inferential and temporal comparisons of the station cluster

pub mod assembler;
pub mod block;
pub mod config;
pub mod constants;
pub mod error;
pub mod header;
pub mod models;
pub mod month;
pub mod normalize;
pub mod processor;
pub mod raw_table;
pub mod stations;

pub mod analysis;

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use assembler::{ParsedFile, parse_raw_file};
pub use config::{PipelineConfig, RawEncoding};
pub use error::{Result, RidershipError};
pub use models::{LineBlockSpec, MetroLine, NormalizationStats, Reading};
pub use processor::writer::{load_dataset, write_dataset, write_historical};
pub use processor::{HistoricalDataset, ProcessedFile, RidershipProcessor};
pub use stations::{cluster_flag, resolve_station};
