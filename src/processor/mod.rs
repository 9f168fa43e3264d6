//! Batch processing engine.
//!
//! Orchestrates the per-year pipeline over one or several raw exports,
//! writes the clean per-year files and the concatenated historical file,
//! and reports a summary of what was kept and dropped.

pub mod discovery;
pub mod writer;

#[cfg(test)]
pub mod tests;

use self::discovery::{RawFile, discover_raw_files};
use self::writer::{write_dataset, write_historical};

use crate::assembler::parse_raw_file;
use crate::config::PipelineConfig;
use crate::constants::{clean_file_name, historical_file_name};
use crate::error::{Result, RidershipError};
use crate::models::{NormalizationStats, ProcessingStats, Reading};

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{error, info};

/// Clean dataset of one year
#[derive(Debug, Clone)]
pub struct ProcessedFile {
    pub year: i32,
    pub source: PathBuf,
    pub readings: Vec<Reading>,
    pub stats: NormalizationStats,
    /// Per-year clean file, when written
    pub output_path: Option<PathBuf>,
}

/// Several years processed together, in input order
#[derive(Debug)]
pub struct HistoricalDataset {
    pub years: Vec<ProcessedFile>,
    /// Concatenated file with the year column, when written
    pub output_path: Option<PathBuf>,
    pub stats: ProcessingStats,
}

impl HistoricalDataset {
    pub fn year_numbers(&self) -> Vec<i32> {
        self.years.iter().map(|y| y.year).collect()
    }
}

/// Main processor for raw ridership exports
#[derive(Debug, Clone)]
pub struct RidershipProcessor {
    config: PipelineConfig,
}

impl RidershipProcessor {
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Parse one raw export and, if enabled, write its clean file
    pub fn process_file(&self, path: &Path, year: &str) -> Result<ProcessedFile> {
        let parsed = parse_raw_file(path, year, &self.config)?;

        let output_path = if self.config.write_per_year {
            let output = self.config.output_dir.join(clean_file_name(parsed.year));
            write_dataset(&output, &parsed.readings)?;
            Some(output)
        } else {
            None
        };

        Ok(ProcessedFile {
            year: parsed.year,
            source: path.to_path_buf(),
            readings: parsed.readings,
            stats: parsed.stats,
            output_path,
        })
    }

    /// Process several exports in the given order and write the historical
    /// file.
    ///
    /// A file that fails is logged and counted; the run fails only when no
    /// file could be processed.
    pub fn process_years(&self, inputs: &[RawFile]) -> Result<HistoricalDataset> {
        let start_time = Instant::now();

        if inputs.is_empty() {
            return Err(RidershipError::configuration("No raw exports to process"));
        }

        let progress = self.progress_bar(inputs.len());
        let mut stats = ProcessingStats::default();
        let mut years = Vec::with_capacity(inputs.len());
        let mut first_error = None;

        for input in inputs {
            if let Some(pb) = &progress {
                pb.set_message(format!("Processing {}", input.year));
            }

            match self.process_file(&input.path, &input.year) {
                Ok(processed) => {
                    stats.files_processed += 1;
                    stats.total_readings += processed.readings.len();
                    stats.normalization.merge(&processed.stats);
                    stats.output_paths.extend(processed.output_path.clone());
                    years.push(processed);
                }
                Err(e) => {
                    error!("Failed to process {}: {}", input.path.display(), e);
                    stats.files_failed += 1;
                    first_error.get_or_insert(e);
                }
            }

            if let Some(pb) = &progress {
                pb.inc(1);
            }
        }

        if let Some(pb) = progress {
            pb.finish_with_message("Done");
        }

        if years.is_empty() {
            return Err(first_error
                .unwrap_or_else(|| RidershipError::configuration("No raw exports processed")));
        }

        let year_numbers: Vec<i32> = years.iter().map(|y| y.year).collect();
        let output = self
            .config
            .output_dir
            .join(historical_file_name(&year_numbers));
        let per_year: Vec<(i32, &[Reading])> = years
            .iter()
            .map(|y| (y.year, y.readings.as_slice()))
            .collect();
        write_historical(&output, &per_year)?;
        info!("Historical dataset written to {}", output.display());
        stats.output_paths.push(output.clone());

        stats.processing_time_ms = start_time.elapsed().as_millis();

        Ok(HistoricalDataset {
            years,
            output_path: Some(output),
            stats,
        })
    }

    /// Discover every raw export in `dir` and process them by year
    pub fn process_directory(&self, dir: &Path) -> Result<HistoricalDataset> {
        let inputs = discover_raw_files(dir, &self.config.raw_file_pattern)?;
        info!("Discovered {} raw exports in {}", inputs.len(), dir.display());
        self.process_years(&inputs)
    }

    fn progress_bar(&self, total: usize) -> Option<ProgressBar> {
        if !self.config.show_progress || total < 2 {
            return None;
        }

        let pb = ProgressBar::new(total as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        Some(pb)
    }
}

/// Print the normalization report of one year
pub fn print_file_summary(file: &ProcessedFile) {
    let stats = &file.stats;
    println!(
        "\n{} {}",
        "Year".bright_green().bold(),
        file.year.to_string().bright_white().bold()
    );
    println!("  {} {}", "Source:".bright_cyan(), file.source.display());
    println!(
        "  {} {}",
        "Readings:".bright_cyan(),
        stats.readings_emitted.to_string().bright_white().bold()
    );
    println!(
        "  {} {} of {} ({:.1}% retained)",
        "Dropped:".bright_cyan(),
        stats.rows_dropped(),
        stats.rows_extracted,
        stats.retention_rate()
    );
    println!(
        "    missing {} | unparseable {} | negative {} | invalid day {} | invalid date {} | duplicate {} | header {}",
        stats.missing_values,
        stats.unparseable_values,
        stats.negative_values,
        stats.invalid_days,
        stats.invalid_dates,
        stats.duplicate_keys,
        stats.header_rows
    );
    if stats.unknown_stations > 0 {
        println!(
            "  {} {}",
            "Unknown stations:".bright_yellow(),
            stats.unknown_stations.to_string().bright_yellow().bold()
        );
    }
    if let Some(path) = &file.output_path {
        println!("  {} {}", "Output:".bright_cyan(), path.display());
    }
}

/// Print the summary of a multi-year run
pub fn print_run_summary(stats: &ProcessingStats) {
    println!("\n{}", "Processing Summary".bright_green().bold());
    println!(
        "  {} {}ms",
        "Time elapsed:".bright_cyan(),
        stats.processing_time_ms.to_string().bright_white()
    );
    println!(
        "  {} {}",
        "Files processed:".bright_cyan(),
        stats.files_processed.to_string().bright_white()
    );
    if stats.files_failed > 0 {
        println!(
            "  {} {}",
            "Files failed:".bright_red(),
            stats.files_failed.to_string().bright_red().bold()
        );
    }
    println!(
        "  {} {}",
        "Total readings:".bright_cyan(),
        stats.total_readings.to_string().bright_white().bold()
    );
    for path in &stats.output_paths {
        println!("  {} {}", "Wrote:".bright_cyan(), path.display());
    }
}
