//! Process command implementation
//!
//! Parses one raw export (`--file/--year`) or every export found in a
//! directory, writes the clean datasets and prints a summary.

use crate::cli::args::ProcessArgs;
use crate::models::ProcessingStats;
use crate::processor::{RidershipProcessor, print_file_summary, print_run_summary};
use anyhow::{Context, Result};
use std::time::Instant;
use tracing::{debug, info};

pub fn run_process(args: ProcessArgs, show_progress: bool) -> Result<ProcessingStats> {
    let start_time = Instant::now();
    debug!("Command line arguments: {:?}", args);

    args.validate()?;
    let config = args.to_config(show_progress)?;
    let processor = RidershipProcessor::new(config)?;
    info!(
        "Writing clean datasets to {}",
        processor.config().output_dir.display()
    );

    match (&args.file, &args.year, &args.input_dir) {
        (Some(file), Some(year), _) => {
            info!("Processing single export {} for {}", file.display(), year);
            let processed = processor
                .process_file(file, year)
                .with_context(|| format!("Failed to process {}", file.display()))?;

            print_file_summary(&processed);

            let stats = ProcessingStats {
                files_processed: 1,
                files_failed: 0,
                total_readings: processed.readings.len(),
                normalization: processed.stats.clone(),
                output_paths: processed.output_path.iter().cloned().collect(),
                processing_time_ms: start_time.elapsed().as_millis(),
            };
            Ok(stats)
        }
        (_, _, Some(dir)) => {
            let historical = processor
                .process_directory(dir)
                .with_context(|| format!("Failed to process exports in {}", dir.display()))?;

            info!("Processed years {:?}", historical.year_numbers());
            for year in &historical.years {
                print_file_summary(year);
            }
            print_run_summary(&historical.stats);
            Ok(historical.stats)
        }
        _ => anyhow::bail!("Either --input <DIR> or --file <PATH> --year <YYYY> is required"),
    }
}
