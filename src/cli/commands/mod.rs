//! Command implementations for the ridership CLI
//!
//! Each command lives in its own module:
//! - `process`: raw exports to clean datasets
//! - `analyze`: analysis battery over a clean dataset

pub mod analyze;
pub mod process;
pub mod shared;

use crate::cli::args::{Args, Commands};
use anyhow::Result;

/// Dispatch to the selected subcommand after logging is set up
pub fn run(args: Args) -> Result<()> {
    shared::setup_logging(&args.logging);
    let show_progress = !args.logging.quiet;

    match args.command {
        Commands::Process(process_args) => {
            process::run_process(process_args, show_progress)?;
        }
        Commands::Analyze(analyze_args) => analyze::run_analyze(analyze_args)?,
    }
    Ok(())
}
