//! Command-line argument definitions
//!
//! Defines the CLI interface using the clap derive API. Flags override the
//! defaults of [`PipelineConfig`].

use crate::config::{PipelineConfig, RawEncoding};
use crate::error::{Result, RidershipError};
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

/// CLI arguments for the ridership processor
///
/// Normalizes semicolon-delimited subway ridership exports into a tidy daily
/// series and runs the cluster comparison on the result.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "metro-ridership",
    version,
    about = "Normalize subway ridership exports and compare a station cluster against the network"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub logging: LoggingArgs,
}

/// Available subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Parse raw yearly exports into clean datasets
    Process(ProcessArgs),
    /// Print the analysis battery for a clean dataset
    Analyze(AnalyzeArgs),
}

/// Verbosity flags shared by every command
#[derive(Debug, Clone, Default, ClapArgs)]
pub struct LoggingArgs {
    /// Increase logging verbosity (-v: debug, -vv: trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only show warnings and errors
    #[arg(short = 'q', long = "quiet", global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl LoggingArgs {
    /// Log level implied by the verbosity flags
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "warn"
        } else {
            match self.verbose {
                0 => "info",
                1 => "debug",
                _ => "trace",
            }
        }
    }
}

/// Arguments for the process command
#[derive(Debug, Clone, Parser)]
pub struct ProcessArgs {
    /// Directory holding passageiros_dia_<YYYY>.csv exports
    #[arg(
        short = 'i',
        long = "input",
        value_name = "DIR",
        conflicts_with = "file"
    )]
    pub input_dir: Option<PathBuf>,

    /// A single raw export to process (requires --year)
    #[arg(short = 'f', long = "file", value_name = "PATH", requires = "year")]
    pub file: Option<PathBuf>,

    /// Calendar year of the single raw export
    #[arg(short = 'y', long = "year", value_name = "YYYY")]
    pub year: Option<String>,

    /// Output directory for clean datasets
    #[arg(short = 'o', long = "output", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Encoding of the raw exports (latin1 or utf8)
    #[arg(long = "encoding", default_value = "latin1")]
    pub encoding: String,

    /// Skip writing one clean file per year
    #[arg(long = "no-per-year")]
    pub no_per_year: bool,
}

impl ProcessArgs {
    /// Check that exactly one input source was given
    pub fn validate(&self) -> Result<()> {
        match (&self.input_dir, &self.file) {
            (None, None) => Err(RidershipError::configuration(
                "Either --input <DIR> or --file <PATH> --year <YYYY> is required",
            )),
            (Some(dir), None) if !dir.is_dir() => Err(RidershipError::configuration(format!(
                "Input path is not a directory: {}",
                dir.display()
            ))),
            _ => Ok(()),
        }
    }

    /// Build the pipeline configuration from defaults and flags
    pub fn to_config(&self, show_progress: bool) -> Result<PipelineConfig> {
        let encoding: RawEncoding = self.encoding.parse()?;
        let mut config = PipelineConfig::default().with_encoding(encoding);

        if let Some(output_dir) = &self.output_dir {
            config = config.with_output_dir(output_dir);
        }
        if self.no_per_year {
            config = config.without_per_year_output();
        }
        if !show_progress {
            config = config.without_progress();
        }

        config.validate()?;
        Ok(config)
    }
}

/// Arguments for the analyze command
#[derive(Debug, Clone, Parser)]
pub struct AnalyzeArgs {
    /// Clean dataset for the group comparison (single year)
    #[arg(value_name = "DATASET")]
    pub dataset: PathBuf,

    /// Multi-year dataset for the interannual section
    #[arg(long = "historical", value_name = "PATH")]
    pub historical: Option<PathBuf>,

    /// Write SVG charts of the analysis into this directory
    #[arg(long = "charts", value_name = "DIR")]
    pub charts_dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_analyze_with_charts() {
        let args = Args::try_parse_from([
            "metro_ridership",
            "analyze",
            "data/processed/metro_2024_clean.csv",
            "--charts",
            "outputs/figures",
        ])
        .unwrap();

        match args.command {
            Commands::Analyze(analyze) => {
                assert_eq!(analyze.dataset, PathBuf::from("data/processed/metro_2024_clean.csv"));
                assert_eq!(analyze.charts_dir, Some(PathBuf::from("outputs/figures")));
                assert_eq!(analyze.historical, None);
            }
            other => panic!("expected analyze command, got {:?}", other),
        }
    }

    #[test]
    fn test_log_levels() {
        let mut logging = LoggingArgs::default();
        assert_eq!(logging.get_log_level(), "info");
        logging.verbose = 1;
        assert_eq!(logging.get_log_level(), "debug");
        logging.verbose = 3;
        assert_eq!(logging.get_log_level(), "trace");
        logging.quiet = true;
        assert_eq!(logging.get_log_level(), "warn");
    }

    #[test]
    fn test_parse_process_single_file() {
        let args = Args::try_parse_from([
            "metro-ridership",
            "process",
            "--file",
            "raw/passageiros_dia_2024.csv",
            "--year",
            "2024",
            "-o",
            "out",
            "-v",
        ])
        .unwrap();

        assert_eq!(args.logging.verbose, 1);
        match args.command {
            Commands::Process(process) => {
                assert_eq!(process.year.as_deref(), Some("2024"));
                let config = process.to_config(false).unwrap();
                assert_eq!(config.output_dir, PathBuf::from("out"));
                assert!(!config.show_progress);
                assert!(config.write_per_year);
            }
            other => panic!("Expected process command, got {:?}", other),
        }
    }

    #[test]
    fn test_file_requires_year() {
        assert!(Args::try_parse_from(["metro-ridership", "process", "--file", "x.csv"]).is_err());
    }

    #[test]
    fn test_missing_input_rejected() {
        let args = ProcessArgs {
            input_dir: None,
            file: None,
            year: None,
            output_dir: None,
            encoding: "latin1".to_string(),
            no_per_year: false,
        };
        assert!(args.validate().unwrap_err().is_configuration_error());
    }

    #[test]
    fn test_bad_encoding_rejected() {
        let args = ProcessArgs {
            input_dir: None,
            file: Some(PathBuf::from("x.csv")),
            year: Some("2024".to_string()),
            output_dir: None,
            encoding: "ebcdic".to_string(),
            no_per_year: true,
        };
        assert!(args.to_config(true).is_err());
    }
}
