//! Command-line argument definitions for the Q-DAS processor
//!
//! Two subcommands: `convert` turns transfer files into tables, `inspect`
//! prints what the parser sees in a single file.

use crate::config::{
    CompressionAlgorithm, ExportConfig, ExportFormat, ProcessorConfig, SystemProfile,
};
use crate::constants::DEFAULT_INSPECT_ROWS;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// CLI arguments for the Q-DAS measurement file processor
#[derive(Debug, Clone, Parser)]
#[command(
    name = "qdas-processor",
    version,
    about = "Convert Q-DAS/AQDEF measurement files into characteristic-labeled tables",
    long_about = "Parses Q-DAS transfer files (.dfq/.txt) in the MESSDATE and BOSCH line \
                  dialects, labels every measured value with its characteristic from the \
                  K-field header, and writes long, wide and metadata tables as CSV or Parquet."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        global = true,
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Only show errors
    #[arg(
        short = 'q',
        long = "quiet",
        global = true,
        help = "Suppress output except errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,
}

/// Available subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Convert transfer files to CSV or Parquet tables
    Convert(ConvertArgs),
    /// Show the header, characteristics and first records of one file
    Inspect(InspectArgs),
}

#[derive(Debug, Clone, Parser)]
pub struct ConvertArgs {
    /// Input files, directories or glob patterns
    ///
    /// Directories are searched recursively for .txt and .dfq files.
    #[arg(value_name = "INPUT", required = true)]
    pub inputs: Vec<PathBuf>,

    #[arg(
        short = 'o',
        long = "output",
        value_name = "DIR",
        default_value = ".",
        help = "Output directory for the exported tables"
    )]
    pub output_dir: PathBuf,

    #[arg(long = "format", value_enum, default_value = "csv", help = "Output table format")]
    pub format: OutputFormatArg,

    #[arg(
        long = "compression",
        value_enum,
        default_value = "snappy",
        help = "Parquet compression algorithm"
    )]
    pub compression: CompressionArg,

    #[arg(long = "no-wide", help = "Do not write the wide (one row per event) table")]
    pub no_wide: bool,

    #[arg(
        long = "no-metadata",
        help = "Do not write the characteristics and header tables"
    )]
    pub no_metadata: bool,

    #[arg(
        long = "combine",
        help = "Also write every file's measurements into one combined table"
    )]
    pub combine: bool,

    /// K-field definitions file (`KEY = VALUE` lines)
    ///
    /// Defaults to k_fields.txt in the user configuration directory when present.
    #[arg(long = "kfields", value_name = "FILE")]
    pub kfields: Option<PathBuf>,

    /// Number of files converted concurrently
    ///
    /// Defaults to a value derived from CPU cores and available memory.
    #[arg(short = 'j', long = "jobs", value_name = "COUNT")]
    pub jobs: Option<usize>,
}

#[derive(Debug, Clone, Parser)]
pub struct InspectArgs {
    /// Transfer file to inspect
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    #[arg(long = "kfields", value_name = "FILE", help = "K-field definitions file")]
    pub kfields: Option<PathBuf>,

    #[arg(
        long = "rows",
        value_name = "N",
        default_value_t = DEFAULT_INSPECT_ROWS,
        help = "Number of measurement records to print"
    )]
    pub rows: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormatArg {
    Csv,
    Parquet,
}

impl From<OutputFormatArg> for ExportFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Csv => ExportFormat::Csv,
            OutputFormatArg::Parquet => ExportFormat::Parquet,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CompressionArg {
    Snappy,
    Zstd,
    Lz4,
    None,
}

impl From<CompressionArg> for CompressionAlgorithm {
    fn from(arg: CompressionArg) -> Self {
        match arg {
            CompressionArg::Snappy => CompressionAlgorithm::Snappy,
            CompressionArg::Zstd => CompressionAlgorithm::Zstd,
            CompressionArg::Lz4 => CompressionAlgorithm::Lz4,
            CompressionArg::None => CompressionAlgorithm::Uncompressed,
        }
    }
}

impl Args {
    /// Get the log level based on verbosity settings
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            return "error";
        }

        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }

    /// Whether progress bars and summaries are shown
    pub fn show_progress(&self) -> bool {
        !self.quiet
    }
}

impl ConvertArgs {
    /// Build the processor configuration from defaults and CLI overrides
    pub fn to_config(&self, show_progress: bool) -> ProcessorConfig {
        let export = ExportConfig {
            format: self.format.into(),
            compression: self.compression.into(),
            write_wide: !self.no_wide,
            write_metadata_tables: !self.no_metadata,
            combine: self.combine,
        };

        let jobs = self
            .jobs
            .unwrap_or_else(|| SystemProfile::detect().recommended_concurrency());

        let mut config = ProcessorConfig::default()
            .with_output_dir(&self.output_dir)
            .with_max_concurrent_files(jobs)
            .with_export(export);

        if let Some(path) = &self.kfields {
            config = config.with_kfield_definitions(path);
        }
        if !show_progress {
            config = config.without_progress();
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn convert_args(args: &Args) -> &ConvertArgs {
        match &args.command {
            Some(Commands::Convert(convert)) => convert,
            other => panic!("Expected convert command, got {:?}", other),
        }
    }

    #[test]
    fn test_convert_defaults() {
        let args = Args::try_parse_from(["qdas-processor", "convert", "data/"]).unwrap();
        let convert = convert_args(&args);

        assert_eq!(convert.inputs, vec![PathBuf::from("data/")]);
        assert_eq!(convert.format, OutputFormatArg::Csv);
        assert_eq!(convert.compression, CompressionArg::Snappy);
        assert!(!convert.combine);
        assert_eq!(args.get_log_level(), "warn");
        assert!(args.show_progress());

        let config = convert.to_config(args.show_progress());
        assert_eq!(config.output_dir, PathBuf::from("."));
        assert!(config.max_concurrent_files >= 1);
        assert!(config.export.write_wide);
        assert!(config.export.write_metadata_tables);
    }

    #[test]
    fn test_convert_overrides() {
        let args = Args::try_parse_from([
            "qdas-processor",
            "convert",
            "a.dfq",
            "b/*.txt",
            "-o",
            "out",
            "--format",
            "parquet",
            "--compression",
            "none",
            "--no-wide",
            "--no-metadata",
            "--combine",
            "--kfields",
            "k.txt",
            "-j",
            "3",
            "-q",
        ])
        .unwrap();
        let convert = convert_args(&args);
        let config = convert.to_config(args.show_progress());

        assert_eq!(convert.inputs.len(), 2);
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.max_concurrent_files, 3);
        assert_eq!(config.export.format, ExportFormat::Parquet);
        assert_eq!(config.export.compression, CompressionAlgorithm::Uncompressed);
        assert!(!config.export.write_wide);
        assert!(!config.export.write_metadata_tables);
        assert!(config.export.combine);
        assert_eq!(config.kfield_definitions, Some(PathBuf::from("k.txt")));
        assert!(!config.show_progress);
        assert_eq!(args.get_log_level(), "error");
    }

    #[test]
    fn test_inspect_args() {
        let args =
            Args::try_parse_from(["qdas-processor", "inspect", "part.dfq", "--rows", "3", "-vv"])
                .unwrap();

        match &args.command {
            Some(Commands::Inspect(inspect)) => {
                assert_eq!(inspect.file, PathBuf::from("part.dfq"));
                assert_eq!(inspect.rows, 3);
                assert!(inspect.kfields.is_none());
            }
            other => panic!("Expected inspect command, got {:?}", other),
        }
        assert_eq!(args.get_log_level(), "debug");
    }

    #[test]
    fn test_invalid_arguments() {
        assert!(Args::try_parse_from(["qdas-processor", "convert"]).is_err());
        assert!(Args::try_parse_from(["qdas-processor", "convert", "x", "--format", "xlsx"]).is_err());
        assert!(Args::try_parse_from(["qdas-processor", "convert", "x", "-v", "-q"]).is_err());
    }

    #[test]
    fn test_no_subcommand() {
        let args = Args::try_parse_from(["qdas-processor"]).unwrap();
        assert!(args.command.is_none());
    }
}
