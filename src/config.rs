//! Configuration management and validation.
//!
//! Provides configuration structures for batch processing parameters and
//! export settings, plus system profiling used to size concurrency.

use crate::constants::{
    APP_CONFIG_DIR_NAME, DEFAULT_MAX_CONCURRENT_FILES, KFIELD_DEFINITIONS_FILENAME,
};
use crate::error::{QdasError, Result};
use polars::prelude::ParquetCompression;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

/// Tabular output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportFormat {
    Csv,
    Parquet,
}

impl ExportFormat {
    /// File extension written for this format
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Parquet => "parquet",
        }
    }
}

/// Supported compression algorithms for parquet files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompressionAlgorithm {
    /// Snappy compression - good balance of speed and compression
    Snappy,
    /// ZSTD compression - better compression ratio, slower
    Zstd,
    /// LZ4 compression - fastest, lower compression ratio
    Lz4,
    /// No compression
    Uncompressed,
}

impl CompressionAlgorithm {
    /// Convert to polars ParquetCompression type
    pub fn to_polars_compression(&self) -> ParquetCompression {
        match self {
            CompressionAlgorithm::Snappy => ParquetCompression::Snappy,
            CompressionAlgorithm::Zstd => ParquetCompression::Zstd(None),
            CompressionAlgorithm::Lz4 => ParquetCompression::Lz4Raw,
            CompressionAlgorithm::Uncompressed => ParquetCompression::Uncompressed,
        }
    }
}

/// Which tables are written for each file, and how
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    pub format: ExportFormat,

    /// Parquet compression (ignored for CSV)
    pub compression: CompressionAlgorithm,

    /// Write the one-row-per-event wide table
    pub write_wide: bool,

    /// Write the characteristics and header tables
    pub write_metadata_tables: bool,

    /// Also write one combined measurements table across all files
    pub combine: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            format: ExportFormat::Csv,
            compression: CompressionAlgorithm::Snappy,
            write_wide: true,
            write_metadata_tables: true,
            combine: false,
        }
    }
}

/// System profiling information for optimization
#[derive(Debug, Clone)]
pub struct SystemProfile {
    /// Number of CPU cores available
    pub cpu_cores: usize,
    /// Available memory in MB
    pub memory_mb: usize,
    /// Performance cores (for systems with efficiency cores)
    pub performance_cores: usize,
}

impl SystemProfile {
    /// Auto-detect system capabilities
    pub fn detect() -> Self {
        use sysinfo::System;

        let cpu_cores = num_cpus::get();
        let performance_cores = num_cpus::get_physical();

        let mut system = System::new();
        system.refresh_memory();
        let memory_mb = (system.total_memory() / 1024 / 1024) as usize;

        Self {
            cpu_cores,
            memory_mb,
            performance_cores,
        }
    }

    /// Concurrency suggested for file conversion on this machine
    ///
    /// Parsing is CPU bound; roughly one file per logical core, capped at the
    /// default and reduced on machines with less than 2GB of memory.
    pub fn recommended_concurrency(&self) -> usize {
        let by_cores = self.cpu_cores.clamp(1, DEFAULT_MAX_CONCURRENT_FILES);
        let limit = if self.memory_mb > 0 && self.memory_mb < 2048 {
            (by_cores / 2).max(1)
        } else {
            by_cores
        };

        debug!(
            "Recommended concurrency: {} ({} cores, {} performance cores, {}MB memory)",
            limit, self.cpu_cores, self.performance_cores, self.memory_mb
        );

        limit
    }
}

/// Global configuration for Q-DAS processing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessorConfig {
    /// Directory receiving the exported tables
    pub output_dir: PathBuf,

    /// Maximum concurrent file processing
    pub max_concurrent_files: usize,

    /// Optional K-field definitions file overriding built-in descriptions
    pub kfield_definitions: Option<PathBuf>,

    /// Show a progress bar during batch runs
    pub show_progress: bool,

    /// Export configuration
    pub export: ExportConfig,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            max_concurrent_files: DEFAULT_MAX_CONCURRENT_FILES, // Controlled concurrency
            kfield_definitions: None,
            show_progress: true,
            export: ExportConfig::default(),
        }
    }
}

impl ProcessorConfig {
    /// Create configuration with a custom output directory
    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    /// Set maximum concurrent files
    pub fn with_max_concurrent_files(mut self, max_files: usize) -> Self {
        self.max_concurrent_files = max_files;
        self
    }

    /// Use a K-field definitions file
    pub fn with_kfield_definitions(mut self, path: impl Into<PathBuf>) -> Self {
        self.kfield_definitions = Some(path.into());
        self
    }

    /// Disable the progress bar
    pub fn without_progress(mut self) -> Self {
        self.show_progress = false;
        self
    }

    /// Configure export settings
    pub fn with_export(mut self, export: ExportConfig) -> Self {
        self.export = export;
        self
    }

    /// Validate settings before a batch starts
    pub fn validate(&self) -> Result<()> {
        if self.max_concurrent_files == 0 {
            return Err(QdasError::configuration(
                "max_concurrent_files must be at least 1",
            ));
        }

        if self.output_dir.exists() && !self.output_dir.is_dir() {
            return Err(QdasError::configuration(format!(
                "Output path is not a directory: {}",
                self.output_dir.display()
            )));
        }

        Ok(())
    }
}

/// Default location of the K-field definitions file, if one is installed
pub fn default_kfield_definitions_path() -> Option<PathBuf> {
    let path = dirs::config_dir()?
        .join(APP_CONFIG_DIR_NAME)
        .join(KFIELD_DEFINITIONS_FILENAME);
    path.is_file().then_some(path)
}
