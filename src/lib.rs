//! Q-DAS Processor Library
//!
//! Converts Q-DAS/AQDEF measurement transfer files into characteristic-labeled
//! tables. Measurement lines in either the MESSDATE or the BOSCH dialect are
//! parsed into records that carry the characteristic label from the file's
//! K-field header, a synthetic event id and a normalized timestamp.
//!
//! This library provides tools for:
//! - Parsing K-field headers into a characteristic metadata table
//! - Parsing measurement lines with an ordered list of dialect grammars
//! - Reading `.dfq`/`.txt` transfer files (UTF-8 or Latin-1)
//! - Exporting long, wide and metadata tables as CSV or Parquet
//! - Converting batches of files concurrently

pub mod catalog;
pub mod characteristics;
pub mod cli;
pub mod commands;
pub mod config;
pub mod constants;
pub mod error;
pub mod export;
pub mod header;
pub mod models;
pub mod parser;
pub mod processor;
pub mod reader;

// Re-export commonly used types
pub use catalog::KFieldCatalog;
pub use characteristics::{CharacteristicMetadata, CharacteristicTable};
pub use config::{ExportConfig, ExportFormat, ProcessorConfig};
pub use error::{QdasError, Result};
pub use header::{FileHeader, parse_header};
pub use models::{
    Dialect, MeasurementRecord, MeasurementSet, MeasurementTimestamp, ProcessingStats,
};
pub use parser::{MeasurementLineParser, ParseStats};
pub use processor::BatchProcessor;
pub use reader::{ParsedFile, read_file};
