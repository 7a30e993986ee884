//! Batch conversion of Q-DAS transfer files.
//!
//! Resolves inputs, then reads, parses and exports every file on blocking
//! workers with bounded concurrency. Each file gets its own parse session;
//! the grammar list and K-field catalog are shared read-only. A failed file
//! is logged and counted without stopping the batch.

pub mod discovery;

#[cfg(test)]
pub mod tests;

use self::discovery::discover_inputs;

use crate::catalog::KFieldCatalog;
use crate::config::{ExportConfig, ProcessorConfig};
use crate::constants::{COMBINED_OUTPUT_STEM, MEMORY_PRESSURE_THRESHOLD};
use crate::error::{QdasError, Result};
use crate::export::{Exporter, Table, measurements_frame, output_path, write_frame};
use crate::models::ProcessingStats;
use crate::parser::MeasurementLineParser;
use crate::reader::{file_stem, read_file};

use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use polars::prelude::*;
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use sysinfo::System;
use tokio::sync::Mutex;
use tokio::task;
use tracing::{debug, error, info, warn};

/// Result of converting a single file
pub enum FileOutcome {
    /// Tables were written
    Exported {
        records: usize,
        outputs: Vec<PathBuf>,
        /// Long table tagged with its source file, kept for combined output
        measurements: Option<LazyFrame>,
    },
    /// The file held no measurements
    Skipped,
}

impl fmt::Debug for FileOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileOutcome::Exported {
                records,
                outputs,
                measurements,
            } => f
                .debug_struct("Exported")
                .field("records", records)
                .field("outputs", outputs)
                .field("combined", &measurements.is_some())
                .finish(),
            FileOutcome::Skipped => f.write_str("Skipped"),
        }
    }
}

/// Converts batches of transfer files into tables
pub struct BatchProcessor {
    config: ProcessorConfig,
    catalog: Arc<KFieldCatalog>,
    parser: Arc<MeasurementLineParser>,
    system_monitor: Arc<Mutex<System>>,
    memory_threshold: f64,
}

impl BatchProcessor {
    pub fn new(config: ProcessorConfig, catalog: KFieldCatalog) -> Self {
        Self {
            config,
            catalog: Arc::new(catalog),
            parser: Arc::new(MeasurementLineParser::new()),
            system_monitor: Arc::new(Mutex::new(System::new())),
            memory_threshold: MEMORY_PRESSURE_THRESHOLD,
        }
    }

    /// Replace the line parser, e.g. with a custom grammar list
    pub fn with_parser(mut self, parser: MeasurementLineParser) -> Self {
        self.parser = Arc::new(parser);
        self
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Check if system is under memory pressure
    pub async fn check_memory_pressure(&self) -> bool {
        let mut system = self.system_monitor.lock().await;
        system.refresh_memory();

        let used_memory = system.used_memory() as f64;
        let total_memory = system.total_memory() as f64;

        if total_memory == 0.0 {
            return false;
        }

        let memory_usage = used_memory / total_memory;
        let is_pressure = memory_usage > self.memory_threshold;

        if is_pressure {
            debug!(
                "Memory pressure detected: {:.1}% usage (threshold: {:.1}%)",
                memory_usage * 100.0,
                self.memory_threshold * 100.0
            );
        }

        is_pressure
    }

    /// Convert every transfer file found in `inputs`
    pub async fn process(&self, inputs: &[PathBuf]) -> Result<ProcessingStats> {
        let start_time = Instant::now();
        self.config.validate()?;

        let files = discover_inputs(inputs)?;
        let mut stats = ProcessingStats::default();

        if files.is_empty() {
            warn!("No transfer files found in the given inputs");
            stats.processing_time_ms = start_time.elapsed().as_millis();
            return Ok(stats);
        }

        info!(
            "Converting {} files into {}",
            files.len(),
            self.config.output_dir.display()
        );
        tokio::fs::create_dir_all(&self.config.output_dir).await?;

        let mut concurrent_limit = self.config.max_concurrent_files.min(files.len());
        if self.check_memory_pressure().await {
            concurrent_limit = (concurrent_limit / 2).max(1);
            debug!(
                "Memory pressure detected, reducing concurrency to {}",
                concurrent_limit
            );
        }

        let pb = self.progress_bar(files.len() as u64);
        let jobs = assign_output_stems(files, self.config.export.combine);

        let mut results: Vec<(PathBuf, Result<FileOutcome>)> = stream::iter(jobs)
            .map(|(path, stem)| {
                let pb = pb.clone();
                async move {
                    if let Some(file_name) = path.file_name() {
                        pb.set_message(format!("Processing: {}", file_name.to_string_lossy()));
                    }
                    let result = self.convert_file(path.clone(), stem).await;
                    pb.inc(1);
                    (path, result)
                }
            })
            .buffer_unordered(concurrent_limit)
            .collect()
            .await;

        pb.finish_with_message("All files processed");

        // Completion order varies; keep combined output in input order
        results.sort_by(|a, b| a.0.cmp(&b.0));

        let mut combined = Vec::new();
        for (path, result) in results {
            match result {
                Ok(FileOutcome::Exported {
                    records,
                    outputs,
                    measurements,
                }) => {
                    debug!("Successfully processed: {}", path.display());
                    stats.files_processed += 1;
                    stats.total_records += records;
                    stats.output_files.extend(outputs);
                    combined.extend(measurements);
                }
                Ok(FileOutcome::Skipped) => {
                    warn!("Skipped file (no measurements): {}", path.display());
                    stats.files_skipped += 1;
                }
                Err(e) => {
                    error!("Failed to process {}: {:#}", path.display(), e);
                    stats.files_failed += 1;
                }
            }
        }

        if !combined.is_empty() {
            let path = self.write_combined(combined).await?;
            stats.output_files.push(path);
        }

        stats.output_files.sort();
        stats.processing_time_ms = start_time.elapsed().as_millis();
        Ok(stats)
    }

    /// Read, parse and export one file on a blocking worker
    async fn convert_file(&self, path: PathBuf, stem: String) -> Result<FileOutcome> {
        let parser = Arc::clone(&self.parser);
        let catalog = Arc::clone(&self.catalog);
        let export = self.config.export.clone();
        let output_dir = self.config.output_dir.clone();

        task::spawn_blocking({
            let path = path.clone();
            move || convert_file_blocking(&path, &stem, &parser, &catalog, &export, &output_dir)
        })
        .await
        .map_err(|e| QdasError::ProcessingFailed {
            path,
            reason: format!("Worker task failed: {}", e),
        })?
    }

    /// Concatenate the tagged long tables into the combined output file
    async fn write_combined(&self, frames: Vec<LazyFrame>) -> Result<PathBuf> {
        let export = self.config.export.clone();
        let path = output_path(
            &self.config.output_dir,
            COMBINED_OUTPUT_STEM,
            Table::Measurements,
            export.format,
        );
        debug!("Concatenating {} frames into {}", frames.len(), path.display());

        task::spawn_blocking(move || -> Result<PathBuf> {
            let mut df = concat(frames, UnionArgs::default())?.collect()?;
            write_frame(&mut df, &path, &export)?;
            info!("Wrote {} combined rows to {}", df.height(), path.display());
            Ok(path)
        })
        .await
        .map_err(|e| QdasError::ProcessingFailed {
            path: self.config.output_dir.clone(),
            reason: format!("Combined export task failed: {}", e),
        })?
    }

    fn progress_bar(&self, len: u64) -> ProgressBar {
        if !self.config.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(len);
        let style = ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}",
            )
            .map(|style| style.progress_chars("#>-"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        pb.set_style(style);
        pb.set_message("Processing files");
        pb
    }
}

/// Pair each file with a unique output stem
///
/// Files sharing a stem (same name in different directories) get `_2`,
/// `_3`, ... suffixes in path order. With `combine`, the combined table's
/// stem is reserved as well.
pub fn assign_output_stems(files: Vec<PathBuf>, combine: bool) -> Vec<(PathBuf, String)> {
    let mut taken: HashSet<String> = HashSet::new();
    if combine {
        taken.insert(COMBINED_OUTPUT_STEM.to_string());
    }

    files
        .into_iter()
        .map(|path| {
            let base = file_stem(&path);
            let stem = if taken.contains(&base) {
                let renamed = (2..)
                    .map(|n| format!("{}_{}", base, n))
                    .find(|candidate| !taken.contains(candidate))
                    .unwrap_or_else(|| base.clone());
                warn!(
                    "Output name {} already used, writing {} as {}",
                    base,
                    path.display(),
                    renamed
                );
                renamed
            } else {
                base
            };
            taken.insert(stem.clone());
            (path, stem)
        })
        .collect()
}

fn convert_file_blocking(
    path: &Path,
    stem: &str,
    parser: &MeasurementLineParser,
    catalog: &KFieldCatalog,
    export: &ExportConfig,
    output_dir: &Path,
) -> Result<FileOutcome> {
    let parsed = read_file(path, parser)?;
    if parsed.is_empty() {
        return Ok(FileOutcome::Skipped);
    }

    let outputs = Exporter::new(export, catalog).export_as(&parsed, output_dir, stem)?;

    let measurements = if export.combine {
        let source = parsed.source.display().to_string();
        Some(
            measurements_frame(&parsed)?
                .lazy()
                .with_column(lit(source).alias("source_file")),
        )
    } else {
        None
    };

    Ok(FileOutcome::Exported {
        records: parsed.measurements.len(),
        outputs,
        measurements,
    })
}
