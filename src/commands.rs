//! Command implementations for the CLI
//!
//! Wires parsed arguments to the library: logging setup, K-field catalog
//! loading, batch conversion with a colored summary, and single-file
//! inspection.

use crate::catalog::KFieldCatalog;
use crate::cli::{Args, Commands, ConvertArgs, InspectArgs};
use crate::config::default_kfield_definitions_path;
use crate::models::{MeasurementTimestamp, ProcessingStats};
use crate::parser::MeasurementLineParser;
use crate::processor::BatchProcessor;
use crate::reader::{ParsedFile, read_file};

use anyhow::{Context, Result, bail};
use colored::*;
use std::path::Path;
use tokio::task;
use tracing::{debug, info, warn};

/// Run the selected subcommand
pub async fn run(args: Args) -> Result<()> {
    setup_logging(&args)?;

    match &args.command {
        Some(Commands::Convert(convert_args)) => convert(convert_args, args.show_progress()).await,
        Some(Commands::Inspect(inspect_args)) => inspect(inspect_args).await,
        None => Ok(()),
    }
}

/// Set up structured logging based on CLI arguments
fn setup_logging(args: &Args) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("qdas_processor={}", log_level)));

    if args.quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .try_init()
            .context("Failed to initialize logging")?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .try_init()
            .context("Failed to initialize logging")?;
    }

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}

/// Load the K-field catalog from an explicit or default definitions file
fn load_catalog(explicit: Option<&Path>) -> Result<KFieldCatalog> {
    let path = match explicit {
        Some(path) => {
            if !path.exists() {
                bail!("K-field definitions file not found: {}", path.display());
            }
            Some(path.to_path_buf())
        }
        None => default_kfield_definitions_path(),
    };

    match path {
        Some(path) => KFieldCatalog::builtin()
            .with_definitions_file(&path)
            .with_context(|| format!("Failed to load K-field definitions from {}", path.display())),
        None => {
            debug!("No K-field definitions file, using built-in descriptions");
            Ok(KFieldCatalog::builtin())
        }
    }
}

async fn convert(args: &ConvertArgs, show_progress: bool) -> Result<()> {
    let config = args.to_config(show_progress);
    let catalog = load_catalog(config.kfield_definitions.as_deref())?;

    info!(
        "Converting with {} concurrent files, format {}",
        config.max_concurrent_files,
        config.export.format.extension()
    );

    let processor = BatchProcessor::new(config, catalog);
    let stats = processor
        .process(&args.inputs)
        .await
        .context("Batch conversion failed")?;

    if show_progress {
        print_summary(&stats);
    }

    if stats.files_processed == 0 && stats.files_failed > 0 {
        bail!("All {} input files failed to convert", stats.files_failed);
    }
    if stats.files_failed > 0 {
        warn!("{} files failed to convert", stats.files_failed);
    }

    Ok(())
}

fn print_summary(stats: &ProcessingStats) {
    println!();
    println!("{}", "Conversion complete".bright_green().bold());
    println!(
        "  {} {}",
        "Files processed:".bright_cyan(),
        stats.files_processed.to_string().bright_white()
    );
    if stats.files_skipped > 0 {
        println!(
            "  {} {}",
            "Files skipped (no measurements):".bright_cyan(),
            stats.files_skipped.to_string().yellow()
        );
    }
    if stats.files_failed > 0 {
        println!(
            "  {} {}",
            "Files failed:".bright_cyan(),
            stats.files_failed.to_string().bright_red()
        );
    }
    println!(
        "  {} {}",
        "Records:".bright_cyan(),
        stats.total_records.to_string().bright_white()
    );
    println!(
        "  {} {}",
        "Output files:".bright_cyan(),
        stats.output_files.len().to_string().bright_white()
    );
    println!(
        "  {} {:.2}s",
        "Processing time:".bright_cyan(),
        stats.processing_time_ms as f64 / 1000.0
    );
}

async fn inspect(args: &InspectArgs) -> Result<()> {
    let catalog = load_catalog(args.kfields.as_deref())?;

    let path = args.file.clone();
    let parsed = task::spawn_blocking(move || read_file(&path, &MeasurementLineParser::new()))
        .await
        .context("Inspection task failed")?
        .with_context(|| format!("Failed to read {}", args.file.display()))?;

    print_inspection(&parsed, &catalog, args.rows);
    Ok(())
}

fn print_inspection(parsed: &ParsedFile, catalog: &KFieldCatalog, rows: usize) {
    println!("{} {}", "File:".bright_cyan().bold(), parsed.source.display());

    println!();
    println!("{}", "Header".bright_green().bold());
    for (code, value) in parsed.header.info.iter() {
        println!("  {:<10} {:<36} {}", code, catalog.label(code).dimmed(), value);
    }
    let missing = parsed.header.missing_required_fields();
    if !missing.is_empty() {
        println!("  {} {}", "Missing:".yellow(), missing.join(", "));
    }

    println!();
    println!("{}", "Characteristics".bright_green().bold());
    let table = &parsed.header.characteristics;
    for metadata in table.iter() {
        println!(
            "  {:>3}  {:<30} {}",
            metadata.index,
            table.resolve_label(metadata.index),
            metadata.fallback_label().unwrap_or("-").dimmed()
        );
    }
    if table.is_empty() {
        println!("  {}", "none defined".dimmed());
    }

    let stats = &parsed.stats;
    println!();
    println!("{}", "Dialects".bright_green().bold());
    println!("  {} {}", "MESSDATE lines:".bright_cyan(), stats.messdate_lines);
    println!("  {} {}", "BOSCH lines:".bright_cyan(), stats.bosch_lines);
    if let Some(dialect) = stats.dominant_dialect() {
        let mix = if stats.is_mixed() { " (mixed)" } else { "" };
        println!("  {} {}{}", "Dominant:".bright_cyan(), dialect, mix);
    }

    println!();
    println!("{}", "Statistics".bright_green().bold());
    println!("  {} {}", "Lines:".bright_cyan(), stats.lines_seen);
    println!(
        "  {} {} ({:.1}%)",
        "Matched:".bright_cyan(),
        stats.lines_matched(),
        stats.match_rate()
    );
    println!("  {} {}", "Unmatched:".bright_cyan(), stats.lines_unmatched);
    println!("  {} {}", "Records:".bright_cyan(), parsed.measurements.len());
    println!("  {} {}", "Events:".bright_cyan(), parsed.measurements.event_count());
    println!(
        "  {} {}",
        "Multi-characteristic lines:".bright_cyan(),
        if parsed.measurements.has_multi_characteristic_events() { "yes" } else { "no" }
    );
    if stats.malformed_tokens > 0 {
        println!(
            "  {} {}",
            "Malformed tokens:".bright_cyan(),
            stats.malformed_tokens.to_string().bright_red()
        );
    }
    if stats.unnormalized_timestamps > 0 {
        println!(
            "  {} {}",
            "Unnormalized timestamps:".bright_cyan(),
            stats.unnormalized_timestamps.to_string().yellow()
        );
    }

    if rows == 0 || parsed.is_empty() {
        return;
    }

    println!();
    println!(
        "{}",
        format!("First {} records", rows.min(parsed.measurements.len()))
            .bright_green()
            .bold()
    );
    println!(
        "  {:>6} {:>4}  {:<24} {:>12} {:>5}  {}",
        "event", "pos", "characteristic", "value", "attr", "timestamp"
    );
    for record in parsed.measurements.iter().take(rows) {
        let timestamp = match &record.timestamp {
            MeasurementTimestamp::Normalized(_) => record.timestamp.canonical(),
            MeasurementTimestamp::Unnormalized { raw } => format!("{} {}", raw, "(raw)".yellow()),
        };
        println!(
            "  {:>6} {:>4}  {:<24} {:>12} {:>5}  {}",
            record.event_id,
            record.characteristic_position,
            record.characteristic,
            record.value,
            record.attribute,
            timestamp
        );
    }
}
