//! Batch conversion tests

use super::{header_only_content, messdate_content, write_sample};
use crate::catalog::KFieldCatalog;
use crate::config::{ExportConfig, ExportFormat, ProcessorConfig};
use crate::parser::{MeasurementLineParser, MessdateGrammar};
use crate::processor::{BatchProcessor, assign_output_stems};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn create_processor(output_dir: &std::path::Path, export: ExportConfig) -> BatchProcessor {
    let config = ProcessorConfig::default()
        .with_output_dir(output_dir)
        .with_max_concurrent_files(2)
        .without_progress()
        .with_export(export);
    BatchProcessor::new(config, KFieldCatalog::builtin())
}

#[tokio::test]
async fn test_directory_batch() {
    let temp_dir = TempDir::new().unwrap();
    let input_dir = temp_dir.path().join("input");
    let output_dir = temp_dir.path().join("output");

    write_sample(&input_dir, "op30.dfq", &messdate_content(3));
    write_sample(&input_dir.join("line2"), "op40.txt", &messdate_content(2));

    let processor = create_processor(&output_dir, ExportConfig::default());
    let stats = processor.process(&[input_dir]).await.unwrap();

    assert_eq!(stats.files_processed, 2);
    assert_eq!(stats.files_failed, 0);
    assert_eq!(stats.total_records, 10);
    assert_eq!(stats.output_files.len(), 8);
    assert!(output_dir.join("op30.measurements.csv").exists());
    assert!(output_dir.join("op40.wide.csv").exists());
}

#[tokio::test]
async fn test_empty_file_is_skipped() {
    let temp_dir = TempDir::new().unwrap();
    let input_dir = temp_dir.path().join("input");
    let output_dir = temp_dir.path().join("output");

    write_sample(&input_dir, "header_only.dfq", &header_only_content());
    write_sample(&input_dir, "empty.txt", "");
    write_sample(&input_dir, "op30.dfq", &messdate_content(1));

    let processor = create_processor(&output_dir, ExportConfig::default());
    let stats = processor.process(&[input_dir]).await.unwrap();

    assert_eq!(stats.files_processed, 1);
    assert_eq!(stats.files_skipped, 2);
    assert_eq!(stats.files_seen(), 3);
    assert!(!output_dir.join("header_only.measurements.csv").exists());
}

#[tokio::test]
async fn test_combined_output_row_count() {
    let temp_dir = TempDir::new().unwrap();
    let input_dir = temp_dir.path().join("input");
    let output_dir = temp_dir.path().join("output");

    write_sample(&input_dir, "a.dfq", &messdate_content(3));
    write_sample(&input_dir, "b.dfq", &messdate_content(4));

    let export = ExportConfig {
        combine: true,
        write_wide: false,
        write_metadata_tables: false,
        ..ExportConfig::default()
    };
    let processor = create_processor(&output_dir, export);
    let stats = processor.process(&[input_dir]).await.unwrap();

    let combined = output_dir.join("combined.measurements.csv");
    assert!(stats.output_files.contains(&combined));
    assert_eq!(stats.total_records, 14);

    let content = fs::read_to_string(&combined).unwrap();
    let mut lines = content.lines();
    let header = lines.next().unwrap();
    assert!(header.ends_with("source_file"));
    assert_eq!(lines.count(), 14);
}

#[tokio::test]
async fn test_parquet_batch() {
    let temp_dir = TempDir::new().unwrap();
    let input_dir = temp_dir.path().join("input");
    let output_dir = temp_dir.path().join("output");

    write_sample(&input_dir, "op30.dfq", &messdate_content(2));

    let export = ExportConfig {
        format: ExportFormat::Parquet,
        ..ExportConfig::default()
    };
    let processor = create_processor(&output_dir, export);
    let stats = processor.process(&[input_dir]).await.unwrap();

    assert_eq!(stats.files_processed, 1);
    assert!(output_dir.join("op30.measurements.parquet").exists());
}

#[tokio::test]
async fn test_no_inputs_found() {
    let temp_dir = TempDir::new().unwrap();
    let input_dir = temp_dir.path().join("input");
    fs::create_dir_all(&input_dir).unwrap();

    let processor = create_processor(&temp_dir.path().join("output"), ExportConfig::default());
    let stats = processor.process(&[input_dir]).await.unwrap();

    assert_eq!(stats.files_seen(), 0);
    assert!(stats.output_files.is_empty());
}

#[tokio::test]
async fn test_memory_pressure_detection() {
    let temp_dir = TempDir::new().unwrap();
    let processor = create_processor(temp_dir.path(), ExportConfig::default());

    // Result depends on the host; the check must simply complete
    let _ = processor.check_memory_pressure().await;
}

#[test]
fn test_assign_output_stems() {
    let files = vec![
        PathBuf::from("in/combined.dfq"),
        PathBuf::from("in/line1/part.dfq"),
        PathBuf::from("in/line2/part.txt"),
        PathBuf::from("in/part_2.dfq"),
    ];

    let stems: Vec<String> = assign_output_stems(files.clone(), true)
        .into_iter()
        .map(|(_, stem)| stem)
        .collect();
    assert_eq!(stems, vec!["combined_2", "part", "part_2", "part_2_2"]);

    let stems: Vec<String> = assign_output_stems(files, false)
        .into_iter()
        .map(|(_, stem)| stem)
        .collect();
    assert_eq!(stems[0], "combined");
}

#[tokio::test]
async fn test_same_stem_in_subdirectories_keeps_all_records() {
    let temp_dir = TempDir::new().unwrap();
    let input_dir = temp_dir.path().join("input");
    let output_dir = temp_dir.path().join("output");

    write_sample(&input_dir.join("line1"), "part.dfq", &messdate_content(3));
    write_sample(&input_dir.join("line2"), "part.dfq", &messdate_content(2));

    let processor = create_processor(&output_dir, ExportConfig::default());
    let stats = processor.process(&[input_dir]).await.unwrap();

    assert_eq!(stats.files_processed, 2);
    assert_eq!(stats.total_records, 10);

    let mut unique = stats.output_files.clone();
    unique.dedup();
    assert_eq!(unique.len(), stats.output_files.len());
    assert_eq!(stats.output_files.len(), 8);

    let rows_on_disk: usize = ["part", "part_2"]
        .iter()
        .map(|stem| {
            let path = output_dir.join(format!("{}.measurements.csv", stem));
            fs::read_to_string(path).unwrap().lines().count() - 1
        })
        .sum();
    assert_eq!(rows_on_disk, 10);
}

#[tokio::test]
async fn test_input_named_like_combined_output() {
    let temp_dir = TempDir::new().unwrap();
    let input_dir = temp_dir.path().join("input");
    let output_dir = temp_dir.path().join("output");

    write_sample(&input_dir, "combined.dfq", &messdate_content(1));
    write_sample(&input_dir, "other.dfq", &messdate_content(2));

    let export = ExportConfig {
        combine: true,
        write_wide: false,
        write_metadata_tables: false,
        ..ExportConfig::default()
    };
    let processor = create_processor(&output_dir, export);
    let stats = processor.process(&[input_dir]).await.unwrap();

    assert_eq!(stats.output_files.len(), 3);
    let own = fs::read_to_string(output_dir.join("combined_2.measurements.csv")).unwrap();
    assert_eq!(own.lines().count(), 3);
    let combined = fs::read_to_string(output_dir.join("combined.measurements.csv")).unwrap();
    assert_eq!(combined.lines().count(), 7);
}

#[tokio::test]
async fn test_custom_grammar_list() {
    let temp_dir = TempDir::new().unwrap();
    let input_dir = temp_dir.path().join("input");
    let output_dir = temp_dir.path().join("output");

    write_sample(&input_dir, "messdate.dfq", &messdate_content(2));
    write_sample(
        &input_dir,
        "bosch.dfq",
        "K2002/1 Diameter\n6.001E+00 0 06.09.2002/12:41:27 #0000 17 OP1\n",
    );

    let parser = MeasurementLineParser::with_grammars(vec![Box::new(MessdateGrammar)]);
    let processor = create_processor(&output_dir, ExportConfig::default()).with_parser(parser);
    let stats = processor.process(&[input_dir]).await.unwrap();

    assert_eq!(stats.files_processed, 1);
    assert_eq!(stats.files_skipped, 1);
    assert_eq!(stats.total_records, 4);
}
