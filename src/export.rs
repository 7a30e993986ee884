//! Tabular export of parsed transfer files
//!
//! Projects a [`ParsedFile`] into polars DataFrames and writes them as CSV or
//! Parquet:
//!
//! - `<stem>.measurements.<ext>` - one row per record (long format)
//! - `<stem>.wide.<ext>` - one row per event, one column per characteristic
//! - `<stem>.characteristics.<ext>` - K2xxx fields per characteristic
//! - `<stem>.header.<ext>` - file-level K-fields

use crate::catalog::KFieldCatalog;
use crate::config::{ExportConfig, ExportFormat};
use crate::constants::MISSING_PART_FIELD;
use crate::error::{QdasError, Result};
use crate::models::MeasurementRecord;
use crate::reader::ParsedFile;

use polars::prelude::*;
use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Tables written for one file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Measurements,
    Wide,
    Characteristics,
    Header,
}

impl Table {
    pub fn as_str(&self) -> &'static str {
        match self {
            Table::Measurements => "measurements",
            Table::Wide => "wide",
            Table::Characteristics => "characteristics",
            Table::Header => "header",
        }
    }
}

/// Output file name for one table of a file
pub fn output_path(output_dir: &Path, stem: &str, table: Table, format: ExportFormat) -> PathBuf {
    output_dir.join(format!("{}.{}.{}", stem, table.as_str(), format.extension()))
}

fn part_fields(parsed: &ParsedFile) -> (String, String) {
    let info = &parsed.header.info;
    (
        info.part_number().unwrap_or(MISSING_PART_FIELD).to_string(),
        info.part_description()
            .unwrap_or(MISSING_PART_FIELD)
            .to_string(),
    )
}

/// Long table: one row per measurement record
pub fn measurements_frame(parsed: &ParsedFile) -> Result<DataFrame> {
    let records = parsed.measurements.records();
    let (part_number, part_description) = part_fields(parsed);
    let height = records.len();

    let measured_at = Column::new(
        "measured_at".into(),
        records
            .iter()
            .map(|r| {
                r.timestamp
                    .datetime()
                    .map(|dt| dt.and_utc().timestamp_millis())
            })
            .collect::<Vec<Option<i64>>>(),
    )
    .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?;

    let df = DataFrame::new(vec![
        Column::new(
            "event_id".into(),
            records.iter().map(|r| r.event_id).collect::<Vec<u64>>(),
        ),
        Column::new(
            "characteristic_position".into(),
            records
                .iter()
                .map(|r| r.characteristic_position)
                .collect::<Vec<u32>>(),
        ),
        Column::new(
            "characteristic".into(),
            records
                .iter()
                .map(|r| r.characteristic.as_str())
                .collect::<Vec<&str>>(),
        ),
        Column::new(
            "value".into(),
            records.iter().map(|r| r.value).collect::<Vec<f64>>(),
        ),
        Column::new(
            "attribute".into(),
            records.iter().map(|r| r.attribute).collect::<Vec<u32>>(),
        ),
        Column::new(
            "timestamp".into(),
            records
                .iter()
                .map(|r| r.timestamp.canonical())
                .collect::<Vec<String>>(),
        ),
        Column::new(
            "timestamp_normalized".into(),
            records
                .iter()
                .map(|r| r.timestamp.is_normalized())
                .collect::<Vec<bool>>(),
        ),
        measured_at,
        Column::new(
            "dialect".into(),
            records
                .iter()
                .map(|r| r.dialect.as_str())
                .collect::<Vec<&str>>(),
        ),
        Column::new(
            "line_number".into(),
            records
                .iter()
                .map(|r| r.line_number as u64)
                .collect::<Vec<u64>>(),
        ),
        Column::new(
            "event_guid".into(),
            records
                .iter()
                .map(|r| parsed.event_guid(r.event_id))
                .collect::<Vec<Option<&str>>>(),
        ),
        Column::new("part_number".into(), vec![part_number.as_str(); height]),
        Column::new(
            "part_description".into(),
            vec![part_description.as_str(); height],
        ),
    ])?;

    Ok(df)
}

/// Wide table: one row per event, one value column per characteristic label
///
/// Label columns appear in order of first appearance. When a label repeats
/// within an event the first value is kept.
pub fn wide_frame(parsed: &ParsedFile) -> Result<DataFrame> {
    let records = parsed.measurements.records();
    let (part_number, part_description) = part_fields(parsed);

    let mut labels: Vec<&str> = Vec::new();
    let mut label_index: HashMap<&str, usize> = HashMap::new();
    for record in records {
        if !label_index.contains_key(record.characteristic.as_str()) {
            label_index.insert(&record.characteristic, labels.len());
            labels.push(&record.characteristic);
        }
    }

    let events: Vec<&[MeasurementRecord]> = records
        .chunk_by(|a, b| a.event_id == b.event_id)
        .collect();

    let mut values: Vec<Vec<Option<f64>>> = vec![vec![None; events.len()]; labels.len()];
    for (row, event) in events.iter().enumerate() {
        for record in event.iter() {
            let slot = &mut values[label_index[record.characteristic.as_str()]][row];
            if slot.is_none() {
                *slot = Some(record.value);
            }
        }
    }

    let mut columns = vec![
        Column::new(
            "event_id".into(),
            events.iter().map(|e| e[0].event_id).collect::<Vec<u64>>(),
        ),
        Column::new(
            "timestamp".into(),
            events
                .iter()
                .map(|e| e[0].timestamp.canonical())
                .collect::<Vec<String>>(),
        ),
        Column::new(
            "part_number".into(),
            vec![part_number.as_str(); events.len()],
        ),
        Column::new(
            "part_description".into(),
            vec![part_description.as_str(); events.len()],
        ),
    ];

    for (label, column_values) in labels.iter().zip(values) {
        columns.push(Column::new(
            unique_name(label, &columns).into(),
            column_values,
        ));
    }

    Ok(DataFrame::new(columns)?)
}

/// Characteristics table: index plus one column per K-code in use
pub fn characteristics_frame(parsed: &ParsedFile, catalog: &KFieldCatalog) -> Result<DataFrame> {
    let table = &parsed.header.characteristics;
    let mut columns = vec![Column::new(
        "index".into(),
        table.iter().map(|m| m.index).collect::<Vec<u32>>(),
    )];

    for code in table.field_codes() {
        let heading = catalog.label(&code);
        let name = if columns.iter().any(|c| c.name().as_str() == heading) {
            format!("{} ({})", heading, code)
        } else {
            heading
        };
        columns.push(Column::new(
            name.into(),
            table
                .iter()
                .map(|m| m.field(&code))
                .collect::<Vec<Option<&str>>>(),
        ));
    }

    Ok(DataFrame::new(columns)?)
}

/// Header table: `k_field, description, value` in code order
pub fn header_frame(parsed: &ParsedFile, catalog: &KFieldCatalog) -> Result<DataFrame> {
    let info = &parsed.header.info;
    Ok(DataFrame::new(vec![
        Column::new(
            "k_field".into(),
            info.iter().map(|(code, _)| code).collect::<Vec<&str>>(),
        ),
        Column::new(
            "description".into(),
            info.iter()
                .map(|(code, _)| catalog.describe(code))
                .collect::<Vec<Option<&str>>>(),
        ),
        Column::new(
            "value".into(),
            info.iter().map(|(_, value)| value).collect::<Vec<&str>>(),
        ),
    ])?)
}

/// Column name not yet used by `columns`, suffixed with a counter if needed
fn unique_name(name: &str, columns: &[Column]) -> String {
    let taken = |candidate: &str| columns.iter().any(|c| c.name().as_str() == candidate);
    if !taken(name) {
        return name.to_string();
    }
    (2..)
        .map(|n| format!("{}_{}", name, n))
        .find(|candidate| !taken(candidate))
        .unwrap_or_else(|| name.to_string())
}

/// Write a DataFrame in the configured format
pub fn write_frame(df: &mut DataFrame, path: &Path, config: &ExportConfig) -> Result<()> {
    let file = File::create(path)?;

    let written = match config.format {
        ExportFormat::Csv => CsvWriter::new(file)
            .include_header(true)
            .with_separator(b',')
            .finish(df),
        ExportFormat::Parquet => ParquetWriter::new(file)
            .with_compression(config.compression.to_polars_compression())
            .finish(df)
            .map(|_| ()),
    };

    written.map_err(|e| QdasError::ExportFailed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    debug!("Wrote {} rows to {}", df.height(), path.display());
    Ok(())
}

/// Writes the tables of parsed files
#[derive(Debug)]
pub struct Exporter<'a> {
    config: &'a ExportConfig,
    catalog: &'a KFieldCatalog,
}

impl<'a> Exporter<'a> {
    pub fn new(config: &'a ExportConfig, catalog: &'a KFieldCatalog) -> Self {
        Self { config, catalog }
    }

    /// Write every enabled table of `parsed` into `output_dir`
    ///
    /// Files without measurements produce no output.
    pub fn export(&self, parsed: &ParsedFile, output_dir: &Path) -> Result<Vec<PathBuf>> {
        self.export_as(parsed, output_dir, &parsed.stem())
    }

    /// Like [`Exporter::export`], naming the tables `<stem>.<table>.<ext>`
    pub fn export_as(
        &self,
        parsed: &ParsedFile,
        output_dir: &Path,
        stem: &str,
    ) -> Result<Vec<PathBuf>> {
        if parsed.is_empty() {
            return Ok(Vec::new());
        }

        std::fs::create_dir_all(output_dir)?;
        let mut written = Vec::new();

        let mut tables = vec![(Table::Measurements, measurements_frame(parsed)?)];
        if self.config.write_wide {
            tables.push((Table::Wide, wide_frame(parsed)?));
        }
        if self.config.write_metadata_tables {
            tables.push((
                Table::Characteristics,
                characteristics_frame(parsed, self.catalog)?,
            ));
            tables.push((Table::Header, header_frame(parsed, self.catalog)?));
        }

        for (table, mut df) in tables {
            let path = output_path(output_dir, stem, table, self.config.format);
            write_frame(&mut df, &path, self.config)?;
            written.push(path);
        }

        Ok(written)
    }
}
