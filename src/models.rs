//! Core data structures and types for Q-DAS processing.
//!
//! Defines the measurement record produced by the line parser, its
//! timestamp representation, the per-file measurement set and the batch
//! processing statistics.

use crate::constants::CANONICAL_DATETIME_FORMAT;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Line-encoding conventions supported by the parser
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dialect {
    /// Value / attribute / timestamp triplets, several per line
    Messdate,
    /// Scientific-notation values, anchored at the start of the line
    Bosch,
}

impl Dialect {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::Messdate => "MESSDATE",
            Dialect::Bosch => "BOSCH",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Timestamp of a measurement
///
/// A token that matched the timestamp grammar but does not name a real
/// calendar instant (day 32, 30 February, hour 25) is kept verbatim instead of
/// dropping the record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MeasurementTimestamp {
    Normalized(NaiveDateTime),
    Unnormalized { raw: String },
}

impl MeasurementTimestamp {
    /// Whether calendar normalization succeeded
    pub fn is_normalized(&self) -> bool {
        matches!(self, MeasurementTimestamp::Normalized(_))
    }

    /// Parsed instant, if normalization succeeded
    pub fn datetime(&self) -> Option<NaiveDateTime> {
        match self {
            MeasurementTimestamp::Normalized(dt) => Some(*dt),
            MeasurementTimestamp::Unnormalized { .. } => None,
        }
    }

    /// `YYYY-MM-DD HH:MM:SS`, or the raw source token when normalization failed
    pub fn canonical(&self) -> String {
        match self {
            MeasurementTimestamp::Normalized(dt) => {
                dt.format(CANONICAL_DATETIME_FORMAT).to_string()
            }
            MeasurementTimestamp::Unnormalized { raw } => raw.clone(),
        }
    }
}

impl fmt::Display for MeasurementTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

/// One characteristic value taken from one measurement line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementRecord {
    /// Identity of the originating line, shared by all records of that line
    pub event_id: u64,

    /// 1-based rank of the value within its line
    pub characteristic_position: u32,

    /// Resolved characteristic label
    pub characteristic: String,

    pub value: f64,

    /// Attribute code (0 = regular value)
    pub attribute: u32,

    pub timestamp: MeasurementTimestamp,

    /// Grammar that recognised the line
    pub dialect: Dialect,

    /// 1-based physical line in the source file
    pub line_number: usize,
}

/// Ordered measurement records of one file
///
/// Order is line order, then occurrence order within the line. Produced by
/// closing a [`RecordAssembler`](crate::parser::RecordAssembler) and immutable
/// afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeasurementSet {
    records: Vec<MeasurementRecord>,
}

impl MeasurementSet {
    pub(crate) fn from_records(records: Vec<MeasurementRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[MeasurementRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MeasurementRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of distinct events in the set
    pub fn event_count(&self) -> usize {
        self.records.last().map_or(0, |last| last.event_id as usize)
    }

    /// Whether any event carries more than one characteristic
    pub fn has_multi_characteristic_events(&self) -> bool {
        self.records.iter().any(|r| r.characteristic_position > 1)
    }
}

impl<'a> IntoIterator for &'a MeasurementSet {
    type Item = &'a MeasurementRecord;
    type IntoIter = std::slice::Iter<'a, MeasurementRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Batch processing statistics
#[derive(Debug, Default)]
pub struct ProcessingStats {
    pub files_processed: usize,
    pub files_skipped: usize,
    pub files_failed: usize,
    pub total_records: usize,
    pub output_files: Vec<PathBuf>,
    pub processing_time_ms: u128,
}

impl ProcessingStats {
    /// Total number of input files seen by the batch
    pub fn files_seen(&self) -> usize {
        self.files_processed + self.files_skipped + self.files_failed
    }
}
