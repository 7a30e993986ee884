//! Record accumulation for one file
//!
//! The assembler is open while the session runs and is consumed by
//! [`RecordAssembler::finish`], which yields the immutable
//! [`MeasurementSet`]. Records are kept exactly as appended.

use crate::models::{MeasurementRecord, MeasurementSet};

#[derive(Debug, Default)]
pub struct RecordAssembler {
    records: Vec<MeasurementRecord>,
}

impl RecordAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, record: MeasurementRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records appended at or after `start`
    pub(crate) fn records_from(&self, start: usize) -> &[MeasurementRecord] {
        &self.records[start.min(self.records.len())..]
    }

    /// Close the assembler and hand over the result
    pub fn finish(self) -> MeasurementSet {
        MeasurementSet::from_records(self.records)
    }
}
