//! Per-file parse session
//!
//! Owns the event counter, the record assembler and the statistics for one
//! file. The characteristic table is borrowed read-only for the whole session.

use super::assembler::RecordAssembler;
use super::fields::{parse_attribute, parse_timestamp, parse_value};
use super::separator::{is_separator, normalize_separators};
use super::stats::ParseStats;
use super::MeasurementLineParser;
use crate::characteristics::CharacteristicTable;
use crate::models::{MeasurementRecord, MeasurementSet};
use tracing::{debug, trace};

pub struct ParseSession<'p> {
    parser: &'p MeasurementLineParser,
    table: &'p CharacteristicTable,
    last_event_id: u64,
    assembler: RecordAssembler,
    stats: ParseStats,
}

impl<'p> ParseSession<'p> {
    pub fn new(parser: &'p MeasurementLineParser, table: &'p CharacteristicTable) -> Self {
        Self {
            parser,
            table,
            last_event_id: 0,
            assembler: RecordAssembler::new(),
            stats: ParseStats::new(),
        }
    }

    /// Parse one measurement line and return the records it produced
    ///
    /// Lines that no grammar recognises produce nothing and do not consume an
    /// event id. A match whose value or attribute token cannot be converted
    /// is skipped; the remaining matches keep their positions.
    pub fn parse_line(&mut self, line_number: usize, line: &str) -> &[MeasurementRecord] {
        self.stats.lines_seen += 1;
        let start = self.assembler.len();

        if line.chars().all(is_separator) {
            self.stats.blank_lines += 1;
            return self.assembler.records_from(start);
        }

        let normalized = normalize_separators(line);
        let Some((dialect, matches)) = self.parser.match_line(&normalized) else {
            self.stats.lines_unmatched += 1;
            trace!("Line {}: no grammar matched", line_number);
            return self.assembler.records_from(start);
        };

        self.stats.record_dialect(dialect);
        let event_id = self.last_event_id + 1;

        for (index, tokens) in matches.iter().enumerate() {
            let position = index as u32 + 1;

            let (Some(value), Some(attribute)) =
                (parse_value(tokens.value), parse_attribute(tokens.attribute))
            else {
                self.stats.malformed_tokens += 1;
                debug!(
                    "Line {}: skipping characteristic {} with malformed tokens ({:?}, {:?})",
                    line_number, position, tokens.value, tokens.attribute
                );
                continue;
            };

            let timestamp = parse_timestamp(tokens.timestamp);
            if !timestamp.is_normalized() {
                self.stats.unnormalized_timestamps += 1;
                debug!(
                    "Line {}: timestamp {:?} is not a calendar instant, kept raw",
                    line_number, tokens.timestamp
                );
            }

            self.assembler.append(MeasurementRecord {
                event_id,
                characteristic_position: position,
                characteristic: self.table.resolve_label(position),
                value,
                attribute,
                timestamp,
                dialect,
                line_number,
            });
        }

        let emitted = self.assembler.len() - start;
        if emitted > 0 {
            self.last_event_id = event_id;
            self.stats.records_emitted += emitted;
        }

        self.assembler.records_from(start)
    }

    /// Event id of the most recent line that produced records
    pub fn last_event_id(&self) -> Option<u64> {
        (self.last_event_id > 0).then_some(self.last_event_id)
    }

    pub fn stats(&self) -> &ParseStats {
        &self.stats
    }

    /// End the session, returning the assembled records and statistics
    pub fn finish(self) -> (MeasurementSet, ParseStats) {
        (self.assembler.finish(), self.stats)
    }
}
