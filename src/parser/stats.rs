//! Parsing statistics for measurement sections
//!
//! Tracks how many lines each dialect claimed, how many produced nothing and
//! how many tokens were dropped, so callers can report the quality of a file
//! without the parser ever failing on it.

use crate::models::Dialect;
use serde::{Deserialize, Serialize};

/// Per-session parsing statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseStats {
    /// Lines handed to the parser, blank ones included
    pub lines_seen: usize,

    /// Blank lines
    pub blank_lines: usize,

    /// Non-blank lines no grammar recognised
    pub lines_unmatched: usize,

    /// Lines claimed by the MESSDATE grammar
    pub messdate_lines: usize,

    /// Lines claimed by the BOSCH grammar
    pub bosch_lines: usize,

    /// Records emitted
    pub records_emitted: usize,

    /// Matches skipped because a value or attribute token was unusable
    pub malformed_tokens: usize,

    /// Records whose timestamp could not be normalized
    pub unnormalized_timestamps: usize,
}

impl ParseStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_dialect(&mut self, dialect: Dialect) {
        match dialect {
            Dialect::Messdate => self.messdate_lines += 1,
            Dialect::Bosch => self.bosch_lines += 1,
        }
    }

    /// Lines recognised by any grammar
    pub fn lines_matched(&self) -> usize {
        self.messdate_lines + self.bosch_lines
    }

    /// Percentage of non-blank lines a grammar recognised
    pub fn match_rate(&self) -> f64 {
        let candidates = self.lines_seen - self.blank_lines;
        if candidates == 0 {
            0.0
        } else {
            (self.lines_matched() as f64 / candidates as f64) * 100.0
        }
    }

    /// Dominant dialect of the session, if any line matched
    pub fn dominant_dialect(&self) -> Option<Dialect> {
        match (self.messdate_lines, self.bosch_lines) {
            (0, 0) => None,
            (m, b) if m >= b => Some(Dialect::Messdate),
            _ => Some(Dialect::Bosch),
        }
    }

    /// Whether both dialects appeared in the same session
    pub fn is_mixed(&self) -> bool {
        self.messdate_lines > 0 && self.bosch_lines > 0
    }
}
