//! Measurement-line parser for Q-DAS transfer files
//!
//! Turns raw measurement lines into characteristic-labeled
//! [`MeasurementRecord`](crate::models::MeasurementRecord)s. A line is first
//! separator-normalized, then offered to each grammar in priority order; the
//! first grammar that yields a match owns the line.
//!
//! ## Architecture
//!
//! - [`separator`] - Delimiter classification and normalization
//! - [`grammar`] - The [`LineGrammar`] trait and the MESSDATE and BOSCH grammars
//! - [`fields`] - Value, attribute and timestamp token conversion
//! - [`session`] - Per-file parse session (event ids, label resolution)
//! - [`assembler`] - Ordered record accumulation
//! - [`stats`] - Parsing statistics
//!
//! ## Usage
//!
//! ```rust
//! use qdas_processor::characteristics::CharacteristicTable;
//! use qdas_processor::parser::MeasurementLineParser;
//!
//! let parser = MeasurementLineParser::new();
//! let table = CharacteristicTable::new();
//! let mut session = parser.session(&table);
//!
//! let records = session.parse_line(1, "57.962 0 5.7.2006/10:48:7");
//! assert_eq!(records.len(), 1);
//! assert_eq!(records[0].characteristic, "Characteristic_1");
//!
//! let (set, stats) = session.finish();
//! assert_eq!(set.len(), 1);
//! assert_eq!(stats.messdate_lines, 1);
//! ```

pub mod assembler;
pub mod fields;
pub mod grammar;
pub mod separator;
pub mod session;
pub mod stats;

#[cfg(test)]
mod tests;

pub use assembler::RecordAssembler;
pub use grammar::{BoschGrammar, GrammarMatch, LineGrammar, MessdateGrammar};
pub use session::ParseSession;
pub use stats::ParseStats;

use crate::characteristics::CharacteristicTable;
use crate::models::{Dialect, MeasurementSet};

/// Ordered list of line grammars
///
/// Immutable once built; share one instance between any number of sessions
/// and threads.
#[derive(Debug)]
pub struct MeasurementLineParser {
    grammars: Vec<Box<dyn LineGrammar>>,
}

impl Default for MeasurementLineParser {
    fn default() -> Self {
        Self::new()
    }
}

impl MeasurementLineParser {
    /// Parser with the MESSDATE grammar first and BOSCH as fallback
    pub fn new() -> Self {
        Self::with_grammars(grammar::default_grammars())
    }

    /// Parser with a custom grammar list, tried in the given order
    pub fn with_grammars(grammars: Vec<Box<dyn LineGrammar>>) -> Self {
        Self { grammars }
    }

    pub fn grammars(&self) -> &[Box<dyn LineGrammar>] {
        &self.grammars
    }

    /// Match a normalized line against the grammars in priority order
    ///
    /// Later grammars are not consulted once one has matched.
    pub fn match_line<'a>(&self, normalized: &'a str) -> Option<(Dialect, Vec<GrammarMatch<'a>>)> {
        self.grammars.iter().find_map(|grammar| {
            let matches = grammar.try_match(normalized);
            (!matches.is_empty()).then(|| (grammar.dialect(), matches))
        })
    }

    /// Start a parse session for one file
    pub fn session<'p>(&'p self, table: &'p CharacteristicTable) -> ParseSession<'p> {
        ParseSession::new(self, table)
    }

    /// Parse a whole measurement section, numbering lines from 1
    pub fn parse_lines<'l, I>(&self, lines: I, table: &CharacteristicTable) -> (MeasurementSet, ParseStats)
    where
        I: IntoIterator<Item = &'l str>,
    {
        let mut session = self.session(table);
        for (index, line) in lines.into_iter().enumerate() {
            session.parse_line(index + 1, line);
        }
        session.finish()
    }
}
