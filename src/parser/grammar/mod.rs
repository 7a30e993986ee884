//! Line grammars for the supported dialects
//!
//! Each grammar extracts `(value, attribute, timestamp)` token groups from a
//! separator-normalized measurement line. The line parser holds them in a
//! fixed priority list and hands a line to the first one that matches.

pub mod bosch;
pub mod messdate;

pub use bosch::BoschGrammar;
pub use messdate::MessdateGrammar;

use crate::models::Dialect;
use std::fmt;

/// Raw tokens of one characteristic occurrence on a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrammarMatch<'a> {
    pub value: &'a str,
    pub attribute: &'a str,
    pub timestamp: &'a str,
}

/// A dialect's measurement-line grammar
///
/// `try_match` receives a line whose control separators have already been
/// normalized to spaces and returns its matches left to right. An empty result
/// means the grammar does not recognise the line.
pub trait LineGrammar: Send + Sync + fmt::Debug {
    fn dialect(&self) -> Dialect;

    fn try_match<'a>(&self, line: &'a str) -> Vec<GrammarMatch<'a>>;
}

/// Default grammar list in priority order
pub fn default_grammars() -> Vec<Box<dyn LineGrammar>> {
    vec![Box::new(MessdateGrammar), Box::new(BoschGrammar)]
}
