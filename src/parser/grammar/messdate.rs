//! MESSDATE dialect: value / attribute / timestamp triplets
//!
//! ```text
//! 57.962 0 5.7.2006/10:48:7 26.051 0 5.7.2006/10:48:7
//! ```

use super::{GrammarMatch, LineGrammar};
use crate::models::Dialect;
use regex::Regex;
use std::sync::LazyLock;

/// Triplet pattern; a value starts at the line start or right after a
/// separator, so exponents of scientific values never begin a triplet
static TRIPLET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:^|\s)([-+]?\d+\.?\d*)\s+(\d+)\s+(\d{1,2}\.\d{1,2}\.\d{4}/\d{1,2}:\d{1,2}:\d{1,2})",
    )
    .expect("MESSDATE triplet pattern is valid")
});

#[derive(Debug, Default, Clone, Copy)]
pub struct MessdateGrammar;

impl LineGrammar for MessdateGrammar {
    fn dialect(&self) -> Dialect {
        Dialect::Messdate
    }

    fn try_match<'a>(&self, line: &'a str) -> Vec<GrammarMatch<'a>> {
        TRIPLET
            .captures_iter(line)
            .filter_map(|caps| {
                Some(GrammarMatch {
                    value: caps.get(1)?.as_str(),
                    attribute: caps.get(2)?.as_str(),
                    timestamp: caps.get(3)?.as_str(),
                })
            })
            .collect()
    }
}
