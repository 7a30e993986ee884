//! BOSCH dialect: scientific-notation values
//!
//! ```text
//! 6.00100000000000E+00 0 06.09.2002/12:41:27 #0000 ...
//! ```
//!
//! A line belongs to this dialect only when its first token is a
//! scientific-notation value. Each characteristic block then reads value,
//! attribute and timestamp; the trailing per-block fields (event, batch,
//! operator) are skipped up to the next block.

use super::{GrammarMatch, LineGrammar};
use crate::models::Dialect;
use regex::Regex;
use std::sync::LazyLock;

static LEADING_SCIENTIFIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*[-+]?\d*\.?\d+[Ee][+-]?\d+(?:\s|$)")
        .expect("BOSCH anchor pattern is valid")
});

static BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:^|\s)([-+]?\d*\.?\d+[Ee][+-]?\d+)\s+(\d+)\s+(\d{1,2}\.\d{1,2}\.\d{4}/\d{1,2}:\d{1,2}:\d{1,2})",
    )
    .expect("BOSCH block pattern is valid")
});

#[derive(Debug, Default, Clone, Copy)]
pub struct BoschGrammar;

impl LineGrammar for BoschGrammar {
    fn dialect(&self) -> Dialect {
        Dialect::Bosch
    }

    fn try_match<'a>(&self, line: &'a str) -> Vec<GrammarMatch<'a>> {
        if !LEADING_SCIENTIFIC.is_match(line) {
            return Vec::new();
        }

        BLOCK
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
