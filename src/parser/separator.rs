//! Separator classification and normalization for measurement lines
//!
//! Measurement lines mix ordinary whitespace with the DC4/SI control bytes
//! (and, in some exports, their printable stand-ins). Grammars only ever see
//! the normalized form, where every control separator has become one space.

use crate::constants::{CONTROL_SEPARATORS, SEPARATOR_STAND_INS};
use std::borrow::Cow;

/// Kind of a delimiter character
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeparatorKind {
    /// Space, tab and other Unicode whitespace
    Whitespace,
    /// DC4 / SI control bytes
    Control,
    /// Printable glyph written in place of a control byte
    StandIn,
}

/// Classify a character as a separator, if it is one
pub fn classify(c: char) -> Option<SeparatorKind> {
    if CONTROL_SEPARATORS.contains(&c) {
        Some(SeparatorKind::Control)
    } else if SEPARATOR_STAND_INS.contains(&c) {
        Some(SeparatorKind::StandIn)
    } else if c.is_whitespace() {
        Some(SeparatorKind::Whitespace)
    } else {
        None
    }
}

pub fn is_separator(c: char) -> bool {
    classify(c).is_some()
}

/// Replace every non-whitespace separator with a single space
///
/// One character in, one character out, so run lengths are preserved.
/// Borrows the input when it contains no control separators.
pub fn normalize_separators(line: &str) -> Cow<'_, str> {
    let needs_rewrite = line
        .chars()
        .any(|c| matches!(classify(c), Some(SeparatorKind::Control | SeparatorKind::StandIn)));

    if !needs_rewrite {
        return Cow::Borrowed(line);
    }

    Cow::Owned(
        line.chars()
            .map(|c| match classify(c) {
                Some(SeparatorKind::Control | SeparatorKind::StandIn) => ' ',
                _ => c,
            })
            .collect(),
    )
}
