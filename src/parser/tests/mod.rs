//! Test utilities for measurement-line parser testing
//!
//! Shared characteristic tables and line builders used across the parser
//! test modules.

use crate::characteristics::CharacteristicTable;

// Test modules
mod dialect_tests;

/// Table with K2002 labels for the first two characteristics
pub fn two_characteristic_table() -> CharacteristicTable {
    let mut table = CharacteristicTable::new();
    table.set_field(1, "K2002", "50.45");
    table.set_field(2, "K2002", "L24.55");
    table
}

/// MESSDATE line with `count` triplets sharing one timestamp
pub fn messdate_line(count: usize, separator: &str) -> String {
    (0..count)
        .map(|i| {
            format!(
                "{}.{:03}{sep}0{sep}5.7.2006/10:48:7",
                10 + i,
                i,
                sep = separator
            )
        })
        .collect::<Vec<_>>()
        .join(separator)
}
