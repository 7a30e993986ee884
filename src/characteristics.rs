//! Characteristic metadata table.
//!
//! Maps 1-based characteristic indices to the K2xxx fields declared for them
//! in the file header. Built once per file by the header parser and read-only
//! while measurement lines are parsed.

use crate::constants::{kfields, placeholder_label};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// K2xxx fields declared for one characteristic
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacteristicMetadata {
    /// 1-based characteristic index
    pub index: u32,

    /// Every K2xxx field seen for this index, keyed by base code
    pub fields: BTreeMap<String, String>,
}

impl CharacteristicMetadata {
    pub fn new(index: u32) -> Self {
        Self {
            index,
            fields: BTreeMap::new(),
        }
    }

    /// Characteristic description (K2002)
    pub fn primary_label(&self) -> Option<&str> {
        self.fields
            .get(kfields::CHARACTERISTIC_DESCRIPTION)
            .map(String::as_str)
    }

    /// Characteristic number (K2001)
    pub fn fallback_label(&self) -> Option<&str> {
        self.fields
            .get(kfields::CHARACTERISTIC_NUMBER)
            .map(String::as_str)
    }

    pub fn field(&self, code: &str) -> Option<&str> {
        self.fields.get(code).map(String::as_str)
    }
}

/// Characteristic metadata of one file, keyed by index
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacteristicTable {
    entries: BTreeMap<u32, CharacteristicMetadata>,
}

impl CharacteristicTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set one field of a characteristic, creating the entry on first use
    ///
    /// Index 0 is not a characteristic and is ignored.
    pub(crate) fn set_field(&mut self, index: u32, code: &str, value: &str) {
        if index == 0 {
            return;
        }
        self.entries
            .entry(index)
            .or_insert_with(|| CharacteristicMetadata::new(index))
            .fields
            .insert(code.to_string(), value.to_string());
    }

    /// `(primary, fallback)` labels for an index; both absent when undefined
    pub fn lookup(&self, index: u32) -> (Option<&str>, Option<&str>) {
        match self.entries.get(&index) {
            Some(meta) => (meta.primary_label(), meta.fallback_label()),
            None => (None, None),
        }
    }

    /// Label for a characteristic position
    ///
    /// Primary label when present and non-empty, then fallback label, then a
    /// placeholder derived from the position. Never empty.
    pub fn resolve_label(&self, position: u32) -> String {
        let (primary, fallback) = self.lookup(position);
        primary
            .filter(|label| !label.trim().is_empty())
            .or_else(|| fallback.filter(|label| !label.trim().is_empty()))
            .map(str::to_string)
            .unwrap_or_else(|| placeholder_label(position))
    }

    pub fn get(&self, index: u32) -> Option<&CharacteristicMetadata> {
        self.entries.get(&index)
    }

    /// Entries in index order
    pub fn iter(&self) -> impl Iterator<Item = &CharacteristicMetadata> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sorted union of all K-codes used by any characteristic
    pub fn field_codes(&self) -> Vec<String> {
        let mut codes: Vec<String> = self
            .entries
            .values()
            .flat_map(|meta| meta.fields.keys().cloned())
            .collect();
        codes.sort();
        codes.dedup();
        codes
    }
}
