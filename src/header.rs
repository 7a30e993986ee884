//! K-field header parsing and characteristic table construction.
//!
//! Parses `Kxxxx[/n] value` lines into file-level header fields and the
//! per-characteristic metadata table used to label measurement values.
//! Header parsing never fails a file; missing required fields are logged.

use crate::characteristics::CharacteristicTable;
use crate::constants::{MULTI_VALUE_SEPARATOR, kfields};
use crate::parser::separator::{SeparatorKind, classify};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::LazyLock;
use tracing::{debug, warn};

static KFIELD_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^K\d{4}").expect("K-field pattern is valid"));

/// Check whether a line is a K-field line (`K` followed by four digits)
pub fn is_kfield_line(line: &str) -> bool {
    KFIELD_LINE.is_match(line.trim_start())
}

/// Whitespace or control byte between code and value; `¤` is a list
/// separator inside header values and never delimits the code
fn is_field_delimiter(c: char) -> bool {
    matches!(
        classify(c),
        Some(SeparatorKind::Whitespace | SeparatorKind::Control)
    )
}

/// Split a K-field line into code and trimmed value
///
/// Returns `None` for lines that are not K-fields or carry no value.
pub fn split_kfield(line: &str) -> Option<(&str, &str)> {
    let line = line.trim();
    if !is_kfield_line(line) {
        return None;
    }

    let (code, value) = line.split_at(line.find(is_field_delimiter)?);
    let value = value.trim_matches(is_field_delimiter);
    (!value.is_empty()).then_some((code, value))
}

/// File-level header fields, keyed by full K-field code
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderInfo {
    fields: BTreeMap<String, String>,
}

impl HeaderInfo {
    pub fn get(&self, code: &str) -> Option<&str> {
        self.fields.get(code).map(String::as_str)
    }

    /// Value of `code/1`, or of the bare `code`
    fn first_characteristic_or_file(&self, code: &str) -> Option<&str> {
        self.get(&format!("{}/1", code)).or_else(|| self.get(code))
    }

    /// Part number (K1001)
    pub fn part_number(&self) -> Option<&str> {
        self.first_characteristic_or_file(kfields::PART_NUMBER)
    }

    /// Part description (K1002)
    pub fn part_description(&self) -> Option<&str> {
        self.first_characteristic_or_file(kfields::PART_DESCRIPTION)
    }

    /// Declared number of characteristics (K0100)
    pub fn declared_characteristics(&self) -> Option<u32> {
        self.get(kfields::CHARACTERISTIC_COUNT)?.trim().parse().ok()
    }

    /// Fields in code order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn contains_base(&self, code: &str) -> bool {
        self.fields
            .keys()
            .any(|key| key == code || key.starts_with(&format!("{}/", code)))
    }
}

/// Parsed header of one transfer file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileHeader {
    pub info: HeaderInfo,
    pub characteristics: CharacteristicTable,
}

impl FileHeader {
    /// Names of required fields the header does not declare
    pub fn missing_required_fields(&self) -> Vec<&'static str> {
        let mut missing: Vec<&'static str> = kfields::REQUIRED
            .iter()
            .copied()
            .filter(|code| !self.info.contains_base(code))
            .collect();
        if self.characteristics.is_empty() {
            missing.push("K2xxx");
        }
        missing
    }
}

/// Builder collecting K-field lines into a [`FileHeader`]
#[derive(Debug, Default)]
pub struct HeaderBuilder {
    info: BTreeMap<String, String>,
    characteristics: CharacteristicTable,
    lines_parsed: usize,
}

impl HeaderBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one line; returns whether it was consumed as a header field
    ///
    /// Event identifier lines (K0097) belong to the measurement section and
    /// are never consumed here.
    pub fn parse_line(&mut self, line: &str) -> bool {
        let Some((code, value)) = split_kfield(line) else {
            return false;
        };

        if code.starts_with(kfields::EVENT_IDENTIFIER) {
            return false;
        }

        self.lines_parsed += 1;

        match code.split_once('/') {
            Some((base, index)) => match index.parse::<u32>() {
                Ok(index) if base.starts_with(kfields::CHARACTERISTIC_PREFIX) && index > 0 => {
                    if value.contains(MULTI_VALUE_SEPARATOR) {
                        self.distribute(base, value);
                    } else {
                        self.characteristics.set_field(index, base, value);
                    }
                }
                _ => self.insert_info(code, value),
            },
            None => {
                if code.starts_with(kfields::CHARACTERISTIC_PREFIX)
                    && value.contains(MULTI_VALUE_SEPARATOR)
                {
                    self.distribute(code, value);
                } else {
                    self.insert_info(code, value);
                }
            }
        }

        true
    }

    /// Assign the `¤`-separated pieces of a value to characteristics 1..m
    fn distribute(&mut self, code: &str, value: &str) {
        for (position, piece) in value.split(MULTI_VALUE_SEPARATOR).enumerate() {
            let piece = piece.trim();
            if !piece.is_empty() {
                self.characteristics
                    .set_field(position as u32 + 1, code, piece);
            }
        }
    }

    fn insert_info(&mut self, code: &str, value: &str) {
        self.info.insert(code.to_string(), value.to_string());
    }

    /// Finish the header, logging missing required fields
    pub fn build(self) -> FileHeader {
        let header = FileHeader {
            info: HeaderInfo { fields: self.info },
            characteristics: self.characteristics,
        };

        let missing = header.missing_required_fields();
        if !missing.is_empty() {
            warn!("Header is missing required fields: {}", missing.join(", "));
        }

        if let Some(declared) = header.info.declared_characteristics() {
            let defined = header.characteristics.len();
            if declared as usize != defined {
                debug!(
                    "K0100 declares {} characteristics, header defines {}",
                    declared, defined
                );
            }
        }

        debug!(
            "Parsed header: {} lines, {} fields, {} characteristics",
            self.lines_parsed,
            header.info.len(),
            header.characteristics.len()
        );

        header
    }
}

/// Parse every K-field line of `lines` into a [`FileHeader`]
pub fn parse_header<'a, I>(lines: I) -> FileHeader
where
    I: IntoIterator<Item = &'a str>,
{
    let mut builder = HeaderBuilder::new();
    for line in lines {
        builder.parse_line(line);
    }
    builder.build()
}
