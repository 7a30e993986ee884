//! Q-DAS transfer file reading.
//!
//! Decodes a file's bytes, builds the header and characteristic table from
//! its K-field lines, then runs a parse session over the measurement lines.
//! K0097 event identifiers are attached to the event of the most recent
//! measurement line.

use crate::constants::kfields;
use crate::error::{QdasError, Result};
use crate::header::{FileHeader, HeaderBuilder, is_kfield_line, split_kfield};
use crate::models::MeasurementSet;
use crate::parser::{MeasurementLineParser, ParseStats};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Everything extracted from one transfer file
#[derive(Debug, Clone)]
pub struct ParsedFile {
    /// Path the file was read from
    pub source: PathBuf,

    pub header: FileHeader,

    pub measurements: MeasurementSet,

    /// K0097 event identifiers keyed by event id
    pub event_guids: BTreeMap<u64, String>,

    pub stats: ParseStats,
}

impl ParsedFile {
    /// File stem used to name exported tables
    pub fn stem(&self) -> String {
        file_stem(&self.source)
    }

    pub fn event_guid(&self, event_id: u64) -> Option<&str> {
        self.event_guids.get(&event_id).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.measurements.is_empty()
    }
}

/// File stem of `path`, used as the base name of its exported tables
pub fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "measurements".to_string())
}

/// Decode file bytes as UTF-8, falling back to Latin-1
///
/// A leading byte order mark is dropped. Control bytes are preserved.
pub fn decode(bytes: &[u8]) -> Cow<'_, str> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => {
            debug!("Content is not valid UTF-8, decoding as Latin-1");
            Cow::Owned(bytes.iter().map(|&b| char::from(b)).collect())
        }
    }
}

/// Rewrite `\r\n` and lone `\r` line endings as `\n`
pub fn normalize_line_endings(text: &str) -> Cow<'_, str> {
    if text.contains('\r') {
        Cow::Owned(text.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        Cow::Borrowed(text)
    }
}

/// Read and parse a transfer file
pub fn read_file(path: &Path, parser: &MeasurementLineParser) -> Result<ParsedFile> {
    if !path.exists() {
        return Err(QdasError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let bytes = fs::read(path)?;
    let text = decode(&bytes);
    Ok(parse_content(path, &text, parser))
}

/// Parse already decoded file content
pub fn parse_content(source: &Path, content: &str, parser: &MeasurementLineParser) -> ParsedFile {
    let content = normalize_line_endings(content);
    let lines: Vec<&str> = content.split('\n').collect();

    // Pass 1: header fields
    let mut header_builder = HeaderBuilder::new();
    for line in &lines {
        header_builder.parse_line(line);
    }
    let header = header_builder.build();

    // Pass 2: measurement lines
    let mut event_guids = BTreeMap::new();
    let mut session = parser.session(&header.characteristics);

    for (index, line) in lines.iter().enumerate() {
        let line_number = index + 1;

        if is_kfield_line(line) {
            let guid = split_kfield(line)
                .filter(|(code, _)| code.starts_with(kfields::EVENT_IDENTIFIER))
                .map(|(_, guid)| guid);

            if let Some(guid) = guid {
                match session.last_event_id() {
                    Some(event_id) => {
                        event_guids.insert(event_id, guid.to_string());
                    }
                    None => debug!(
                        "Line {}: event identifier before any measurement, ignored",
                        line_number
                    ),
                }
            }
            continue;
        }

        session.parse_line(line_number, line);
    }

    let (measurements, stats) = session.finish();

    if measurements.is_empty() {
        warn!("No measurements found in {}", source.display());
    } else {
        info!(
            "Parsed {}: {} records from {} events ({} MESSDATE lines, {} BOSCH lines)",
            source.display(),
            measurements.len(),
            measurements.event_count(),
            stats.messdate_lines,
            stats.bosch_lines
        );
    }

    if stats.malformed_tokens > 0 || stats.lines_unmatched > 0 {
        debug!(
            "{}: {} unmatched lines, {} malformed tokens, {} unnormalized timestamps",
            source.display(),
            stats.lines_unmatched,
            stats.malformed_tokens,
            stats.unnormalized_timestamps
        );
    }

    ParsedFile {
        source: source.to_path_buf(),
        header,
        measurements,
        event_guids,
        stats,
    }
}
