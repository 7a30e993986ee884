//! Batch processor tests
//!
//! Exercise the complete read, parse and export pipeline on small transfer
//! files written into temporary directories.

pub mod batch_processing;

use std::fs;
use std::path::{Path, PathBuf};

/// MESSDATE file with two characteristics and `events` measurement lines
pub fn messdate_content(events: usize) -> String {
    let mut content = String::from(
        "K0100 2\nK1001 DREHEN OP30_2\nK1002 DC-BREMSSCHEIBE\nK2001/1 50.45\nK2001/2 L24.55\n",
    );
    for event in 0..events {
        content.push_str(&format!(
            "57.96{}\u{14}0\u{14}5.7.2006/10:48:{}\u{0F}26.051\u{14}0\u{14}5.7.2006/10:48:{}\n",
            event, event, event
        ));
    }
    content
}

/// Header-only file without any measurement line
pub fn header_only_content() -> String {
    "K0100 1\nK1001 P-100\nK1002 Housing\nK2002/1 Bore\n".to_string()
}

/// Write a sample file below `dir`
pub fn write_sample(dir: &Path, name: &str, content: &str) -> PathBuf {
    fs::create_dir_all(dir).unwrap();
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}
