//! Input discovery for batch conversion
//!
//! Resolves command-line inputs into the list of transfer files to convert.
//! An input may be a file, a directory (searched recursively for `.txt` and
//! `.dfq` files) or a glob pattern.

use crate::constants::is_input_extension;
use crate::error::{QdasError, Result};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Check if a path has a transfer file extension (case-insensitive)
pub fn is_transfer_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(is_input_extension)
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains(['*', '?', '['])
}

/// Resolve inputs into a sorted, de-duplicated file list
///
/// Explicit file inputs are taken as given regardless of extension. A plain
/// path that does not exist is an error; a glob without matches only warns.
pub fn discover_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = BTreeSet::new();

    for input in inputs {
        if input.is_file() {
            files.insert(input.clone());
        } else if input.is_dir() {
            let found = discover_directory(input)?;
            debug!("Found {} transfer files in {}", found.len(), input.display());
            files.extend(found);
        } else {
            let pattern = input.to_string_lossy();
            if !is_glob_pattern(&pattern) {
                return Err(QdasError::FileNotFound { path: input.clone() });
            }

            let mut matched = 0;
            for entry in glob::glob(&pattern)? {
                match entry {
                    Ok(path) if path.is_file() => {
                        files.insert(path);
                        matched += 1;
                    }
                    Ok(_) => {}
                    Err(e) => warn!("Skipping unreadable glob match: {}", e),
                }
            }

            if matched == 0 {
                warn!("Pattern {} matched no files", pattern);
            }
        }
    }

    Ok(files.into_iter().collect())
}

/// Recursively collect transfer files below a directory
fn discover_directory(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir).follow_links(true) {
        let entry = entry?;
        if entry.file_type().is_file() && is_transfer_file(entry.path()) {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    /// Helper to create a nested input directory
    fn create_input_tree(temp_dir: &TempDir) -> PathBuf {
        let root = temp_dir.path().join("inputs");
        let nested = root.join("line1").join("op30");
        fs::create_dir_all(&nested).unwrap();

        fs::write(root.join("a.dfq"), "K0100 1").unwrap();
        fs::write(root.join("b.TXT"), "K0100 1").unwrap();
        fs::write(nested.join("c.txt"), "K0100 1").unwrap();
        fs::write(nested.join("report.pdf"), "ignored").unwrap();

        root
    }

    #[test]
    fn test_is_transfer_file() {
        assert!(is_transfer_file(Path::new("part.dfq")));
        assert!(is_transfer_file(Path::new("/data/MESSDATE.TXT")));
        assert!(!is_transfer_file(Path::new("part.csv")));
        assert!(!is_transfer_file(Path::new("part")));
    }

    #[test]
    fn test_discover_directory_recursively() {
        let temp_dir = TempDir::new().unwrap();
        let root = create_input_tree(&temp_dir);

        let files = discover_inputs(&[root]).unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();

        assert_eq!(files.len(), 3);
        assert!(names.contains(&"a.dfq".to_string()));
        assert!(names.contains(&"b.TXT".to_string()));
        assert!(names.contains(&"c.txt".to_string()));
    }

    #[test]
    fn test_discover_glob_and_deduplicate() {
        let temp_dir = TempDir::new().unwrap();
        let root = create_input_tree(&temp_dir);

        let pattern = root.join("*.dfq");
        let files = discover_inputs(&[pattern, root.join("a.dfq")]).unwrap();

        assert_eq!(files, vec![root.join("a.dfq")]);
    }

    #[test]
    fn test_explicit_file_any_extension() {
        let temp_dir = TempDir::new().unwrap();
        let root = create_input_tree(&temp_dir);
        let pdf = root.join("line1").join("op30").join("report.pdf");

        assert_eq!(discover_inputs(&[pdf.clone()]).unwrap(), vec![pdf]);
    }

    #[test]
    fn test_missing_input() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing.dfq");

        match discover_inputs(&[missing.clone()]) {
            Err(QdasError::FileNotFound { path }) => assert_eq!(path, missing),
            other => panic!("Expected FileNotFound, got {:?}", other),
        }

        let no_match = temp_dir.path().join("*.dfq");
        assert!(discover_inputs(&[no_match]).unwrap().is_empty());
    }
}
