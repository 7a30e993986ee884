//! Application constants for the Q-DAS processor
//!
//! Separator characters, K-field codes, naming conventions and default values
//! used throughout the processor.

// =============================================================================
// Separators
// =============================================================================

/// DC4 control byte separating fields inside a characteristic block
pub const FIELD_SEPARATOR: char = '\u{14}';

/// SI control byte separating characteristic blocks on a measurement line
pub const BLOCK_SEPARATOR: char = '\u{0F}';

/// Control bytes treated as interchangeable with ordinary whitespace
pub const CONTROL_SEPARATORS: &[char] = &[FIELD_SEPARATOR, BLOCK_SEPARATOR];

/// Glyphs some exporters write in place of the control bytes (CP437 renders
/// DC4 as `¶`); on measurement lines they separate fields as well
pub const SEPARATOR_STAND_INS: &[char] = &['¶', '¤'];

/// Separator between per-characteristic values in a single header field
pub const MULTI_VALUE_SEPARATOR: char = '¤';

// =============================================================================
// K-field Codes
// =============================================================================

/// K-field codes with a fixed meaning for the processor
pub mod kfields {
    /// Event identifier (GUID) attached to the preceding measurement line
    pub const EVENT_IDENTIFIER: &str = "K0097";

    /// Declared number of characteristics in the file
    pub const CHARACTERISTIC_COUNT: &str = "K0100";

    /// Part number
    pub const PART_NUMBER: &str = "K1001";

    /// Part description
    pub const PART_DESCRIPTION: &str = "K1002";

    /// Characteristic number, used as fallback label
    pub const CHARACTERISTIC_NUMBER: &str = "K2001";

    /// Characteristic description, used as primary label
    pub const CHARACTERISTIC_DESCRIPTION: &str = "K2002";

    /// Prefix shared by all characteristic-level fields
    pub const CHARACTERISTIC_PREFIX: &str = "K2";

    /// Header fields every well-formed file should declare
    pub const REQUIRED: &[&str] = &[CHARACTERISTIC_COUNT, PART_NUMBER, PART_DESCRIPTION];
}

// =============================================================================
// Labels and Formats
// =============================================================================

/// Prefix of the label used when a characteristic has no header metadata
pub const CHARACTERISTIC_PLACEHOLDER_PREFIX: &str = "Characteristic_";

/// Value used in exports when a part field is missing
pub const MISSING_PART_FIELD: &str = "N/A";

/// Canonical timestamp format for measurement records
pub const CANONICAL_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// File extensions recognised as Q-DAS transfer files during discovery
pub const INPUT_EXTENSIONS: &[&str] = &["txt", "dfq"];

/// Name of the optional K-field definitions file
pub const KFIELD_DEFINITIONS_FILENAME: &str = "k_fields.txt";

/// Application directory under the user config dir
pub const APP_CONFIG_DIR_NAME: &str = "qdas-processor";

/// Stem of the combined batch output
pub const COMBINED_OUTPUT_STEM: &str = "combined";

// =============================================================================
// Processing Defaults
// =============================================================================

/// Default number of files converted concurrently
pub const DEFAULT_MAX_CONCURRENT_FILES: usize = 8;

/// Memory usage ratio above which batch concurrency is halved
pub const MEMORY_PRESSURE_THRESHOLD: f64 = 0.8;

/// Number of records shown by the inspect command by default
pub const DEFAULT_INSPECT_ROWS: usize = 10;

// =============================================================================
// Helper Functions
// =============================================================================

/// Placeholder label for a characteristic position without metadata
pub fn placeholder_label(position: u32) -> String {
    format!("{}{}", CHARACTERISTIC_PLACEHOLDER_PREFIX, position)
}

/// Check whether a file extension marks a Q-DAS transfer file
pub fn is_input_extension(extension: &str) -> bool {
    INPUT_EXTENSIONS
        .iter()
        .any(|ext| ext.eq_ignore_ascii_case(extension))
}

/// Strip the `/index` suffix from a K-field code
pub fn base_kfield_code(code: &str) -> &str {
    code.split('/').next().unwrap_or(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_label() {
        assert_eq!(placeholder_label(1), "Characteristic_1");
        assert_eq!(placeholder_label(12), "Characteristic_12");
    }

    #[test]
    fn test_input_extension_detection() {
        assert!(is_input_extension("txt"));
        assert!(is_input_extension("DFQ"));
        assert!(!is_input_extension("csv"));
    }

    #[test]
    fn test_base_kfield_code() {
        assert_eq!(base_kfield_code("K2002/3"), "K2002");
        assert_eq!(base_kfield_code("K0100"), "K0100");
    }
}
