//! K-field catalog
//!
//! Human-readable descriptions for K-field codes, used as column headings of
//! the characteristic table and in the header table. Built-in descriptions
//! cover the common codes; a `KEY = VALUE` definitions file can add to or
//! override them.

use crate::constants::base_kfield_code;
use crate::error::{QdasError, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Built-in K-field descriptions
const BUILTIN_DESCRIPTIONS: &[(&str, &str)] = &[
    // Values (K00xx)
    ("K0001", "Value"),
    ("K0002", "Attribute"),
    ("K0004", "Date/Time"),
    ("K0005", "Events"),
    ("K0006", "Batch number/Ident number"),
    ("K0007", "Cavity number/Spindle number"),
    ("K0008", "Operator"),
    ("K0009", "Text/Measurement info"),
    ("K0010", "Machine"),
    ("K0011", "Process parameter"),
    ("K0012", "Gauge"),
    ("K0014", "Part ident"),
    ("K0015", "Test purpose"),
    ("K0016", "Production number"),
    ("K0017", "Workpiece carrier number"),
    ("K0020", "Subgroup size"),
    ("K0021", "Number of errors"),
    ("K0053", "Order number"),
    ("K0097", "Event identifier"),
    ("K0100", "Total number of characteristics"),
    // Part data (K1xxx)
    ("K1001", "Part number"),
    ("K1002", "Part description"),
    ("K1003", "Part abbreviation"),
    ("K1004", "Part revision"),
    ("K1010", "Documentation required"),
    ("K1015", "Type of test"),
    ("K1017", "Test plan status"),
    ("K1021", "Manufacturer number"),
    ("K1022", "Manufacturer name"),
    ("K1041", "Drawing number"),
    ("K1042", "Drawing revision"),
    ("K1081", "Machine number"),
    ("K1082", "Machine description"),
    ("K1085", "Machine location"),
    ("K1086", "Operation"),
    ("K1100", "Plant"),
    ("K1101", "Department"),
    ("K1102", "Workplace"),
    ("K1103", "Cost center"),
    ("K1203", "Reason for test"),
    ("K1204", "Test date"),
    ("K1207", "Inspector info"),
    ("K1222", "Inspector name"),
    // Characteristic data (K2xxx)
    ("K2001", "Characteristic number"),
    ("K2002", "Characteristic description"),
    ("K2004", "Characteristic type"),
    ("K2005", "Characteristic class"),
    ("K2006", "Documentation required"),
    ("K2007", "Control type"),
    ("K2008", "Group type"),
    ("K2009", "Measured quantity"),
    ("K2011", "Distribution type"),
    ("K2022", "Decimal places"),
    ("K2100", "Target value"),
    ("K2101", "Nominal value"),
    ("K2110", "Lower specification limit"),
    ("K2111", "Upper specification limit"),
    ("K2112", "Lower allowance"),
    ("K2113", "Upper allowance"),
    ("K2120", "Lower limit type"),
    ("K2121", "Upper limit type"),
    ("K2142", "Unit"),
    ("K2152", "Calculated tolerance"),
    ("K2201", "Evaluation type"),
    ("K2202", "Gauge study type"),
    ("K2205", "Number of parts"),
    ("K2220", "Number of operators"),
    ("K2221", "Number of measurements"),
    ("K2222", "Number of reference measurements"),
    ("K2302", "Machine description"),
    ("K2303", "Operator description"),
    ("K2311", "Manufacturing type"),
    ("K2401", "Gauge number"),
    ("K2402", "Gauge description"),
    ("K2404", "Gauge resolution"),
    ("K2410", "Test location"),
    // Structure (K5xxx)
    ("K5001", "Structure type"),
    ("K5002", "Structure description"),
    // QRK data (K8xxx)
    ("K8500", "Subgroup size"),
    ("K8501", "Subgroup type"),
    ("K8503", "Subgroup type (attributive)"),
];

/// Lookup table from K-field code to description
#[derive(Debug, Clone)]
pub struct KFieldCatalog {
    descriptions: BTreeMap<String, String>,
}

impl Default for KFieldCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl KFieldCatalog {
    /// Catalog with the built-in descriptions only
    pub fn builtin() -> Self {
        Self {
            descriptions: BUILTIN_DESCRIPTIONS
                .iter()
                .map(|(code, description)| (code.to_string(), description.to_string()))
                .collect(),
        }
    }

    /// Built-in catalog overridden by the definitions file at `path`
    ///
    /// A missing file is not an error: a warning is logged and the built-in
    /// descriptions are kept.
    pub fn with_definitions_file(mut self, path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(
                    "K-field definitions file {} not found, using built-in descriptions",
                    path.display()
                );
                return Ok(self);
            }
            Err(e) => {
                return Err(QdasError::InvalidInput {
                    path: path.to_path_buf(),
                    reason: format!("cannot read K-field definitions: {}", e),
                });
            }
        };

        let overrides = parse_definitions(&content);
        info!(
            "Loaded {} K-field definitions from {}",
            overrides.len(),
            path.display()
        );
        self.descriptions.extend(overrides);
        Ok(self)
    }

    /// Description of a code; any `/index` suffix is ignored
    pub fn describe(&self, code: &str) -> Option<&str> {
        self.descriptions
            .get(base_kfield_code(code))
            .map(String::as_str)
    }

    /// Description of a code, or the code itself when unknown
    pub fn label(&self, code: &str) -> String {
        self.describe(code)
            .map(str::to_string)
            .unwrap_or_else(|| code.to_string())
    }

    pub fn len(&self) -> usize {
        self.descriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptions.is_empty()
    }
}

/// Parse `KEY = VALUE` lines; blank lines and `#` comments are skipped
pub fn parse_definitions(content: &str) -> BTreeMap<String, String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
        .filter(|(key, _)| !key.is_empty())
        .collect()
}
