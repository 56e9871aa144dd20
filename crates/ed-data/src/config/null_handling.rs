//! Null value handling for data loading

use serde::{Deserialize, Serialize};

/// Cell values read as missing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NullConfig {
    /// Patterns to treat as null
    pub patterns: Vec<String>,

    /// Whether to trim whitespace before checking
    pub trim_whitespace: bool,

    /// Case sensitive matching
    pub case_sensitive: bool,
}

impl Default for NullConfig {
    fn default() -> Self {
        Self {
            patterns: ["", "-", "N/A", "NA", "null", "NaN"]
                .iter()
                .map(|p| p.to_string())
                .collect(),
            trim_whitespace: true,
            case_sensitive: false,
        }
    }
}

impl NullConfig {
    /// Check if a value should be treated as null
    pub fn is_null(&self, value: &str) -> bool {
        let test_value = if self.trim_whitespace { value.trim() } else { value };

        self.patterns.iter().any(|pattern| {
            if self.case_sensitive {
                test_value == pattern
            } else {
                test_value.eq_ignore_ascii_case(pattern)
            }
        })
    }

    /// The cell as it should be parsed, or `None` when it is missing
    pub fn clean<'a>(&self, value: &'a str) -> Option<&'a str> {
        if self.is_null(value) {
            None
        } else if self.trim_whitespace {
            Some(value.trim())
        } else {
            Some(value)
        }
    }
}
