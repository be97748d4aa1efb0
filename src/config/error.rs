//! Configuration errors

use std::path::PathBuf;
use thiserror::Error;

/// Malformed, missing or unreadable configuration.
///
/// Always fatal: resolution stops before any content is scanned.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error
    #[error("Failed to parse TOML config: {0}")]
    Parse(#[from] toml::de::Error),
    /// JSON parsing or typed decoding error
    #[error("Failed to parse JSON config: {0}")]
    Json(#[from] serde_json::Error),
    /// JSON5 parsing error
    #[error("Failed to parse JSON5 config: {0}")]
    Json5(#[from] json5::Error),
    /// A key holds a value of the wrong kind
    #[error("Invalid config: '{key}' must be {expected}, found {found}")]
    Shape {
        /// Dotted key path
        key: String,
        /// Expected kind
        expected: &'static str,
        /// Kind actually present
        found: &'static str,
    },
    /// Validation error
    #[error("Config validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<String>),
    /// No configuration file was given or discovered
    #[error("No windscan.toml, windscan.json or windscan.json5 found")]
    NotFound,
    /// The file extension does not name a supported format
    #[error("Unsupported config format: '{}'", .0.display())]
    UnsupportedFormat(PathBuf),
}

/// A single validation problem, reported with the field it concerns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigValidationError {
    /// Path to the invalid field (e.g., "content.files[2]")
    pub field: String,
    /// Error message
    pub message: String,
}

impl ConfigValidationError {
    pub(crate) fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field: field.into(), message: message.into() }
    }
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "'{}' {}", self.field, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_lists_every_problem() {
        let err = ConfigError::Validation(vec![
            ConfigValidationError::new("content", "is required").to_string(),
            ConfigValidationError::new("plugins[0].name", "must not be empty").to_string(),
        ]);
        let message = err.to_string();
        assert!(message.contains("  - 'content' is required"));
        assert!(message.contains("  - 'plugins[0].name' must not be empty"));
    }

    #[test]
    fn test_shape_error_names_key() {
        let err = ConfigError::Shape { key: "theme".to_string(), expected: "a mapping", found: "a string" };
        assert_eq!(err.to_string(), "Invalid config: 'theme' must be a mapping, found a string");
    }
}
