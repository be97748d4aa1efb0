//! Recoverable-error reporting
//!
//! Problems that do not stop a resolution pass (an unresolvable content
//! root, an unreadable file) are collected into [`Warnings`] and reported as
//! one batch once the pass completes.

use crate::scan::{ExtractionError, ScanError};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::fmt;

/// Number of warnings listed individually in a summary.
const SUMMARY_LIMIT: usize = 5;

/// A recoverable problem encountered during a pass.
#[derive(Debug)]
#[non_exhaustive]
pub enum Warning {
    /// A content pattern or root could not be resolved
    Scan(ScanError),
    /// A matched file could not be read
    Extraction(ExtractionError),
}

impl Warning {
    /// Short machine-readable kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Warning::Scan(_) => "scan",
            Warning::Extraction(_) => "extraction",
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::Scan(e) => write!(f, "{}", e),
            Warning::Extraction(e) => write!(f, "{}", e),
        }
    }
}

impl From<ScanError> for Warning {
    fn from(e: ScanError) -> Self {
        Warning::Scan(e)
    }
}

impl From<ExtractionError> for Warning {
    fn from(e: ExtractionError) -> Self {
        Warning::Extraction(e)
    }
}

impl Serialize for Warning {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Warning", 2)?;
        state.serialize_field("kind", self.kind())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Ordered batch of warnings from one pass.
#[derive(Debug, Default, Serialize)]
#[serde(transparent)]
pub struct Warnings {
    items: Vec<Warning>,
}

impl Warnings {
    /// Create an empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a warning.
    pub fn push(&mut self, warning: impl Into<Warning>) {
        self.items.push(warning.into());
    }

    /// Number of warnings.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the pass produced no warnings.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate warnings in the order they were recorded.
    pub fn iter(&self) -> std::slice::Iter<'_, Warning> {
        self.items.iter()
    }

    /// Summary lines: a header, the first few warnings, and a count of the rest.
    pub fn summary_lines(&self) -> Vec<String> {
        if self.items.is_empty() {
            return Vec::new();
        }
        let mut lines = vec![format!("Warnings ({}):", self.items.len())];
        for warning in self.items.iter().take(SUMMARY_LIMIT) {
            lines.push(format!("  - {}", warning));
        }
        if self.items.len() > SUMMARY_LIMIT {
            lines.push(format!("  ... and {} more", self.items.len() - SUMMARY_LIMIT));
        }
        lines
    }
}

impl<W: Into<Warning>> Extend<W> for Warnings {
    fn extend<I: IntoIterator<Item = W>>(&mut self, iter: I) {
        self.items.extend(iter.into_iter().map(Into::into));
    }
}

impl<'a> IntoIterator for &'a Warnings {
    type Item = &'a Warning;
    type IntoIter = std::slice::Iter<'a, Warning>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
