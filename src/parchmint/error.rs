//! Error types for ParchMint document loading.
//!
//! These cover failures that make a whole document unusable. Problems with
//! individual entries are never returned as errors; they are collected as
//! [`Diagnostic`](super::validation::Diagnostic)s instead.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for ParchMint operations.
pub type ParchmintResult<T> = Result<T, ParchmintError>;

/// Errors that prevent a ParchMint document from being checked at all.
#[derive(Debug, Error)]
pub enum ParchmintError {
    /// Failed to open or read the file.
    #[error("Failed to read file: {path}")]
    FileRead {
        /// Path to the file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The input is not well-formed JSON.
    #[error("Invalid JSON: {source}")]
    InvalidJson {
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// The top-level JSON value is not an object.
    #[error("Expected a JSON object at the top level, got {actual}")]
    NotAnObject {
        /// JSON type found instead.
        actual: String,
    },

    /// A top-level section exists but is not an array.
    #[error("Section '{section}' must be an array, got {actual}")]
    SectionNotArray {
        /// Name of the section (e.g. `components`).
        section: String,
        /// JSON type found instead.
        actual: String,
    },
}

impl ParchmintError {
    /// Creates a file read error.
    pub fn file_read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::FileRead {
            path: path.into(),
            source,
        }
    }

    /// Creates an invalid JSON error.
    #[must_use]
    pub const fn invalid_json(source: serde_json::Error) -> Self {
        Self::InvalidJson { source }
    }

    /// Creates a not-an-object error.
    pub fn not_an_object(actual: impl Into<String>) -> Self {
        Self::NotAnObject {
            actual: actual.into(),
        }
    }

    /// Creates a section-not-array error.
    pub fn section_not_array(section: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::SectionNotArray {
            section: section.into(),
            actual: actual.into(),
        }
    }
}

/// Returns a short human-readable name for a JSON value's type.
#[must_use]
pub const fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ParchmintError::section_not_array("components", "object");
        assert_eq!(
            err.to_string(),
            "Section 'components' must be an array, got object"
        );
    }

    #[test]
    fn not_an_object_display() {
        let err = ParchmintError::not_an_object(json_type_name(&serde_json::json!([1, 2])));
        assert_eq!(
            err.to_string(),
            "Expected a JSON object at the top level, got array"
        );
    }
}
