//! ParchMint device description parsing and validation.
//!
//! A ParchMint document describes a microfluidic device as layers,
//! components with ports, connections between ports, and physical features.
//! [`check_str`] and [`check_file`] run the whole pipeline: the
//! [`ParchmintParser`] builds a [`Device`] and records structural problems,
//! then [`Device::validate`] checks every entity.
//!
//! # Example
//!
//! ```
//! use parchmint_check::parchmint::check_str;
//!
//! let checked = check_str(r#"{
//!     "layers": [ { "id": "flow", "name": "flow" } ],
//!     "components": [ {
//!         "id": "p1", "name": "port", "layers": ["flow"], "entity": "PORT",
//!         "x-span": 10, "y-span": 10,
//!         "ports": [ { "label": "1", "layer": "flow", "x": 0, "y": 5 } ]
//!     } ]
//! }"#).unwrap();
//!
//! assert!(checked.valid);
//! assert_eq!(checked.device.component_count(), 1);
//! ```

pub mod error;
pub mod model;
pub mod parser;
pub mod validation;

pub use error::{ParchmintError, ParchmintResult};
pub use model::{
    Component, ComponentFeature, Connection, ConnectionSegment, Coord, Device, Layer, Port,
    Terminal,
};
pub use parser::ParchmintParser;
pub use validation::{Diagnostic, DiagnosticKind, IdRegistry, Severity, ValidationReport};

use std::path::Path;

use serde_json::Value;

/// Outcome of checking one document.
#[derive(Debug, Clone)]
pub struct Checked {
    /// The assembled device, including invalid entities.
    pub device: Device,
    /// Parser diagnostics followed by validation diagnostics.
    pub diagnostics: Vec<Diagnostic>,
    /// `true` if neither parsing nor validation found an error.
    pub valid: bool,
}

impl Checked {
    /// Number of error diagnostics.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }

    /// Number of warning diagnostics.
    #[must_use]
    pub fn warning_count(&self) -> usize {
        self.diagnostics.len() - self.error_count()
    }
}

/// Parses and validates a ParchMint document given as JSON text.
///
/// # Errors
///
/// Returns an error if `json` is not valid JSON or is structurally unusable
/// (see [`check_value`]).
pub fn check_str(json: &str) -> ParchmintResult<Checked> {
    let doc: Value = serde_json::from_str(json).map_err(ParchmintError::invalid_json)?;
    check_value(&doc)
}

/// Reads, parses and validates a ParchMint file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a usable document.
pub fn check_file(path: &Path) -> ParchmintResult<Checked> {
    let contents =
        std::fs::read_to_string(path).map_err(|e| ParchmintError::file_read(path, e))?;
    let checked = check_str(&contents)?;

    tracing::info!(
        path = %path.display(),
        valid = checked.valid,
        errors = checked.error_count(),
        warnings = checked.warning_count(),
        "Checked document"
    );

    Ok(checked)
}

/// Parses and validates an already decoded document.
///
/// # Errors
///
/// Returns an error if `doc` is not an object or one of its top-level
/// sections is not an array.
pub fn check_value(doc: &Value) -> ParchmintResult<Checked> {
    let mut parser = ParchmintParser::new();
    let device = parser.parse(doc)?;
    let parsed = parser.is_valid();

    let mut report = ValidationReport::from(parser.into_diagnostics());
    let validated = report.absorb(device.validate());

    Ok(Checked {
        device,
        diagnostics: report.into_diagnostics(),
        valid: parsed && validated,
    })
}
