//! Ports and the terminals that reference them.

use crate::parchmint::validation::{
    entity_context, test_string_value, DiagnosticKind, ValidationReport,
};

use super::Coord;

/// A named, positioned connection point on a component.
///
/// `pos` is relative to the component origin.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Port {
    /// Port label, unique within its component.
    pub label: Option<String>,
    /// ID of the layer the port sits on.
    pub layer: Option<String>,
    /// Position relative to the component origin.
    pub pos: Option<Coord>,
}

impl Port {
    /// Creates a port with every field set.
    pub fn new(label: impl Into<String>, layer: impl Into<String>, pos: Coord) -> Self {
        Self {
            label: Some(label.into()),
            layer: Some(layer.into()),
            pos: Some(pos),
        }
    }

    /// Label as a string slice, if set.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Context label used in diagnostics.
    #[must_use]
    pub fn context(&self) -> String {
        entity_context("Port", self.label())
    }

    /// Validates the port: the label must be set and the position valid.
    #[must_use]
    pub fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::new();
        let context = self.context();

        test_string_value(self.label(), "label", &context, &mut report);

        match &self.pos {
            Some(pos) => {
                pos.check("pos", &context, &mut report);
            }
            None => report.error(
                DiagnosticKind::MissingField,
                &context,
                "field 'pos' is missing",
            ),
        }

        report
    }
}

/// A connection endpoint: a (component, port) pair.
///
/// Terminals hold keys, not references. The owning layer resolves them
/// against its components when it validates.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Terminal {
    /// ID of the referenced component.
    pub component: String,
    /// Label of the referenced port.
    pub port: Option<String>,
}

impl Terminal {
    /// Creates a terminal referencing `port` on `component`.
    pub fn new(component: impl Into<String>, port: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            port: Some(port.into()),
        }
    }

    /// Creates a terminal that names a component but no port.
    pub fn component_only(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            port: None,
        }
    }
}

impl std::fmt::Display for Terminal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.port {
            Some(port) => write!(f, "{}.{port}", self.component),
            None => write!(f, "{}.<no port>", self.component),
        }
    }
}
