//! Diagnostics and the validation predicates shared by every entity.
//!
//! Validation never stops at the first problem. Each `validate()` returns a
//! [`ValidationReport`] holding every [`Diagnostic`] found for the entity and
//! its children, so a single pass surfaces everything that is wrong with a
//! document.

use std::fmt;

use serde::{Serialize, Serializer};

/// The severity level of a diagnostic.
///
/// - [`Severity::Error`] makes the owning entity (and the document) invalid
/// - [`Severity::Warning`] is advisory and does not affect validity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// The entity is invalid.
    Error,
    /// Suspicious but not invalid.
    Warning,
}

impl Severity {
    /// Returns `true` if this is an error severity.
    #[must_use]
    pub const fn is_error(self) -> bool {
        matches!(self, Self::Error)
    }

    /// Returns `true` if this is a warning severity.
    #[must_use]
    pub const fn is_warning(self) -> bool {
        matches!(self, Self::Warning)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
        }
    }
}

/// Which identifier registry rejected a duplicate ID.
///
/// Component features are keyed by the ID of the component they describe,
/// so they are checked against their own map rather than the document-wide
/// registry shared by layers, components, connections and segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdRegistry {
    /// Document-wide registry (layers, components, connections, segments).
    Global,
    /// Keys of the component feature map.
    ComponentFeature,
}

/// What kind of problem a diagnostic describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// An ID already seen in the given registry.
    DuplicateId {
        /// Registry that rejected the ID.
        registry: IdRegistry,
    },
    /// Two ports of one component (or one port array) share a label.
    DuplicatePortLabel,
    /// A dimension is missing, non-finite or not strictly positive.
    InvalidDimension,
    /// A required string is missing or empty.
    InvalidString,
    /// A coordinate is not finite.
    InvalidCoord,
    /// A required value is missing.
    MissingField,
    /// A component has no ports.
    MissingPorts,
    /// A connection has no sinks.
    MissingSinks,
    /// A connection sink is the same terminal as its source.
    SelfLoop,
    /// A connection segment starts and ends at the same point.
    DegenerateSegment,
    /// Two ports of one component share a position.
    OverlappingPort,
    /// A port is not on the outline of its component.
    PortOutOfBounds,
    /// A terminal does not resolve to a component port on its layer.
    UnresolvedTerminal,
    /// A component feature footprint differs from the component span.
    FeatureSpanMismatch,
    /// An entry does not have the expected JSON shape.
    Malformed,
    /// An entity refers to a layer that was never declared.
    UnknownLayer,
    /// A component lists the same layer more than once.
    RepeatedLayer,
    /// Segments were given for a connection that was never declared.
    OrphanSegment,
    /// A component feature matches no component.
    UnusedFeature,
}

impl DiagnosticKind {
    /// Returns the stable machine-readable code for this kind.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::DuplicateId {
                registry: IdRegistry::Global,
            } => "duplicate-id",
            Self::DuplicateId {
                registry: IdRegistry::ComponentFeature,
            } => "duplicate-feature-id",
            Self::DuplicatePortLabel => "duplicate-port-label",
            Self::InvalidDimension => "invalid-dimension",
            Self::InvalidString => "invalid-string",
            Self::InvalidCoord => "invalid-coord",
            Self::MissingField => "missing-field",
            Self::MissingPorts => "missing-ports",
            Self::MissingSinks => "missing-sinks",
            Self::SelfLoop => "self-loop",
            Self::DegenerateSegment => "degenerate-segment",
            Self::OverlappingPort => "overlapping-port",
            Self::PortOutOfBounds => "port-out-of-bounds",
            Self::UnresolvedTerminal => "unresolved-terminal",
            Self::FeatureSpanMismatch => "feature-span-mismatch",
            Self::Malformed => "malformed",
            Self::UnknownLayer => "unknown-layer",
            Self::RepeatedLayer => "repeated-layer",
            Self::OrphanSegment => "orphan-segment",
            Self::UnusedFeature => "unused-feature",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl Serialize for DiagnosticKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

/// A single validation or parsing finding.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    /// What kind of problem this is.
    pub kind: DiagnosticKind,
    /// Whether the problem invalidates the document.
    pub severity: Severity,
    /// The entity the problem belongs to (e.g. `Component 'mixer-1'`).
    pub context: String,
    /// Human-readable description.
    pub message: String,
}

impl Diagnostic {
    /// Creates an error diagnostic.
    pub fn error(
        kind: DiagnosticKind,
        context: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            severity: Severity::Error,
            context: context.into(),
            message: message.into(),
        }
    }

    /// Creates a warning diagnostic.
    pub fn warning(
        kind: DiagnosticKind,
        context: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            severity: Severity::Warning,
            context: context.into(),
            message: message.into(),
        }
    }

    /// Returns `true` if this diagnostic is an error.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        self.severity.is_error()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{}] {}: {}",
            self.severity, self.kind, self.context, self.message
        )
    }
}

/// Accumulated diagnostics for one validation pass.
///
/// An entity is valid iff its report holds no error diagnostics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    diagnostics: Vec<Diagnostic>,
}

impl ValidationReport {
    /// Creates an empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a diagnostic to the report.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        tracing::debug!(
            kind = %diagnostic.kind,
            severity = %diagnostic.severity,
            context = %diagnostic.context,
            "{}",
            diagnostic.message
        );
        self.diagnostics.push(diagnostic);
    }

    /// Adds an error diagnostic.
    pub fn error(
        &mut self,
        kind: DiagnosticKind,
        context: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.push(Diagnostic::error(kind, context, message));
    }

    /// Adds a warning diagnostic.
    pub fn warning(
        &mut self,
        kind: DiagnosticKind,
        context: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.push(Diagnostic::warning(kind, context, message));
    }

    /// Moves every diagnostic of `other` into this report.
    ///
    /// Returns whether `other` was valid, so composite validators can track
    /// a child's outcome without re-scanning.
    pub fn absorb(&mut self, other: Self) -> bool {
        let valid = other.is_valid();
        self.diagnostics.extend(other.diagnostics);
        valid
    }

    /// Returns `true` if no error diagnostic was recorded.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.diagnostics.iter().any(Diagnostic::is_error)
    }

    /// Number of error diagnostics.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }

    /// Number of warning diagnostics.
    #[must_use]
    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity.is_warning())
            .count()
    }

    /// Returns `true` if a diagnostic of the given kind was recorded.
    #[must_use]
    pub fn contains(&self, kind: DiagnosticKind) -> bool {
        self.diagnostics.iter().any(|d| d.kind == kind)
    }

    /// All diagnostics, in the order they were found.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Consumes the report and returns its diagnostics.
    #[must_use]
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

impl From<Vec<Diagnostic>> for ValidationReport {
    fn from(diagnostics: Vec<Diagnostic>) -> Self {
        Self { diagnostics }
    }
}

/// Formats the context label for an entity, e.g. `Component 'mixer-1'`.
#[must_use]
pub fn entity_context(entity: &str, id: Option<&str>) -> String {
    match id {
        Some(id) if !id.is_empty() => format!("{entity} '{id}'"),
        _ => entity.to_string(),
    }
}

/// Returns `true` if `value` is a usable dimension: present, finite and
/// strictly positive.
#[must_use]
pub fn is_dimension(value: Option<f64>) -> bool {
    matches!(value, Some(v) if v.is_finite() && v > 0.0)
}

/// Returns `true` if `value` is present and non-empty.
#[must_use]
pub fn is_valid_string(value: Option<&str>) -> bool {
    matches!(value, Some(s) if !s.is_empty())
}

/// Checks a dimension field, recording an `InvalidDimension` error on failure.
pub fn test_dimension_value(
    value: Option<f64>,
    field: &str,
    context: &str,
    report: &mut ValidationReport,
) -> bool {
    if is_dimension(value) {
        return true;
    }

    let message = match value {
        None => format!("field '{field}' is missing"),
        Some(v) => format!("field '{field}' must be a positive number, got {v}"),
    };
    report.error(DiagnosticKind::InvalidDimension, context, message);
    false
}

/// Checks a required string field, recording an `InvalidString` error on failure.
pub fn test_string_value(
    value: Option<&str>,
    field: &str,
    context: &str,
    report: &mut ValidationReport,
) -> bool {
    if is_valid_string(value) {
        return true;
    }

    let message = match value {
        None => format!("field '{field}' is missing"),
        Some(_) => format!("field '{field}' must not be empty"),
    };
    report.error(DiagnosticKind::InvalidString, context, message);
    false
}
