//! Connections: nets from one source terminal to one or more sinks.

use crate::parchmint::validation::{
    entity_context, test_string_value, DiagnosticKind, ValidationReport,
};

use super::{ConnectionSegment, Terminal};

/// A net linking a source terminal to sink terminals, realised by
/// channel segments.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Connection {
    /// Connection name.
    pub name: Option<String>,
    /// Connection ID, unique in the document.
    pub id: Option<String>,
    /// ID of the layer the connection runs on.
    pub layer: Option<String>,
    /// Where the net starts.
    pub source: Option<Terminal>,
    /// Where the net ends.
    pub sinks: Vec<Terminal>,
    /// Physical channel segments, in input order.
    pub segments: Vec<ConnectionSegment>,
}

impl Connection {
    /// Creates a connection without segments.
    pub fn new(
        name: impl Into<String>,
        id: impl Into<String>,
        source: Terminal,
        sinks: Vec<Terminal>,
    ) -> Self {
        Self {
            name: Some(name.into()),
            id: Some(id.into()),
            layer: None,
            source: Some(source),
            sinks,
            segments: Vec::new(),
        }
    }

    /// Sets the channel segments.
    #[must_use]
    pub fn with_segments(mut self, segments: Vec<ConnectionSegment>) -> Self {
        self.segments = segments;
        self
    }

    /// ID as a string slice, if set.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Source followed by every sink.
    pub fn terminals(&self) -> impl Iterator<Item = &Terminal> {
        self.source.iter().chain(&self.sinks)
    }

    /// Context label used in diagnostics.
    #[must_use]
    pub fn context(&self) -> String {
        entity_context("Connection", self.id().or(self.name.as_deref()))
    }

    /// Validates the connection on its own.
    ///
    /// Whether the terminals exist is decided by the owning
    /// [`Layer`](super::Layer), which knows the components.
    #[must_use]
    pub fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::new();
        let context = self.context();

        test_string_value(self.name.as_deref(), "name", &context, &mut report);
        test_string_value(self.id(), "id", &context, &mut report);

        if self.source.is_none() {
            report.error(
                DiagnosticKind::MissingField,
                &context,
                "field 'source' is missing",
            );
        }

        if self.sinks.is_empty() {
            report.error(DiagnosticKind::MissingSinks, &context, "connection has no sinks");
        }

        if let Some(source) = &self.source {
            for sink in self.sinks.iter().filter(|sink| *sink == source) {
                report.error(
                    DiagnosticKind::SelfLoop,
                    &context,
                    format!("sink {sink} is the same terminal as the source"),
                );
            }
        }

        for segment in &self.segments {
            report.absorb(segment.validate());
        }

        report
    }
}
