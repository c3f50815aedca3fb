//! Physical features: component footprints and channel segments.

use crate::parchmint::validation::{
    entity_context, test_dimension_value, DiagnosticKind, ValidationReport,
};

use super::Coord;

/// The physical footprint of a component on one layer.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ComponentFeature {
    /// Feature name.
    pub name: Option<String>,
    /// ID of the layer the footprint is drawn on.
    pub layer: Option<String>,
    /// Footprint width.
    pub x_span: Option<f64>,
    /// Footprint height.
    pub y_span: Option<f64>,
    /// Placement of the footprint origin on the device.
    pub location: Option<Coord>,
    /// Feature depth.
    pub depth: Option<f64>,
}

impl ComponentFeature {
    /// Creates a feature with every field set.
    pub fn new(
        name: impl Into<String>,
        layer: impl Into<String>,
        x_span: f64,
        y_span: f64,
        location: Coord,
        depth: f64,
    ) -> Self {
        Self {
            name: Some(name.into()),
            layer: Some(layer.into()),
            x_span: Some(x_span),
            y_span: Some(y_span),
            location: Some(location),
            depth: Some(depth),
        }
    }

    /// Validates the footprint: spans and depth are dimensions and the
    /// location is set and finite.
    #[must_use]
    pub fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::new();
        let context = entity_context("Component feature", self.name.as_deref());

        test_dimension_value(self.x_span, "x-span", &context, &mut report);
        test_dimension_value(self.y_span, "y-span", &context, &mut report);
        test_dimension_value(self.depth, "depth", &context, &mut report);

        match &self.location {
            Some(location) => {
                location.check("location", &context, &mut report);
            }
            None => report.error(
                DiagnosticKind::MissingField,
                &context,
                "field 'location' is missing",
            ),
        }

        report
    }
}

/// One straight piece of a channel realising a connection.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConnectionSegment {
    /// Segment name.
    pub name: Option<String>,
    /// Segment ID.
    pub id: Option<String>,
    /// ID of the layer the segment is drawn on.
    pub layer: Option<String>,
    /// ID of the connection this segment realises.
    pub connection: Option<String>,
    /// Feature type (e.g. `channel`).
    pub kind: Option<String>,
    /// Channel width, tangential to the direction of travel.
    pub width: Option<f64>,
    /// Channel depth.
    pub depth: Option<f64>,
    /// Start of the segment.
    pub source_point: Option<Coord>,
    /// End of the segment.
    pub sink_point: Option<Coord>,
}

impl ConnectionSegment {
    /// Creates a segment from its geometry.
    #[must_use]
    pub fn new(width: f64, depth: f64, source_point: Coord, sink_point: Coord) -> Self {
        Self {
            width: Some(width),
            depth: Some(depth),
            source_point: Some(source_point),
            sink_point: Some(sink_point),
            ..Self::default()
        }
    }

    /// Sets the segment name and ID.
    #[must_use]
    pub fn with_identity(mut self, name: impl Into<String>, id: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self.id = Some(id.into());
        self
    }

    /// Context label used in diagnostics.
    #[must_use]
    pub fn context(&self) -> String {
        entity_context("Segment", self.id.as_deref().or(self.name.as_deref()))
    }

    /// Validates the segment: width and depth are dimensions, both end
    /// points are set and valid, and they are not the same point.
    #[must_use]
    pub fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::new();
        let context = self.context();

        test_dimension_value(self.width, "width", &context, &mut report);
        test_dimension_value(self.depth, "depth", &context, &mut report);

        let source = Self::check_point(self.source_point.as_ref(), "source", &context, &mut report);
        let sink = Self::check_point(self.sink_point.as_ref(), "sink", &context, &mut report);

        if let (Some(source), Some(sink)) = (source, sink) {
            if source.is(sink) {
                report.error(
                    DiagnosticKind::DegenerateSegment,
                    &context,
                    format!(
                        "source and sink are the same point ({}, {})",
                        source.x, source.y
                    ),
                );
            }
        }

        report
    }

    /// Returns the point if it is present and valid.
    fn check_point<'a>(
        point: Option<&'a Coord>,
        field: &str,
        context: &str,
        report: &mut ValidationReport,
    ) -> Option<&'a Coord> {
        match point {
            Some(p) if p.check(field, context, report) => Some(p),
            Some(_) => None,
            None => {
                report.error(
                    DiagnosticKind::MissingField,
                    context,
                    format!("field '{field}' is missing"),
                );
                None
            }
        }
    }
}
