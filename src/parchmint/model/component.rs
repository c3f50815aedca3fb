//! Components: device primitives with ports and an optional footprint.

use std::collections::HashSet;

use crate::parchmint::validation::{
    entity_context, is_dimension, test_dimension_value, test_string_value, DiagnosticKind,
    ValidationReport,
};

use super::{ComponentFeature, Coord, Port};

/// A device primitive (mixer, valve, ...) as placed on one layer.
///
/// A component spanning several layers is represented by one `Component`
/// per layer, each carrying only the ports on that layer.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Component {
    /// Component name.
    pub name: Option<String>,
    /// Component ID, unique in the document.
    pub id: Option<String>,
    /// Width of the component outline.
    pub x_span: Option<f64>,
    /// Height of the component outline.
    pub y_span: Option<f64>,
    /// Entity type (e.g. `rotary-mixer`).
    pub entity: Option<String>,
    /// Ports on this layer.
    pub ports: Vec<Port>,
    /// Footprint, if one was given.
    pub feature: Option<ComponentFeature>,
}

impl Component {
    /// Creates a component without a feature.
    pub fn new(
        name: impl Into<String>,
        id: impl Into<String>,
        x_span: f64,
        y_span: f64,
        entity: impl Into<String>,
        ports: Vec<Port>,
    ) -> Self {
        Self {
            name: Some(name.into()),
            id: Some(id.into()),
            x_span: Some(x_span),
            y_span: Some(y_span),
            entity: Some(entity.into()),
            ports,
            feature: None,
        }
    }

    /// Attaches a footprint.
    #[must_use]
    pub fn with_feature(mut self, feature: ComponentFeature) -> Self {
        self.feature = Some(feature);
        self
    }

    /// ID as a string slice, if set.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Context label used in diagnostics.
    #[must_use]
    pub fn context(&self) -> String {
        entity_context("Component", self.id().or(self.name.as_deref()))
    }

    /// Validates the component and everything it owns.
    ///
    /// All checks run; the report holds every problem found.
    #[must_use]
    pub fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::new();
        let context = self.context();

        test_string_value(self.name.as_deref(), "name", &context, &mut report);
        test_string_value(self.id(), "id", &context, &mut report);
        test_string_value(self.entity.as_deref(), "entity", &context, &mut report);
        let x_ok = test_dimension_value(self.x_span, "x-span", &context, &mut report);
        let y_ok = test_dimension_value(self.y_span, "y-span", &context, &mut report);

        if self.ports.is_empty() {
            report.error(
                DiagnosticKind::MissingPorts,
                &context,
                "component has no ports",
            );
        }

        for port in &self.ports {
            report.absorb(port.validate());
        }

        self.check_port_labels(&context, &mut report);
        self.check_port_overlap(&context, &mut report);

        if let (true, true, Some(x_span), Some(y_span)) = (x_ok, y_ok, self.x_span, self.y_span) {
            self.check_port_placement(x_span, y_span, &context, &mut report);
        }

        if let Some(feature) = &self.feature {
            report.absorb(feature.validate());
            self.check_feature_span(feature, &context, &mut report);
        }

        report
    }

    /// Port labels must be unique within the component.
    fn check_port_labels(&self, context: &str, report: &mut ValidationReport) {
        let mut seen: HashSet<&str> = HashSet::new();
        for label in self.ports.iter().filter_map(Port::label) {
            if !seen.insert(label) {
                report.error(
                    DiagnosticKind::DuplicatePortLabel,
                    context,
                    format!("duplicate port label '{label}'"),
                );
            }
        }
    }

    /// No two ports may share a position.
    fn check_port_overlap(&self, context: &str, report: &mut ValidationReport) {
        for (i, a) in self.ports.iter().enumerate() {
            let Some(pos_a) = &a.pos else { continue };
            for b in &self.ports[i + 1..] {
                let Some(pos_b) = &b.pos else { continue };
                if pos_a.is(pos_b) {
                    report.error(
                        DiagnosticKind::OverlappingPort,
                        context,
                        format!(
                            "ports '{}' and '{}' are both at ({}, {})",
                            a.label().unwrap_or_default(),
                            b.label().unwrap_or_default(),
                            pos_a.x,
                            pos_a.y
                        ),
                    );
                }
            }
        }
    }

    /// Every port must sit on the outline of the component rectangle.
    fn check_port_placement(
        &self,
        x_span: f64,
        y_span: f64,
        context: &str,
        report: &mut ValidationReport,
    ) {
        for port in &self.ports {
            let Some(pos) = &port.pos else { continue };
            if pos.is_finite() && !on_outline(pos, x_span, y_span) {
                report.error(
                    DiagnosticKind::PortOutOfBounds,
                    context,
                    format!(
                        "port '{}' at ({}, {}) is not on the {x_span} x {y_span} outline",
                        port.label().unwrap_or_default(),
                        pos.x,
                        pos.y
                    ),
                );
            }
        }
    }

    /// Warns when the footprint size disagrees with the component size.
    #[allow(clippy::float_cmp)]
    fn check_feature_span(
        &self,
        feature: &ComponentFeature,
        context: &str,
        report: &mut ValidationReport,
    ) {
        let spans = [self.x_span, self.y_span, feature.x_span, feature.y_span];
        if !spans.iter().all(|s| is_dimension(*s)) {
            return;
        }
        if self.x_span != feature.x_span || self.y_span != feature.y_span {
            report.warning(
                DiagnosticKind::FeatureSpanMismatch,
                context,
                format!(
                    "feature footprint {} x {} differs from component span {} x {}",
                    feature.x_span.unwrap_or_default(),
                    feature.y_span.unwrap_or_default(),
                    self.x_span.unwrap_or_default(),
                    self.y_span.unwrap_or_default()
                ),
            );
        }
    }
}

/// Returns `true` if `pos` lies on an edge of `[0, x_span] x [0, y_span]`.
#[allow(clippy::float_cmp)]
fn on_outline(pos: &Coord, x_span: f64, y_span: f64) -> bool {
    let within_x = (0.0..=x_span).contains(&pos.x);
    let within_y = (0.0..=y_span).contains(&pos.y);
    let on_vertical_edge = (pos.x == 0.0 || pos.x == x_span) && within_y;
    let on_horizontal_edge = (pos.y == 0.0 || pos.y == y_span) && within_x;
    on_vertical_edge || on_horizontal_edge
}

#[cfg(test)]
mod tests {
    use super::*;

    const LAYER_1: &str = "layer-1-id";
    const LAYER_2: &str = "layer-2-id";

    fn feature() -> ComponentFeature {
        ComponentFeature::new("feat", LAYER_1, 10.0, 10.0, Coord::new(6.0, 60.0), 10.0)
    }

    fn good_ports() -> Vec<Port> {
        vec![
            Port::new("port-1-label", LAYER_1, Coord::new(10.0, 0.0)),
            Port::new("port-2-label", LAYER_2, Coord::new(0.0, 5.0)),
        ]
    }

    fn good() -> Component {
        Component::new("comp-name", "comp-id", 10.0, 10.0, "comp-entity", good_ports())
            .with_feature(feature())
    }

    #[test]
    fn valid_with_feature() {
        let report = good().validate();
        assert!(report.is_valid(), "{:?}", report.diagnostics());
        assert!(report.diagnostics().is_empty());
    }

    #[test]
    fn valid_without_feature() {
        let c = Component::new("comp-name", "comp-id", 10.0, 10.0, "comp-entity", good_ports());
        assert!(c.validate().is_valid());
    }

    #[test]
    fn default_component_is_invalid() {
        let report = Component::default().validate();
        assert!(!report.is_valid());
        // name, id, entity, two spans, no ports
        assert_eq!(report.error_count(), 6);
    }

    #[test]
    fn bad_strings_and_spans() {
        for c in [
            Component { name: Some(String::new()), ..good() },
            Component { id: Some(String::new()), ..good() },
            Component { entity: None, ..good() },
            Component { x_span: Some(-312_423.0), ..good() },
            Component { y_span: Some(0.0), ..good() },
        ] {
            assert!(!c.validate().is_valid());
        }
    }

    #[test]
    fn invalid_ports() {
        let c = Component {
            ports: vec![Port::default(), Port::default()],
            ..good()
        };
        assert!(!c.validate().is_valid());
    }

    #[test]
    fn empty_port_list_is_invalid() {
        let c = Component { ports: vec![], ..good() };
        let report = c.validate();
        assert!(report.contains(DiagnosticKind::MissingPorts));
    }

    #[test]
    fn duplicate_port_labels() {
        let c = Component {
            ports: vec![
                Port::new("port-name", LAYER_1, Coord::new(5.0, 0.0)),
                Port::new("port-name", LAYER_1, Coord::new(0.0, 5.0)),
            ],
            ..good()
        };
        let report = c.validate();
        assert!(!report.is_valid());
        assert!(report.contains(DiagnosticKind::DuplicatePortLabel));
    }

    #[test]
    fn overlapping_port_locations() {
        let c = Component {
            ports: vec![
                Port::new("port-1", LAYER_1, Coord::new(5.0, 0.0)),
                Port::new("port-2", LAYER_1, Coord::new(5.0, 0.0)),
            ],
            ..good()
        };
        let report = c.validate();
        assert!(!report.is_valid());
        assert!(report.contains(DiagnosticKind::OverlappingPort));
    }

    #[test]
    fn port_locations_must_be_on_outline() {
        let mut c = Component {
            ports: vec![Port::new("port-1", LAYER_1, Coord::default())],
            ..good()
        };

        let cases = [
            ((0.0, 0.0), true),
            ((4.0, 10.0), true),
            ((10.0, 7.5), true),
            ((3.0, 6.0), false),
            ((0.0, 456.0), false),
            ((-1.0, 0.0), false),
        ];
        for ((x, y), expected) in cases {
            c.ports[0].pos = Some(Coord::new(x, y));
            assert_eq!(c.validate().is_valid(), expected, "port at ({x}, {y})");
        }
    }

    #[test]
    fn invalid_feature_invalidates_component() {
        let c = Component {
            feature: Some(ComponentFeature::default()),
            ..good()
        };
        assert!(!c.validate().is_valid());
    }

    #[test]
    fn feature_span_mismatch_is_a_warning() {
        let c = good().with_feature(ComponentFeature::new(
            "feat",
            LAYER_1,
            4500.0,
            1500.0,
            Coord::new(0.0, 0.0),
            10.0,
        ));
        let report = c.validate();
        assert!(report.is_valid());
        assert!(report.contains(DiagnosticKind::FeatureSpanMismatch));
    }

    #[test]
    fn all_problems_reported_in_one_pass() {
        let c = Component::new("", "", -123.0, 0.0, "", vec![Port::default(), Port::default()]);
        let report = c.validate();
        // name, id, entity, x-span, y-span, and two errors per default port
        assert_eq!(report.error_count(), 9);
    }

    #[test]
    fn validate_is_idempotent() {
        let c = good();
        assert_eq!(c.validate(), c.validate());
    }
}
