//! Builds the device graph from a parsed ParchMint document.
//!
//! # Parse order
//!
//! Features are merged into entities by map lookup when the entity is
//! built, never retroactively. The individual passes therefore have a
//! precondition:
//!
//! - [`ParchmintParser::parse_component_features`] must run before
//!   [`ParchmintParser::parse_components`]
//! - [`ParchmintParser::parse_connection_features`] must run before
//!   [`ParchmintParser::parse_connections`]
//!
//! Run out of order, components and connections still parse but carry no
//! feature or segments. [`ParchmintParser::parse`] runs every pass in the
//! right order and assembles the layers.
//!
//! # Identifier registries
//!
//! Layer, component, connection and segment IDs share one document-wide
//! registry. Component features are keyed by the ID of the component they
//! describe and are checked only against the feature map itself; diagnostics
//! name the registry that rejected an ID (see [`IdRegistry`]).

mod raw;

use std::collections::HashSet;

use indexmap::{IndexMap, IndexSet};
use serde::Deserialize;
use serde_json::Value;

pub use raw::{FeatureEntry, FeatureKind, RawComponentFeature, RawConnectionFeature};
use raw::{RawComponent, RawConnection, RawLayer, RawPort};

use crate::parchmint::error::{json_type_name, ParchmintError, ParchmintResult};
use crate::parchmint::model::{
    Component, ComponentFeature, Connection, ConnectionSegment, Device, Layer, Port,
};
use crate::parchmint::validation::{
    entity_context, Diagnostic, DiagnosticKind, IdRegistry, ValidationReport,
};

/// Parser state for one document.
///
/// Parsing never stops at a bad entry: the parser records a diagnostic,
/// marks itself invalid and carries on so that one pass reports every
/// problem. Entries with a duplicate ID are dropped; everything else is kept
/// for validation to judge.
#[derive(Debug)]
pub struct ParchmintParser {
    valid: bool,
    id_set: HashSet<String>,
    comp_features: IndexMap<String, ComponentFeature>,
    conn_features: IndexMap<String, Vec<ConnectionSegment>>,
    components: IndexMap<String, Vec<Component>>,
    connections: IndexMap<String, Vec<Connection>>,
    diagnostics: ValidationReport,
}

impl Default for ParchmintParser {
    fn default() -> Self {
        Self {
            valid: true,
            id_set: HashSet::new(),
            comp_features: IndexMap::new(),
            conn_features: IndexMap::new(),
            components: IndexMap::new(),
            connections: IndexMap::new(),
            diagnostics: ValidationReport::new(),
        }
    }
}

impl ParchmintParser {
    /// Creates a parser with empty registries.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// `false` once any invalid data has been seen.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.valid
    }

    /// Diagnostics recorded while parsing.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        self.diagnostics.diagnostics()
    }

    /// Consumes the parser and returns its diagnostics.
    #[must_use]
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics.into_diagnostics()
    }

    /// Component features keyed by component ID.
    #[must_use]
    pub const fn component_features(&self) -> &IndexMap<String, ComponentFeature> {
        &self.comp_features
    }

    /// Connection segments keyed by connection ID, in input order.
    #[must_use]
    pub const fn connection_features(&self) -> &IndexMap<String, Vec<ConnectionSegment>> {
        &self.conn_features
    }

    /// Components keyed by layer ID.
    #[must_use]
    pub const fn components(&self) -> &IndexMap<String, Vec<Component>> {
        &self.components
    }

    /// Connections keyed by layer ID.
    #[must_use]
    pub const fn connections(&self) -> &IndexMap<String, Vec<Connection>> {
        &self.connections
    }

    /// Parses a whole document and assembles the device.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not a JSON object or one of its
    /// sections is not an array. Problems with individual entries are
    /// recorded as diagnostics instead.
    pub fn parse(&mut self, doc: &Value) -> ParchmintResult<Device> {
        if !doc.is_object() {
            return Err(ParchmintError::not_an_object(json_type_name(doc)));
        }

        let name = doc.get("name").and_then(Value::as_str).map(str::to_string);
        let layers = self.parse_layers_array(doc)?;
        let layers = self.register_layers(layers);

        self.parse_component_features(doc)?;
        self.parse_connection_features(doc)?;
        self.parse_components(doc)?;
        self.parse_connections(doc)?;

        let layers = self.assemble(layers);

        tracing::info!(
            layers = layers.len(),
            components = self.components.values().map(Vec::len).sum::<usize>(),
            connections = self.connections.values().map(Vec::len).sum::<usize>(),
            valid = self.valid,
            "Parsed ParchMint document"
        );

        Ok(Device { name, layers })
    }

    /// Maps each entry of `layers` to a [`Layer`] with its name and ID.
    ///
    /// IDs are not checked for uniqueness here.
    ///
    /// # Errors
    ///
    /// Returns an error if `layers` is present but not an array.
    pub fn parse_layers_array(&mut self, doc: &Value) -> ParchmintResult<Vec<Layer>> {
        let mut layers = Vec::new();
        for (index, value) in section(doc, "layers")?.iter().enumerate() {
            match RawLayer::deserialize(value) {
                Ok(raw) => layers.push(Layer::from(raw)),
                Err(e) => self.malformed("layers", index, value, &e),
            }
        }
        Ok(layers)
    }

    /// Collects the component features of the `features` array.
    ///
    /// An entry is a component feature if it has an `x-span` or `y-span`
    /// key. A second feature for the same component is rejected and the
    /// first one kept.
    ///
    /// # Errors
    ///
    /// Returns an error if `features` is present but not an array.
    pub fn parse_component_features(&mut self, doc: &Value) -> ParchmintResult<()> {
        for (index, value) in section(doc, "features")?.iter().enumerate() {
            match FeatureEntry::classify(value) {
                FeatureEntry::Component(raw) => {
                    if self.comp_features.contains_key(&raw.id) {
                        self.reject_duplicate(
                            IdRegistry::ComponentFeature,
                            "features",
                            index,
                            &raw.id,
                            raw.name.as_deref(),
                        );
                        continue;
                    }
                    self.comp_features.insert(raw.id.clone(), raw.into());
                }
                FeatureEntry::Malformed {
                    kind: FeatureKind::Component,
                    error,
                } => self.malformed_with("features", index, value, &error),
                FeatureEntry::Unrecognized => {
                    tracing::trace!(index, "Ignoring unrecognised feature entry");
                }
                FeatureEntry::Connection(_) | FeatureEntry::Malformed { .. } => {}
            }
        }
        Ok(())
    }

    /// Collects the connection segments of the `features` array.
    ///
    /// An entry is a segment if it has a `type` key. Segment IDs go through
    /// the document-wide registry; segments are appended per connection in
    /// input order.
    ///
    /// # Errors
    ///
    /// Returns an error if `features` is present but not an array.
    pub fn parse_connection_features(&mut self, doc: &Value) -> ParchmintResult<()> {
        for (index, value) in section(doc, "features")?.iter().enumerate() {
            match FeatureEntry::classify(value) {
                FeatureEntry::Connection(raw) => {
                    if !self.is_unique_id(&raw.id) {
                        self.reject_duplicate(
                            IdRegistry::Global,
                            "features",
                            index,
                            &raw.id,
                            raw.name.as_deref(),
                        );
                        continue;
                    }
                    self.conn_features
                        .entry(raw.connection.clone())
                        .or_default()
                        .push(raw.into());
                }
                FeatureEntry::Malformed {
                    kind: FeatureKind::Connection,
                    error,
                } => self.malformed_with("features", index, value, &error),
                FeatureEntry::Component(_)
                | FeatureEntry::Malformed { .. }
                | FeatureEntry::Unrecognized => {}
            }
        }
        Ok(())
    }

    /// Builds the per-layer components of the `components` array.
    ///
    /// A component with a duplicate ID is skipped entirely. Otherwise one
    /// [`Component`] is created for every distinct layer the entry lists,
    /// carrying only the ports on that layer and the component feature
    /// parsed earlier for its ID, if any. A component listing no layers has
    /// nowhere to go and is an error; a layer listed twice is a warning.
    ///
    /// # Errors
    ///
    /// Returns an error if `components` is present but not an array.
    pub fn parse_components(&mut self, doc: &Value) -> ParchmintResult<()> {
        for (index, value) in section(doc, "components")?.iter().enumerate() {
            let raw = match RawComponent::deserialize(value) {
                Ok(raw) => raw,
                Err(e) => {
                    self.malformed("components", index, value, &e);
                    continue;
                }
            };

            let context = entity_context("Component", Some(&raw.id));
            let ports = self.parse_port_list(&raw.ports, &context);

            if !self.is_unique_id(&raw.id) {
                self.reject_duplicate(
                    IdRegistry::Global,
                    "components",
                    index,
                    &raw.id,
                    raw.name.as_deref(),
                );
                continue;
            }

            if raw.layers.is_empty() {
                self.valid = false;
                tracing::warn!(id = %raw.id, "Component lists no layers");
                self.diagnostics.error(
                    DiagnosticKind::MissingField,
                    &context,
                    "component lists no layers",
                );
                continue;
            }

            let mut layers: IndexSet<&str> = IndexSet::with_capacity(raw.layers.len());
            for layer in &raw.layers {
                if !layers.insert(layer.as_str()) {
                    self.diagnostics.warning(
                        DiagnosticKind::RepeatedLayer,
                        &context,
                        format!("layer '{layer}' is listed more than once"),
                    );
                }
            }

            for (layer, layer_ports) in &ports {
                if !layers.contains(layer.as_str()) {
                    self.diagnostics.warning(
                        DiagnosticKind::UnknownLayer,
                        &context,
                        format!(
                            "{} port(s) on layer '{layer}' which the component does not list",
                            layer_ports.len()
                        ),
                    );
                }
            }

            let feature = self.comp_features.get(&raw.id).cloned();
            for layer in layers {
                let component = Component {
                    name: raw.name.clone(),
                    id: Some(raw.id.clone()),
                    x_span: raw.x_span,
                    y_span: raw.y_span,
                    entity: raw.entity.clone(),
                    ports: ports.get(layer).cloned().unwrap_or_default(),
                    feature: feature.clone(),
                };
                self.components
                    .entry(layer.to_string())
                    .or_default()
                    .push(component);
            }
        }
        Ok(())
    }

    /// Builds the connections of the `connections` array, grouped by layer.
    ///
    /// A connection with a duplicate ID is skipped. Segments parsed earlier
    /// for the connection's ID are attached.
    ///
    /// # Errors
    ///
    /// Returns an error if `connections` is present but not an array.
    pub fn parse_connections(&mut self, doc: &Value) -> ParchmintResult<()> {
        for (index, value) in section(doc, "connections")?.iter().enumerate() {
            let raw = match RawConnection::deserialize(value) {
                Ok(raw) => raw,
                Err(e) => {
                    self.malformed("connections", index, value, &e);
                    continue;
                }
            };

            if !self.is_unique_id(&raw.id) {
                self.reject_duplicate(
                    IdRegistry::Global,
                    "connections",
                    index,
                    &raw.id,
                    raw.name.as_deref(),
                );
                continue;
            }

            let connection = Connection {
                name: raw.name,
                segments: self.conn_features.get(&raw.id).cloned().unwrap_or_default(),
                id: Some(raw.id),
                layer: Some(raw.layer.clone()),
                source: raw.source.map(Into::into),
                sinks: raw.sinks.into_iter().map(Into::into).collect(),
            };
            self.connections
                .entry(raw.layer)
                .or_default()
                .push(connection);
        }
        Ok(())
    }

    /// Groups the given port entries by layer.
    ///
    /// Labels must be unique across the whole array, even between layers. A
    /// duplicate marks the parser invalid but both ports are kept.
    pub fn parse_ports(&mut self, ports: &[Value]) -> IndexMap<String, Vec<Port>> {
        self.parse_port_list(ports, "Port list")
    }

    fn parse_port_list(&mut self, ports: &[Value], context: &str) -> IndexMap<String, Vec<Port>> {
        let mut by_layer: IndexMap<String, Vec<Port>> = IndexMap::new();
        let mut labels: HashSet<String> = HashSet::new();

        for (index, value) in ports.iter().enumerate() {
            let raw = match RawPort::deserialize(value) {
                Ok(raw) => raw,
                Err(e) => {
                    self.malformed("ports", index, value, &e);
                    continue;
                }
            };

            if let Some(label) = &raw.label {
                if !labels.insert(label.clone()) {
                    self.valid = false;
                    tracing::warn!(label = %label, "Duplicate port label");
                    self.diagnostics.error(
                        DiagnosticKind::DuplicatePortLabel,
                        context,
                        format!("duplicate port label '{label}' at index {index}"),
                    );
                }
            }

            by_layer
                .entry(raw.layer.clone())
                .or_default()
                .push(Port::from(raw));
        }

        by_layer
    }

    /// Returns `true` and records `id` if it has not been seen before.
    pub fn is_unique_id(&mut self, id: &str) -> bool {
        if self.id_set.contains(id) {
            return false;
        }
        self.id_set.insert(id.to_string());
        true
    }

    /// Registers layer IDs, dropping layers whose ID is already taken.
    fn register_layers(&mut self, layers: Vec<Layer>) -> Vec<Layer> {
        let mut kept = Vec::with_capacity(layers.len());
        for (index, layer) in layers.into_iter().enumerate() {
            if let Some(id) = layer.id() {
                if !self.is_unique_id(id) {
                    let id = id.to_string();
                    self.reject_duplicate(
                        IdRegistry::Global,
                        "layers",
                        index,
                        &id,
                        layer.name.as_deref(),
                    );
                    continue;
                }
            }
            kept.push(layer);
        }
        kept
    }

    /// Copies each layer's components and connections into the layer and
    /// warns about everything that found no home.
    ///
    /// The buckets stay in the parser so that [`Self::components`] and
    /// [`Self::connections`] remain readable after [`Self::parse`].
    fn assemble(&mut self, mut layers: Vec<Layer>) -> Vec<Layer> {
        let declared: HashSet<String> = layers
            .iter()
            .filter_map(Layer::id)
            .map(str::to_string)
            .collect();

        for layer in &mut layers {
            let Some(id) = layer.id.as_deref() else { continue };
            if let Some(components) = self.components.get(id) {
                layer.components.clone_from(components);
            }
            if let Some(connections) = self.connections.get(id) {
                layer.connections.clone_from(connections);
            }
        }

        let mut warnings = Vec::new();

        for (layer, components) in &self.components {
            if declared.contains(layer) {
                continue;
            }
            for component in components {
                warnings.push(Diagnostic::warning(
                    DiagnosticKind::UnknownLayer,
                    component.context(),
                    format!("placed on undeclared layer '{layer}'"),
                ));
            }
        }

        for (layer, connections) in &self.connections {
            if declared.contains(layer) {
                continue;
            }
            for connection in connections {
                warnings.push(Diagnostic::warning(
                    DiagnosticKind::UnknownLayer,
                    connection.context(),
                    format!("runs on undeclared layer '{layer}'"),
                ));
            }
        }

        let connection_ids: HashSet<&str> = self
            .connections
            .values()
            .flatten()
            .filter_map(Connection::id)
            .collect();
        for (connection, segments) in &self.conn_features {
            if !connection_ids.contains(connection.as_str()) {
                warnings.push(Diagnostic::warning(
                    DiagnosticKind::OrphanSegment,
                    entity_context("Connection", Some(connection.as_str())),
                    format!("{} segment(s) for an undeclared connection", segments.len()),
                ));
            }
        }

        let component_ids: HashSet<&str> = self
            .components
            .values()
            .flatten()
            .filter_map(Component::id)
            .collect();
        for (id, feature) in &self.comp_features {
            if !component_ids.contains(id.as_str()) {
                warnings.push(Diagnostic::warning(
                    DiagnosticKind::UnusedFeature,
                    entity_context("Component feature", feature.name.as_deref().or(Some(id.as_str()))),
                    format!("no component with ID '{id}'"),
                ));
            }
        }

        for warning in warnings {
            self.diagnostics.push(warning);
        }

        layers
    }

    fn reject_duplicate(
        &mut self,
        registry: IdRegistry,
        section: &str,
        index: usize,
        id: &str,
        name: Option<&str>,
    ) {
        self.valid = false;
        tracing::warn!(id, section, index, "Duplicate ID, skipping entry");
        self.diagnostics.error(
            DiagnosticKind::DuplicateId { registry },
            format!("{section}[{index}]"),
            format!(
                "duplicate ID '{id}'; skipping entry named '{}'",
                name.unwrap_or_default()
            ),
        );
    }

    fn malformed(&mut self, section: &str, index: usize, value: &Value, error: &serde_json::Error) {
        self.malformed_with(section, index, value, &error.to_string());
    }

    fn malformed_with(&mut self, section: &str, index: usize, value: &Value, error: &str) {
        self.valid = false;
        let id = value.get("id").and_then(Value::as_str);
        tracing::warn!(section, index, id, error, "Malformed entry, skipping");
        self.diagnostics.error(
            DiagnosticKind::Malformed,
            match id {
                Some(id) => format!("{section}[{index}] '{id}'"),
                None => format!("{section}[{index}]"),
            },
            error.to_string(),
        );
    }
}

/// Returns the entries of a top-level section; a missing section is empty.
fn section<'a>(doc: &'a Value, name: &str) -> ParchmintResult<&'a [Value]> {
    match doc.get(name) {
        None | Some(Value::Null) => Ok(&[]),
        Some(Value::Array(entries)) => Ok(entries.as_slice()),
        Some(other) => Err(ParchmintError::section_not_array(name, json_type_name(other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unique_id_registry() {
        let mut pp = ParchmintParser::new();
        assert!(pp.is_unique_id("a"));
        assert!(pp.is_unique_id("b"));
        assert!(!pp.is_unique_id("a"));
    }

    #[test]
    fn missing_sections_are_empty() {
        let mut pp = ParchmintParser::new();
        let device = pp.parse(&json!({})).unwrap();
        assert!(device.layers.is_empty());
        assert!(pp.is_valid());
        assert!(pp.diagnostics().is_empty());
    }

    #[test]
    fn section_must_be_array() {
        let mut pp = ParchmintParser::new();
        let err = pp.parse_components(&json!({ "components": {} })).unwrap_err();
        assert!(matches!(err, ParchmintError::SectionNotArray { .. }));
    }

    #[test]
    fn document_must_be_object() {
        let mut pp = ParchmintParser::new();
        assert!(matches!(
            pp.parse(&json!([])),
            Err(ParchmintError::NotAnObject { .. })
        ));
    }

    #[test]
    fn malformed_component_is_skipped() {
        let mut pp = ParchmintParser::new();
        let doc = json!({ "components": [ { "name": "no-id", "layers": ["l"] } ] });
        pp.parse_components(&doc).unwrap();
        assert!(!pp.is_valid());
        assert!(pp.components().is_empty());
        assert_eq!(pp.diagnostics()[0].kind, DiagnosticKind::Malformed);
    }

    #[test]
    fn malformed_port_skips_only_that_port() {
        let mut pp = ParchmintParser::new();
        let ports = [
            json!({ "label": "a", "layer": "l", "x": 0, "y": 0 }),
            json!({ "label": "b", "x": 0, "y": 5 }),
        ];
        let by_layer = pp.parse_ports(&ports);
        assert!(!pp.is_valid());
        assert_eq!(by_layer["l"].len(), 1);
    }

    #[test]
    fn duplicate_layer_is_dropped() {
        let mut pp = ParchmintParser::new();
        let device = pp
            .parse(&json!({
                "layers": [
                    { "id": "l1", "name": "flow" },
                    { "id": "l1", "name": "control" }
                ]
            }))
            .unwrap();
        assert!(!pp.is_valid());
        assert_eq!(device.layers.len(), 1);
        assert_eq!(device.layers[0].name.as_deref(), Some("flow"));
    }

    #[test]
    fn port_on_unlisted_layer_warns() {
        let mut pp = ParchmintParser::new();
        let doc = json!({ "components": [ {
            "id": "m1", "name": "mix", "layers": ["L1"], "x-span": 10, "y-span": 10, "entity": "e",
            "ports": [
                { "label": "p1", "layer": "L1", "x": 0, "y": 0 },
                { "label": "p2", "layer": "L2", "x": 10, "y": 0 }
            ]
        } ] });
        pp.parse_components(&doc).unwrap();
        assert!(pp.is_valid());
        assert_eq!(pp.components()["L1"][0].ports.len(), 1);
        assert_eq!(pp.diagnostics()[0].kind, DiagnosticKind::UnknownLayer);
    }
}
