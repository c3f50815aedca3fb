//! Layers: planes of the device owning components and connections.

use std::collections::{HashMap, HashSet};

use crate::parchmint::validation::{
    entity_context, test_string_value, DiagnosticKind, ValidationReport,
};

use super::{Component, Connection, Terminal};

/// A named plane of the device (flow layer, control layer, ...).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Layer {
    /// Layer name.
    pub name: Option<String>,
    /// Layer ID, unique in the document.
    pub id: Option<String>,
    /// Components placed on this layer.
    pub components: Vec<Component>,
    /// Connections running on this layer.
    pub connections: Vec<Connection>,
}

/// Component ID to the labels of its ports on one layer.
type TerminalIndex<'a> = HashMap<&'a str, HashSet<&'a str>>;

impl Layer {
    /// Creates a layer.
    pub fn new(
        name: impl Into<String>,
        id: impl Into<String>,
        components: Vec<Component>,
        connections: Vec<Connection>,
    ) -> Self {
        Self {
            name: Some(name.into()),
            id: Some(id.into()),
            components,
            connections,
        }
    }

    /// ID as a string slice, if set.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Context label used in diagnostics.
    #[must_use]
    pub fn context(&self) -> String {
        entity_context("Layer", self.id().or(self.name.as_deref()))
    }

    /// Validates the layer, its components and connections, and resolves
    /// every connection terminal against the layer's own components.
    #[must_use]
    pub fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::new();
        let context = self.context();

        test_string_value(self.name.as_deref(), "name", &context, &mut report);
        test_string_value(self.id(), "id", &context, &mut report);

        for component in &self.components {
            report.absorb(component.validate());
        }

        for connection in &self.connections {
            report.absorb(connection.validate());
        }

        let index = self.terminal_index();
        for connection in &self.connections {
            for terminal in connection.terminals() {
                if let Err(reason) = resolve(&index, terminal) {
                    report.error(
                        DiagnosticKind::UnresolvedTerminal,
                        &context,
                        format!(
                            "{} references {terminal}: {reason}",
                            connection.context()
                        ),
                    );
                }
            }
        }

        report
    }

    /// Builds the lookup of (component, port) pairs present on this layer.
    fn terminal_index(&self) -> TerminalIndex<'_> {
        let mut index = TerminalIndex::new();
        for component in &self.components {
            let Some(id) = component.id() else { continue };
            index
                .entry(id)
                .or_default()
                .extend(component.ports.iter().filter_map(|p| p.label()));
        }
        index
    }
}

/// Checks that `terminal` names a port of a component on the layer.
fn resolve(index: &TerminalIndex<'_>, terminal: &Terminal) -> Result<(), &'static str> {
    let ports = index
        .get(terminal.component.as_str())
        .ok_or("component is not on this layer")?;
    let port = terminal.port.as_deref().ok_or("no port given")?;
    if ports.contains(port) {
        Ok(())
    } else {
        Err("component has no such port on this layer")
    }
}
