//! The assembled device: every layer of one document.

use crate::parchmint::validation::{entity_context, ValidationReport};

use super::Layer;

/// A microfluidic device as described by one ParchMint document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Device {
    /// Device name, if the document gives one.
    pub name: Option<String>,
    /// Declared layers in document order, each holding its own components
    /// and connections.
    pub layers: Vec<Layer>,
}

impl Device {
    /// Creates a device from its layers.
    pub fn new(name: impl Into<String>, layers: Vec<Layer>) -> Self {
        Self {
            name: Some(name.into()),
            layers,
        }
    }

    /// Looks up a layer by ID.
    #[must_use]
    pub fn layer(&self, id: &str) -> Option<&Layer> {
        self.layers.iter().find(|layer| layer.id() == Some(id))
    }

    /// Total number of components over all layers.
    ///
    /// A component listed on several layers counts once per layer.
    #[must_use]
    pub fn component_count(&self) -> usize {
        self.layers.iter().map(|layer| layer.components.len()).sum()
    }

    /// Total number of connections over all layers.
    #[must_use]
    pub fn connection_count(&self) -> usize {
        self.layers.iter().map(|layer| layer.connections.len()).sum()
    }

    /// Context label used in diagnostics.
    #[must_use]
    pub fn context(&self) -> String {
        entity_context("Device", self.name.as_deref())
    }

    /// Validates every layer.
    ///
    /// The device name is optional and not checked.
    #[must_use]
    pub fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::new();
        for layer in &self.layers {
            report.absorb(layer.validate());
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parchmint::model::{Component, Coord, Port};

    fn layer(id: &str) -> Layer {
        let comp = Component::new(
            "mixer",
            format!("{id}-mixer"),
            10.0,
            10.0,
            "MIXER",
            vec![Port::new("p1", id, Coord::new(0.0, 5.0))],
        );
        Layer::new(format!("{id}-name"), id, vec![comp], Vec::new())
    }

    #[test]
    fn empty_device_is_valid() {
        assert!(Device::default().validate().is_valid());
    }

    #[test]
    fn counts_and_lookup() {
        let device = Device::new("chip", vec![layer("flow"), layer("control")]);
        assert_eq!(device.component_count(), 2);
        assert_eq!(device.connection_count(), 0);
        assert!(device.layer("control").is_some());
        assert!(device.layer("nope").is_none());
        assert!(device.validate().is_valid());
    }

    #[test]
    fn invalid_layer_invalidates_device() {
        let device = Device::new("chip", vec![layer("flow"), Layer::default()]);
        assert!(!device.validate().is_valid());
    }
}
