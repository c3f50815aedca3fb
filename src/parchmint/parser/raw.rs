//! JSON shapes of ParchMint entries.
//!
//! Keys the parser needs to place an entry (IDs, layer references, the
//! connection a segment belongs to) are required: an entry without them is
//! malformed and skipped. Everything else is optional and left for
//! validation to judge.

use serde::Deserialize;
use serde_json::Value;

use crate::parchmint::model::{
    ComponentFeature, ConnectionSegment, Coord, Layer, Port, Terminal,
};

/// An entry of the `layers` array.
#[derive(Debug, Deserialize)]
pub struct RawLayer {
    pub id: Option<String>,
    pub name: Option<String>,
}

impl From<RawLayer> for Layer {
    fn from(raw: RawLayer) -> Self {
        Self {
            name: raw.name,
            id: raw.id,
            ..Self::default()
        }
    }
}

/// A port nested in a component entry.
#[derive(Debug, Deserialize)]
pub struct RawPort {
    pub label: Option<String>,
    pub layer: String,
    pub x: Option<f64>,
    pub y: Option<f64>,
}

impl From<RawPort> for Port {
    fn from(raw: RawPort) -> Self {
        let pos = match (raw.x, raw.y) {
            (Some(x), Some(y)) => Some(Coord::new(x, y)),
            _ => None,
        };
        Self {
            label: raw.label,
            layer: Some(raw.layer),
            pos,
        }
    }
}

/// An entry of the `components` array.
///
/// Ports stay as raw JSON so that one malformed port does not discard the
/// whole component.
#[derive(Debug, Deserialize)]
pub struct RawComponent {
    pub id: String,
    pub name: Option<String>,
    pub layers: Vec<String>,
    #[serde(rename = "x-span")]
    pub x_span: Option<f64>,
    #[serde(rename = "y-span")]
    pub y_span: Option<f64>,
    pub entity: Option<String>,
    #[serde(default)]
    pub ports: Vec<Value>,
}

/// A `{ "component", "port" }` reference in a connection entry.
#[derive(Debug, Deserialize)]
pub struct RawTarget {
    pub component: String,
    pub port: Option<String>,
}

impl From<RawTarget> for Terminal {
    fn from(raw: RawTarget) -> Self {
        Self {
            component: raw.component,
            port: raw.port,
        }
    }
}

/// An entry of the `connections` array.
#[derive(Debug, Deserialize)]
pub struct RawConnection {
    pub id: String,
    pub name: Option<String>,
    pub layer: String,
    pub source: Option<RawTarget>,
    #[serde(default)]
    pub sinks: Vec<RawTarget>,
}

/// A feature entry describing a component footprint.
#[derive(Debug, Deserialize)]
pub struct RawComponentFeature {
    pub id: String,
    pub name: Option<String>,
    pub layer: Option<String>,
    pub location: Option<Coord>,
    #[serde(rename = "x-span")]
    pub x_span: Option<f64>,
    #[serde(rename = "y-span")]
    pub y_span: Option<f64>,
    pub depth: Option<f64>,
}

impl From<RawComponentFeature> for ComponentFeature {
    fn from(raw: RawComponentFeature) -> Self {
        Self {
            name: raw.name,
            layer: raw.layer,
            x_span: raw.x_span,
            y_span: raw.y_span,
            location: raw.location,
            depth: raw.depth,
        }
    }
}

/// A feature entry describing one channel segment of a connection.
#[derive(Debug, Deserialize)]
pub struct RawConnectionFeature {
    pub id: String,
    pub name: Option<String>,
    pub layer: Option<String>,
    pub connection: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub width: Option<f64>,
    pub depth: Option<f64>,
    pub source: Option<Coord>,
    pub sink: Option<Coord>,
}

impl From<RawConnectionFeature> for ConnectionSegment {
    fn from(raw: RawConnectionFeature) -> Self {
        Self {
            name: raw.name,
            id: Some(raw.id),
            layer: raw.layer,
            connection: Some(raw.connection),
            kind: Some(raw.kind),
            width: raw.width,
            depth: raw.depth,
            source_point: raw.source,
            sink_point: raw.sink,
        }
    }
}

/// Which kind of feature an entry is, judged by the keys it carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureKind {
    /// Has an `x-span` or `y-span` key.
    Component,
    /// Has a `type` key (and no span key).
    Connection,
    /// Matches neither.
    Unrecognized,
}

impl FeatureKind {
    /// Classifies a feature entry by shape.
    #[must_use]
    pub fn of(value: &Value) -> Self {
        if has_key(value, "x-span") || has_key(value, "y-span") {
            Self::Component
        } else if has_key(value, "type") {
            Self::Connection
        } else {
            Self::Unrecognized
        }
    }
}

fn has_key(value: &Value, key: &str) -> bool {
    value.get(key).is_some_and(|v| !v.is_null())
}

/// A classified entry of the `features` array.
#[derive(Debug)]
pub enum FeatureEntry {
    /// A component footprint.
    Component(RawComponentFeature),
    /// A connection segment.
    Connection(RawConnectionFeature),
    /// Shaped like `kind` but missing required keys or mistyped.
    Malformed {
        /// What the entry looked like.
        kind: FeatureKind,
        /// Deserialisation error.
        error: String,
    },
    /// Neither a component nor a connection feature.
    Unrecognized,
}

impl FeatureEntry {
    /// Classifies and decodes a feature entry.
    #[must_use]
    pub fn classify(value: &Value) -> Self {
        match FeatureKind::of(value) {
            FeatureKind::Component => RawComponentFeature::deserialize(value)
                .map_or_else(|e| Self::malformed(FeatureKind::Component, &e), Self::Component),
            FeatureKind::Connection => RawConnectionFeature::deserialize(value)
                .map_or_else(|e| Self::malformed(FeatureKind::Connection, &e), Self::Connection),
            FeatureKind::Unrecognized => Self::Unrecognized,
        }
    }

    fn malformed(kind: FeatureKind, error: &serde_json::Error) -> Self {
        Self::Malformed {
            kind,
            error: error.to_string(),
        }
    }
}
