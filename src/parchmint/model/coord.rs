//! Two-dimensional point used for port positions, feature locations and
//! segment end points.

use serde::{Deserialize, Serialize};

use crate::parchmint::validation::{DiagnosticKind, ValidationReport};

/// A point in device coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coord {
    /// X position.
    pub x: f64,
    /// Y position.
    pub y: f64,
}

impl Coord {
    /// Creates a new coordinate.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns `true` if both coordinates compare equal.
    #[must_use]
    #[allow(clippy::float_cmp)] // exact placement equality is the rule
    pub fn is(&self, other: &Self) -> bool {
        self.x == other.x && self.y == other.y
    }

    /// Returns `true` if both coordinates are finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Validates the coordinate on its own.
    #[must_use]
    pub fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::new();
        self.check("position", "Coord", &mut report);
        report
    }

    /// Checks the coordinate as the `field` of `context`.
    pub(crate) fn check(&self, field: &str, context: &str, report: &mut ValidationReport) -> bool {
        if self.is_finite() {
            return true;
        }
        report.error(
            DiagnosticKind::InvalidCoord,
            context,
            format!("field '{field}' must have finite x/y, got ({}, {})", self.x, self.y),
        );
        false
    }
}
