//! Reinforcement layers
//!
//! Every layer declares where it sits. The layer name is a label only; a
//! layer called "middle" is placed exactly where its anchor says.

use serde::{Deserialize, Serialize};

use crate::errors::{SectionError, SectionResult};
use crate::section::geometry::SectionGeometry;
use crate::units::{Millimeters, SqMm};

/// Slack allowed when checking that a bar lies inside the section (mm)
const POSITION_TOLERANCE: f64 = 1e-9;

/// Where a reinforcement layer is placed.
///
/// ## JSON Example
///
/// ```json
/// { "anchor": "top", "cover": 50.0 }
/// { "anchor": "bottom", "cover": 40.0 }
/// { "anchor": "explicit", "position": -150.0 }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "anchor", rename_all = "snake_case")]
pub enum LayerAnchor {
    /// Cover measured down from the top extreme: `max_y − cover`
    Top { cover: f64 },
    /// Cover measured up from the bottom extreme: `min_y + cover`
    Bottom { cover: f64 },
    /// Absolute height coordinate
    Explicit { position: f64 },
}

impl LayerAnchor {
    /// Resolve the bar height within a geometry
    pub fn position_in(&self, geometry: &SectionGeometry) -> f64 {
        match *self {
            LayerAnchor::Top { cover } => geometry.max_y() - cover,
            LayerAnchor::Bottom { cover } => geometry.min_y() + cover,
            LayerAnchor::Explicit { position } => position,
        }
    }
}

/// A named layer of longitudinal bars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReinforcementLayer {
    /// Label used in reports (e.g. "top", "web-1")
    pub name: String,
    /// Total steel area of the layer (mm²)
    pub area: f64,
    /// Placement of the layer
    #[serde(flatten)]
    pub anchor: LayerAnchor,
}

impl ReinforcementLayer {
    pub fn new(name: impl Into<String>, area: f64, anchor: LayerAnchor) -> Self {
        ReinforcementLayer {
            name: name.into(),
            area,
            anchor,
        }
    }

    /// Layer anchored to the top extreme
    pub fn top(name: impl Into<String>, area: f64, cover: f64) -> Self {
        ReinforcementLayer::new(name, area, LayerAnchor::Top { cover })
    }

    /// Layer anchored to the bottom extreme
    pub fn bottom(name: impl Into<String>, area: f64, cover: f64) -> Self {
        ReinforcementLayer::new(name, area, LayerAnchor::Bottom { cover })
    }

    /// Layer at an absolute height
    pub fn explicit(name: impl Into<String>, area: f64, position: f64) -> Self {
        ReinforcementLayer::new(name, area, LayerAnchor::Explicit { position })
    }

    /// Layer of `count` bars of `diameter` mm; area = count·π·(d/2)²
    pub fn from_bars(name: impl Into<String>, count: u32, diameter: f64, anchor: LayerAnchor) -> Self {
        let area = SqMm::of_bars(count, Millimeters(diameter));
        ReinforcementLayer::new(name, area.value(), anchor)
    }

    /// Resolve the layer into a reinforcement point.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for a negative or non-finite area/cover, or a position
    /// outside the section's height range.
    pub fn resolve(&self, geometry: &SectionGeometry) -> SectionResult<ReinforcementPoint> {
        let field = |suffix: &str| format!("reinforcement.{}.{}", self.name, suffix);

        if !(self.area.is_finite() && self.area >= 0.0) {
            return Err(SectionError::invalid_input(
                field("area"),
                self.area.to_string(),
                "Steel area must be non-negative",
            ));
        }
        match self.anchor {
            LayerAnchor::Top { cover } | LayerAnchor::Bottom { cover } => {
                if !(cover.is_finite() && cover >= 0.0) {
                    return Err(SectionError::invalid_input(
                        field("cover"),
                        cover.to_string(),
                        "Cover must be non-negative",
                    ));
                }
            }
            LayerAnchor::Explicit { position } => {
                if !position.is_finite() {
                    return Err(SectionError::invalid_input(
                        field("position"),
                        position.to_string(),
                        "Position must be finite",
                    ));
                }
            }
        }

        let position = self.anchor.position_in(geometry);
        if position < geometry.min_y() - POSITION_TOLERANCE || position > geometry.max_y() + POSITION_TOLERANCE {
            return Err(SectionError::invalid_input(
                field("position"),
                position.to_string(),
                format!(
                    "Layer lies outside the section ({} to {})",
                    geometry.min_y(),
                    geometry.max_y()
                ),
            ));
        }

        Ok(ReinforcementPoint {
            name: self.name.clone(),
            position,
            area: self.area,
        })
    }
}

/// A resolved reinforcement layer: one discrete steel fiber.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReinforcementPoint {
    pub name: String,
    /// Height coordinate (mm)
    pub position: f64,
    /// Steel area (mm²)
    pub area: f64,
}

/// Resolve every layer against a geometry, preserving order.
pub fn resolve_layers(
    layers: &[ReinforcementLayer],
    geometry: &SectionGeometry,
) -> SectionResult<Vec<ReinforcementPoint>> {
    layers.iter().map(|layer| layer.resolve(geometry)).collect()
}
