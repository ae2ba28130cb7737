//! # Section Configuration Files
//!
//! JSON description of a section analysis: materials, geometry,
//! reinforcement and analysis parameters. Files are plain JSON so engineers
//! can edit them by hand.
//!
//! ## Structure
//!
//! ```text
//! SectionConfigFile
//! ├── section_name, description, version
//! ├── materials: concrete_type, steel_type
//! ├── geometry: height + contour_points | rectangle
//! ├── reinforcement: cover_thickness + layers (by name)
//! └── analysis: target_axial_force (kN), curvature_range, fiber_count,
//!               single_calculation
//! ```
//!
//! ## Example
//!
//! ```rust
//! use rcsection_core::config::SectionConfigFile;
//!
//! let file = SectionConfigFile::template();
//! let config = file.to_configuration()?;
//! let request = file.analysis_request()?;
//! assert_eq!(request.target_axial_force, 300_000.0);
//! assert_eq!(config.reinforcement().len(), 3);
//! # Ok::<(), rcsection_core::errors::SectionError>(())
//! ```

use std::collections::BTreeMap;

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::calculations::{AnalysisRequest, CurvatureRange};
use crate::errors::{SectionError, SectionResult};
use crate::materials::{ConcreteGrade, MaterialParameters, SteelGrade};
use crate::section::{
    ContourPoint, LayerAnchor, ReinforcementLayer, SectionConfiguration, SectionGeometry, SectionShape,
    DEFAULT_FIBER_COUNT,
};
use crate::units::{Kilonewtons, Millimeters, Newtons, SqMm};

/// Current configuration schema version
pub const CONFIG_SCHEMA_VERSION: &str = "1.0";

/// Mismatch between the declared `geometry.height` and the contour's height
/// that triggers a warning (mm)
const HEIGHT_MISMATCH_TOLERANCE: f64 = 1e-3;

/// Fields every configuration file must contain, as dotted paths
const REQUIRED_FIELDS: &[&str] = &[
    "materials",
    "materials.concrete_type",
    "materials.steel_type",
    "geometry",
    "reinforcement",
    "reinforcement.cover_thickness",
    "reinforcement.layers",
    "analysis",
    "analysis.target_axial_force",
    "analysis.curvature_range",
    "analysis.curvature_range.start",
    "analysis.curvature_range.end",
    "analysis.curvature_range.steps",
];

fn default_section_name() -> String {
    "Unnamed section".to_string()
}

fn default_version() -> String {
    CONFIG_SCHEMA_VERSION.to_string()
}

fn default_fiber_count() -> usize {
    DEFAULT_FIBER_COUNT
}

/// Root of a configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionConfigFile {
    #[serde(default = "default_section_name")]
    pub section_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_version")]
    pub version: String,
    pub materials: MaterialsSpec,
    pub geometry: GeometrySpec,
    pub reinforcement: ReinforcementSpec,
    pub analysis: AnalysisSpec,
}

/// Material grades by name, e.g. "C30" and "HRB400"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialsSpec {
    pub concrete_type: String,
    pub steel_type: String,
}

impl MaterialsSpec {
    pub fn grades(&self) -> SectionResult<(ConcreteGrade, SteelGrade)> {
        Ok((
            ConcreteGrade::from_str_flexible(&self.concrete_type)?,
            SteelGrade::from_str_flexible(&self.steel_type)?,
        ))
    }
}

/// Contour point as written in a file, with an optional note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContourPointSpec {
    pub y: f64,
    pub half_width: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RectangleSpec {
    pub width: f64,
    pub height: f64,
}

/// Section outline: an explicit contour or the rectangle shorthand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometrySpec {
    /// Declared section height (mm), informational
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contour_points: Option<Vec<ContourPointSpec>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rectangle: Option<RectangleSpec>,
}

impl GeometrySpec {
    pub fn shape(&self) -> SectionResult<SectionShape> {
        match (&self.contour_points, &self.rectangle) {
            (Some(_), Some(_)) => Err(SectionError::invalid_input(
                "geometry",
                "contour_points and rectangle",
                "Give either contour_points or rectangle, not both",
            )),
            (Some(points), None) => Ok(SectionShape::Contour(
                points.iter().map(|p| ContourPoint::new(p.y, p.half_width)).collect(),
            )),
            (None, Some(rect)) => Ok(SectionShape::Rectangle {
                width: rect.width,
                height: rect.height,
            }),
            (None, None) => Err(SectionError::missing_field("geometry.contour_points")),
        }
    }

    /// Validated geometry. A declared height that disagrees with the outline
    /// is logged, not rejected.
    pub fn to_geometry(&self) -> SectionResult<SectionGeometry> {
        let geometry = self.shape()?.to_geometry()?;
        if let Some(height) = self.height {
            if (height - geometry.height()).abs() > HEIGHT_MISMATCH_TOLERANCE {
                warn!(
                    "Declared height {} mm differs from contour height {} mm",
                    height,
                    geometry.height()
                );
            }
        }
        if geometry.points().iter().any(|p| p.half_width == 0.0) {
            warn!("Contour contains zero half-widths");
        }
        Ok(geometry)
    }

    fn point_count(&self) -> usize {
        match (&self.contour_points, &self.rectangle) {
            (Some(points), _) => points.len(),
            (None, Some(_)) => 2,
            (None, None) => 0,
        }
    }
}

/// Anchor names accepted in a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnchorKind {
    Top,
    Bottom,
    Explicit,
}

/// One named layer of bars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSpec {
    pub count: u32,
    /// Bar diameter (mm)
    pub diameter: f64,
    /// Cover for this layer instead of `cover_thickness` (mm)
    #[serde(default)]
    pub cover_override: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor: Option<AnchorKind>,
    /// Absolute height (mm) for explicitly placed layers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<f64>,
}

impl LayerSpec {
    /// Total bar area count·π·(d/2)² (mm²)
    pub fn area(&self) -> f64 {
        SqMm::of_bars(self.count, Millimeters(self.diameter)).value()
    }

    /// Resolve into a core layer.
    ///
    /// Only layers named "top" or "bottom" may omit the anchor; they anchor to
    /// the face they are named after. A `position` without an anchor means an
    /// explicit placement.
    pub fn to_layer(&self, name: &str, default_cover: f64) -> SectionResult<ReinforcementLayer> {
        if !(self.diameter.is_finite() && self.diameter > 0.0) {
            return Err(SectionError::invalid_input(
                format!("reinforcement.layers.{}.diameter", name),
                self.diameter.to_string(),
                "Bar diameter must be positive",
            ));
        }

        let cover = self.cover_override.unwrap_or(default_cover);
        let anchor = match (self.anchor, self.position) {
            (Some(AnchorKind::Top), _) => LayerAnchor::Top { cover },
            (Some(AnchorKind::Bottom), _) => LayerAnchor::Bottom { cover },
            (Some(AnchorKind::Explicit), Some(position)) | (None, Some(position)) => {
                LayerAnchor::Explicit { position }
            }
            (Some(AnchorKind::Explicit), None) => {
                return Err(SectionError::missing_field(format!(
                    "reinforcement.layers.{}.position",
                    name
                )))
            }
            (None, None) => match name {
                "top" => LayerAnchor::Top { cover },
                "bottom" => LayerAnchor::Bottom { cover },
                _ => {
                    return Err(SectionError::missing_field(format!(
                        "reinforcement.layers.{}.anchor",
                        name
                    )))
                }
            },
        };

        Ok(ReinforcementLayer::from_bars(name, self.count, self.diameter, anchor))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReinforcementSpec {
    /// Default cover for top/bottom anchored layers (mm)
    pub cover_thickness: f64,
    pub layers: BTreeMap<String, LayerSpec>,
}

impl ReinforcementSpec {
    /// Core layers in name order
    pub fn to_layers(&self) -> SectionResult<Vec<ReinforcementLayer>> {
        if !(self.cover_thickness.is_finite() && self.cover_thickness >= 0.0) {
            return Err(SectionError::invalid_input(
                "reinforcement.cover_thickness",
                self.cover_thickness.to_string(),
                "Cover must be non-negative",
            ));
        }
        self.layers
            .iter()
            .map(|(name, layer)| layer.to_layer(name, self.cover_thickness))
            .collect()
    }

    pub fn calculated_areas(&self) -> BTreeMap<String, f64> {
        self.layers
            .iter()
            .map(|(name, layer)| (name.clone(), layer.area()))
            .collect()
    }

    pub fn total_steel_area(&self) -> f64 {
        self.layers.values().map(LayerSpec::area).sum()
    }
}

/// Curvature and strain offset for a one-off evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SingleCalculationSpec {
    pub kappa: f64,
    pub epsilon0: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSpec {
    /// Target axial force (kN), compression positive
    pub target_axial_force: f64,
    pub curvature_range: CurvatureRange,
    #[serde(default = "default_fiber_count")]
    pub fiber_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub single_calculation: Option<SingleCalculationSpec>,
}

impl SectionConfigFile {
    /// Parse a configuration from JSON text.
    ///
    /// # Errors
    ///
    /// - `SerializationError` for malformed JSON or wrongly typed fields
    /// - `MissingField` with the dotted path of the first missing field
    pub fn from_json_str(json: &str) -> SectionResult<Self> {
        let value: Value = serde_json::from_str(json)?;
        SectionConfigFile::from_value(value)
    }

    pub fn from_value(value: Value) -> SectionResult<Self> {
        check_required_fields(&value)?;
        Ok(serde_json::from_value(value)?)
    }

    /// Check the whole file without running an analysis.
    pub fn validate(&self) -> SectionResult<()> {
        validate_version(&self.version)?;
        self.materials.grades()?;
        let geometry = self.geometry.to_geometry()?;
        let layers = self.reinforcement.to_layers()?;
        for layer in &layers {
            layer.resolve(&geometry)?;
        }
        self.analysis_request()?;
        if let Some(single) = &self.analysis.single_calculation {
            if !(single.kappa.is_finite() && single.epsilon0.is_finite()) {
                return Err(SectionError::invalid_input(
                    "analysis.single_calculation",
                    format!("kappa {}, epsilon0 {}", single.kappa, single.epsilon0),
                    "Values must be finite",
                ));
            }
        }
        debug!("Configuration '{}' is valid", self.section_name);
        Ok(())
    }

    /// Build the section configuration described by the file.
    pub fn to_configuration(&self) -> SectionResult<SectionConfiguration> {
        validate_version(&self.version)?;
        let (concrete, steel) = self.materials.grades()?;
        let geometry = self.geometry.to_geometry()?;
        let layers = self.reinforcement.to_layers()?;
        SectionConfiguration::new(concrete, steel, geometry, layers)?.with_fiber_count(self.analysis.fiber_count)
    }

    /// The sweep request, with the target force converted from kN to N.
    pub fn analysis_request(&self) -> SectionResult<AnalysisRequest> {
        let analysis = &self.analysis;
        if !analysis.target_axial_force.is_finite() {
            return Err(SectionError::invalid_input(
                "analysis.target_axial_force",
                analysis.target_axial_force.to_string(),
                "Target axial force must be finite",
            ));
        }
        analysis.curvature_range.validate()?;
        if analysis.fiber_count < 2 {
            return Err(SectionError::invalid_input(
                "analysis.fiber_count",
                analysis.fiber_count.to_string(),
                "At least 2 fibers are required",
            ));
        }
        let target: Newtons = Kilonewtons(analysis.target_axial_force).into();
        Ok(AnalysisRequest::new(target.value(), analysis.curvature_range).with_fiber_count(analysis.fiber_count))
    }

    pub fn summary(&self) -> SectionResult<ConfigSummary> {
        let geometry = self.geometry.to_geometry()?;
        Ok(ConfigSummary {
            section_name: self.section_name.clone(),
            description: self.description.clone(),
            version: self.version.clone(),
            concrete: self.materials.concrete_type.clone(),
            steel: self.materials.steel_type.clone(),
            height: geometry.height(),
            contour_points_count: self.geometry.point_count(),
            cover_thickness: self.reinforcement.cover_thickness,
            total_steel_area: self.reinforcement.total_steel_area(),
            layers: self.reinforcement.layers.keys().cloned().collect(),
            target_axial_force: self.analysis.target_axial_force,
            curvature_range: self.analysis.curvature_range,
        })
    }

    /// The file plus derived material parameters and layer areas.
    pub fn process(&self) -> SectionResult<ProcessedConfig> {
        self.validate()?;
        let (concrete, steel) = self.materials.grades()?;
        let params = MaterialParameters::from_grades(concrete, steel);
        Ok(ProcessedConfig {
            config: self.clone(),
            calculated_params: CalculatedParams::from(&params),
            calculated_areas: self.reinforcement.calculated_areas(),
        })
    }

    /// Example configuration: a tapered symmetric section with three layers.
    pub fn template() -> Self {
        let point = |y: f64, half_width: f64, description: &str| ContourPointSpec {
            y,
            half_width,
            description: Some(description.to_string()),
        };
        let mut layers = BTreeMap::new();
        layers.insert(
            "top".to_string(),
            LayerSpec {
                count: 3,
                diameter: 20.0,
                cover_override: None,
                anchor: None,
                position: None,
            },
        );
        layers.insert(
            "middle".to_string(),
            LayerSpec {
                count: 2,
                diameter: 18.0,
                cover_override: Some(150.0),
                anchor: Some(AnchorKind::Bottom),
                position: None,
            },
        );
        layers.insert(
            "bottom".to_string(),
            LayerSpec {
                count: 4,
                diameter: 22.0,
                cover_override: None,
                anchor: None,
                position: None,
            },
        );

        SectionConfigFile {
            section_name: "Custom section".to_string(),
            description: "Tapered symmetric section".to_string(),
            version: CONFIG_SCHEMA_VERSION.to_string(),
            materials: MaterialsSpec {
                concrete_type: "C40".to_string(),
                steel_type: "HRB500".to_string(),
            },
            geometry: GeometrySpec {
                height: Some(600.0),
                contour_points: Some(vec![
                    point(-300.0, 200.0, "bottom"),
                    point(-150.0, 180.0, "lower"),
                    point(0.0, 150.0, "middle"),
                    point(150.0, 180.0, "upper"),
                    point(300.0, 200.0, "top"),
                ]),
                rectangle: None,
            },
            reinforcement: ReinforcementSpec {
                cover_thickness: 30.0,
                layers,
            },
            analysis: AnalysisSpec {
                target_axial_force: 300.0,
                curvature_range: CurvatureRange::new(0.0, 0.0015, 150),
                fiber_count: DEFAULT_FIBER_COUNT,
                single_calculation: Some(SingleCalculationSpec {
                    kappa: 0.0005,
                    epsilon0: 0.0001,
                }),
            },
        }
    }
}

fn check_required_fields(value: &Value) -> SectionResult<()> {
    for path in REQUIRED_FIELDS {
        let found = path
            .split('.')
            .try_fold(value, |node, key| node.get(key))
            .is_some_and(|node| !node.is_null());
        if !found {
            return Err(SectionError::missing_field(*path));
        }
    }
    Ok(())
}

/// Major version must match the current schema.
fn validate_version(file_version: &str) -> SectionResult<()> {
    let major = |version: &str| version.split('.').next().and_then(|p| p.trim().parse::<u32>().ok());
    match (major(file_version), major(CONFIG_SCHEMA_VERSION)) {
        (Some(file_major), Some(current_major)) if file_major == current_major => Ok(()),
        _ => Err(SectionError::VersionMismatch {
            file_version: file_version.to_string(),
            expected_version: CONFIG_SCHEMA_VERSION.to_string(),
        }),
    }
}

/// Short overview of a configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigSummary {
    pub section_name: String,
    pub description: String,
    pub version: String,
    pub concrete: String,
    pub steel: String,
    /// Section height from the outline (mm)
    pub height: f64,
    pub contour_points_count: usize,
    pub cover_thickness: f64,
    /// mm²
    pub total_steel_area: f64,
    pub layers: Vec<String>,
    /// kN
    pub target_axial_force: f64,
    pub curvature_range: CurvatureRange,
}

/// Material constants written into a processed configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalculatedParams {
    pub f_cd: f64,
    pub f_td: f64,
    pub e_c: f64,
    pub epsu: f64,
    pub f_yd: f64,
    pub e_s: f64,
}

impl From<&MaterialParameters> for CalculatedParams {
    fn from(params: &MaterialParameters) -> Self {
        CalculatedParams {
            f_cd: params.f_cd,
            f_td: params.f_td,
            e_c: params.e_c,
            epsu: params.epsu,
            f_yd: params.f_yd,
            e_s: params.e_s,
        }
    }
}

/// A configuration file enriched with derived values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedConfig {
    #[serde(flatten)]
    pub config: SectionConfigFile,
    pub calculated_params: CalculatedParams,
    /// Steel area per layer (mm²)
    pub calculated_areas: BTreeMap<String, f64>,
}
