//! # Section Definition
//!
//! Geometry, reinforcement and the immutable [`SectionConfiguration`] that
//! ties them to a material set and a fiber mesh.
//!
//! ## Structure
//!
//! ```text
//! SectionConfiguration
//! ├── materials: MaterialParameters (+ the grades they came from, if any)
//! ├── geometry: SectionGeometry (validated symmetric contour)
//! ├── layers: Vec<ReinforcementLayer> (explicitly anchored)
//! ├── mesh: FiberMesh (derived)
//! └── reinforcement: Vec<ReinforcementPoint> (derived)
//! ```
//!
//! Builders return a new configuration; nothing is mutated in place, so two
//! analyses never share state by accident.
//!
//! ## Example
//!
//! ```rust
//! use rcsection_core::section::{ReinforcementLayer, SectionConfiguration, SectionGeometry};
//! use rcsection_core::materials::{ConcreteGrade, SteelGrade};
//!
//! let config = SectionConfiguration::new(
//!     ConcreteGrade::C30,
//!     SteelGrade::Hrb400,
//!     SectionGeometry::rectangular(300.0, 500.0)?,
//!     vec![
//!         ReinforcementLayer::top("top", 942.0, 50.0),
//!         ReinforcementLayer::bottom("bottom", 942.0, 50.0),
//!     ],
//! )?;
//!
//! let c45 = config.with_materials("C45", "HRB500")?;
//! assert_eq!(c45.materials().f_cd, 45.0);
//! assert_eq!(config.materials().f_cd, 30.0);
//! # Ok::<(), rcsection_core::errors::SectionError>(())
//! ```

pub mod geometry;
pub mod mesh;
pub mod reinforcement;

pub use geometry::{ContourPoint, SectionGeometry, SectionShape, SYMMETRY_TOLERANCE};
pub use mesh::{FiberMesh, DEFAULT_FIBER_COUNT};
pub use reinforcement::{resolve_layers, LayerAnchor, ReinforcementLayer, ReinforcementPoint};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::errors::{SectionError, SectionResult};
use crate::materials::{ConcreteGrade, MaterialParameters, SteelGrade};

/// Everything an analysis needs, validated and discretized.
///
/// Deserialization validates the materials and rebuilds the mesh and bar
/// positions, the same as [`SectionConfiguration::with_parameters`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ConfigurationData")]
pub struct SectionConfiguration {
    concrete_grade: Option<ConcreteGrade>,
    steel_grade: Option<SteelGrade>,
    materials: MaterialParameters,
    geometry: SectionGeometry,
    layers: Vec<ReinforcementLayer>,
    fiber_count: usize,
    mesh: FiberMesh,
    reinforcement: Vec<ReinforcementPoint>,
}

/// Stored form of a [`SectionConfiguration`]; derived fields are ignored.
#[derive(Deserialize)]
struct ConfigurationData {
    #[serde(default)]
    concrete_grade: Option<ConcreteGrade>,
    #[serde(default)]
    steel_grade: Option<SteelGrade>,
    materials: MaterialParameters,
    geometry: SectionGeometry,
    #[serde(default)]
    layers: Vec<ReinforcementLayer>,
    fiber_count: usize,
}

impl TryFrom<ConfigurationData> for SectionConfiguration {
    type Error = SectionError;

    fn try_from(data: ConfigurationData) -> SectionResult<Self> {
        let mut config =
            SectionConfiguration::with_parameters(data.materials, data.geometry, data.layers, data.fiber_count)?;
        config.concrete_grade = data.concrete_grade;
        config.steel_grade = data.steel_grade;
        Ok(config)
    }
}

impl SectionConfiguration {
    /// Build a configuration from grades, geometry and layers with the
    /// default fiber count.
    pub fn new(
        concrete: ConcreteGrade,
        steel: SteelGrade,
        geometry: SectionGeometry,
        layers: Vec<ReinforcementLayer>,
    ) -> SectionResult<Self> {
        let materials = MaterialParameters::from_grades(concrete, steel);
        let mut config = SectionConfiguration::assemble(materials, geometry, layers, DEFAULT_FIBER_COUNT)?;
        config.concrete_grade = Some(concrete);
        config.steel_grade = Some(steel);
        Ok(config)
    }

    /// Build a configuration from an explicit material parameter set.
    pub fn with_parameters(
        materials: MaterialParameters,
        geometry: SectionGeometry,
        layers: Vec<ReinforcementLayer>,
        fiber_count: usize,
    ) -> SectionResult<Self> {
        materials.validate()?;
        SectionConfiguration::assemble(materials, geometry, layers, fiber_count)
    }

    fn assemble(
        materials: MaterialParameters,
        geometry: SectionGeometry,
        layers: Vec<ReinforcementLayer>,
        fiber_count: usize,
    ) -> SectionResult<Self> {
        let reinforcement = resolve_layers(&layers, &geometry)?;
        let mesh = FiberMesh::discretize(&geometry, fiber_count)?;
        debug!(
            "Discretized section: height {} mm, {} fibers, {} steel layers",
            geometry.height(),
            mesh.len(),
            reinforcement.len()
        );
        Ok(SectionConfiguration {
            concrete_grade: None,
            steel_grade: None,
            materials,
            geometry,
            layers,
            fiber_count,
            mesh,
            reinforcement,
        })
    }

    /// New configuration with materials looked up by grade name.
    ///
    /// # Errors
    ///
    /// `MaterialNotFound` for an unknown concrete or steel grade.
    pub fn with_materials(&self, concrete: &str, steel: &str) -> SectionResult<Self> {
        let concrete = ConcreteGrade::from_str_flexible(concrete)?;
        let steel = SteelGrade::from_str_flexible(steel)?;
        Ok(self.with_grades(concrete, steel))
    }

    /// New configuration with materials derived from typed grades.
    pub fn with_grades(&self, concrete: ConcreteGrade, steel: SteelGrade) -> Self {
        SectionConfiguration {
            concrete_grade: Some(concrete),
            steel_grade: Some(steel),
            materials: MaterialParameters::from_grades(concrete, steel),
            ..self.clone()
        }
    }

    /// New configuration with a custom material parameter set.
    pub fn with_material_parameters(&self, materials: MaterialParameters) -> SectionResult<Self> {
        materials.validate()?;
        Ok(SectionConfiguration {
            concrete_grade: None,
            steel_grade: None,
            materials,
            ..self.clone()
        })
    }

    /// New configuration with a replaced geometry and reinforcement.
    ///
    /// The mesh and bar positions are rebuilt; the materials are kept.
    pub fn with_section(&self, geometry: SectionGeometry, layers: Vec<ReinforcementLayer>) -> SectionResult<Self> {
        let mut config = SectionConfiguration::assemble(self.materials, geometry, layers, self.fiber_count)?;
        config.concrete_grade = self.concrete_grade;
        config.steel_grade = self.steel_grade;
        Ok(config)
    }

    /// Same as [`with_section`](Self::with_section) but takes raw
    /// `(height, half_width)` pairs.
    ///
    /// # Errors
    ///
    /// Contour validation errors are raised before any mesh is built.
    pub fn with_contour(&self, contour: &[(f64, f64)], layers: Vec<ReinforcementLayer>) -> SectionResult<Self> {
        let geometry = SectionGeometry::from_contour(contour.iter().copied())?;
        self.with_section(geometry, layers)
    }

    /// New configuration with a different fiber resolution.
    pub fn with_fiber_count(&self, fiber_count: usize) -> SectionResult<Self> {
        if fiber_count == self.fiber_count {
            return Ok(self.clone());
        }
        Ok(SectionConfiguration {
            fiber_count,
            mesh: FiberMesh::discretize(&self.geometry, fiber_count)?,
            ..self.clone()
        })
    }

    pub fn materials(&self) -> &MaterialParameters {
        &self.materials
    }

    pub fn concrete_grade(&self) -> Option<ConcreteGrade> {
        self.concrete_grade
    }

    pub fn steel_grade(&self) -> Option<SteelGrade> {
        self.steel_grade
    }

    pub fn geometry(&self) -> &SectionGeometry {
        &self.geometry
    }

    pub fn layers(&self) -> &[ReinforcementLayer] {
        &self.layers
    }

    pub fn fiber_count(&self) -> usize {
        self.fiber_count
    }

    pub fn mesh(&self) -> &FiberMesh {
        &self.mesh
    }

    /// Resolved reinforcement points, in layer order
    pub fn reinforcement(&self) -> &[ReinforcementPoint] {
        &self.reinforcement
    }

    /// Total steel area over all layers (mm²)
    pub fn total_steel_area(&self) -> f64 {
        self.reinforcement.iter().map(|p| p.area).sum()
    }
}
