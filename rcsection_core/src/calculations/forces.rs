//! # Section Force Evaluation
//!
//! Integrates fiber and bar stresses for a plane strain field
//! `ε(h) = ε₀ + κ·h`.
//!
//! ## Sign Convention
//!
//! - Stresses are tension positive.
//! - The axial force is reported **compression positive**: `N = −Σ σ·A`.
//!   A positive target axial force is a compressive demand.
//! - The moment is `M = Σ σ·A·h`. Positive curvature puts the top fiber in
//!   tension and produces a positive moment, so `M·κ ≥ 0` while the section
//!   stays elastic.

use serde::{Deserialize, Serialize};

use crate::materials::MaterialParameters;
use crate::section::{FiberMesh, ReinforcementPoint, SectionConfiguration};

/// Linear strain distribution over the section height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrainField {
    /// Curvature κ (1/mm)
    pub curvature: f64,
    /// Axial strain at height 0
    pub epsilon0: f64,
}

impl StrainField {
    pub fn new(curvature: f64, epsilon0: f64) -> Self {
        StrainField { curvature, epsilon0 }
    }

    /// Strain at height `h`
    #[inline]
    pub fn strain_at(&self, h: f64) -> f64 {
        self.epsilon0 + self.curvature * h
    }
}

/// Section resultants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SectionForces {
    /// Axial force (N), compression positive
    pub axial_force: f64,
    /// Bending moment (N·mm)
    pub moment: f64,
}

/// Resultants split into concrete and steel parts.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ForceBreakdown {
    pub concrete_axial: f64,
    pub concrete_moment: f64,
    pub steel_axial: f64,
    pub steel_moment: f64,
}

impl ForceBreakdown {
    pub fn total(&self) -> SectionForces {
        SectionForces {
            axial_force: self.concrete_axial + self.steel_axial,
            moment: self.concrete_moment + self.steel_moment,
        }
    }
}

/// Evaluates section resultants for a strain field. Holds only borrowed,
/// read-only data, so repeated calls with the same input return identical
/// results.
#[derive(Debug, Clone, Copy)]
pub struct SectionForceEvaluator<'a> {
    mesh: &'a FiberMesh,
    reinforcement: &'a [ReinforcementPoint],
    materials: &'a MaterialParameters,
}

impl<'a> SectionForceEvaluator<'a> {
    pub fn new(mesh: &'a FiberMesh, reinforcement: &'a [ReinforcementPoint], materials: &'a MaterialParameters) -> Self {
        SectionForceEvaluator {
            mesh,
            reinforcement,
            materials,
        }
    }

    /// Evaluator over a configuration's mesh, bars and materials
    pub fn for_section(config: &'a SectionConfiguration) -> Self {
        SectionForceEvaluator::new(config.mesh(), config.reinforcement(), config.materials())
    }

    pub fn materials(&self) -> &MaterialParameters {
        self.materials
    }

    pub fn mesh(&self) -> &FiberMesh {
        self.mesh
    }

    /// Axial force and moment for curvature `κ` and offset `ε₀`.
    pub fn evaluate(&self, curvature: f64, epsilon0: f64) -> SectionForces {
        self.evaluate_breakdown(curvature, epsilon0).total()
    }

    /// Same as [`evaluate`](Self::evaluate), keeping concrete and steel apart.
    pub fn evaluate_breakdown(&self, curvature: f64, epsilon0: f64) -> ForceBreakdown {
        let field = StrainField::new(curvature, epsilon0);
        let mut breakdown = ForceBreakdown::default();

        for (h, area) in self.mesh.fibers() {
            let force = self.materials.concrete_stress(field.strain_at(h)) * area;
            breakdown.concrete_axial -= force;
            breakdown.concrete_moment += force * h;
        }

        for bar in self.reinforcement {
            let force = self.materials.steel_stress(field.strain_at(bar.position)) * bar.area;
            breakdown.steel_axial -= force;
            breakdown.steel_moment += force * bar.position;
        }

        breakdown
    }

    /// Largest and smallest concrete fiber strain `(max, min)`.
    pub fn strain_extremes(&self, curvature: f64, epsilon0: f64) -> (f64, f64) {
        let field = StrainField::new(curvature, epsilon0);
        self.mesh
            .heights()
            .iter()
            .map(|&h| field.strain_at(h))
            .fold((f64::NEG_INFINITY, f64::INFINITY), |(max, min), eps| (max.max(eps), min.min(eps)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materials::{ConcreteGrade, SteelGrade};
    use crate::section::{ReinforcementLayer, SectionGeometry};
    use approx::assert_relative_eq;

    fn plain_section(fibers: usize) -> SectionConfiguration {
        SectionConfiguration::new(
            ConcreteGrade::C30,
            SteelGrade::Hrb400,
            SectionGeometry::rectangular(300.0, 500.0).unwrap(),
            vec![],
        )
        .unwrap()
        .with_fiber_count(fibers)
        .unwrap()
    }

    fn reinforced_section() -> SectionConfiguration {
        SectionConfiguration::new(
            ConcreteGrade::C30,
            SteelGrade::Hrb400,
            SectionGeometry::rectangular(300.0, 500.0).unwrap(),
            vec![
                ReinforcementLayer::top("top", 942.0, 50.0),
                ReinforcementLayer::bottom("bottom", 942.0, 50.0),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_zero_strain_gives_zero_forces() {
        let config = plain_section(50);
        let forces = SectionForceEvaluator::for_section(&config).evaluate(0.0, 0.0);
        assert_eq!(forces.axial_force, 0.0);
        assert_eq!(forces.moment, 0.0);
    }

    #[test]
    fn test_uniform_tension_matches_closed_form() {
        let config = plain_section(200);
        let eps = 5e-5;
        let forces = SectionForceEvaluator::for_section(&config).evaluate(0.0, eps);
        let exact = -config.geometry().area() * config.materials().e_c * eps;
        // overshoot of 1/(N-1) from the end fibers
        assert_relative_eq!(forces.axial_force, exact * 200.0 / 199.0, max_relative = 1e-9);
        assert!(forces.moment.abs() < 1e-3);
    }

    #[test]
    fn test_steel_contribution_in_elastic_range() {
        let config = reinforced_section();
        let evaluator = SectionForceEvaluator::for_section(&config);
        let eps = 5e-5;
        let breakdown = evaluator.evaluate_breakdown(0.0, eps);
        assert_relative_eq!(breakdown.steel_axial, -1884.0 * 2.0e5 * eps, max_relative = 1e-12);
        assert_relative_eq!(breakdown.steel_moment, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_uniform_compression_is_positive() {
        let config = reinforced_section();
        let forces = SectionForceEvaluator::for_section(&config).evaluate(0.0, -0.001);
        assert!(forces.axial_force > 0.0);
    }

    #[test]
    fn test_positive_curvature_gives_positive_moment() {
        let config = reinforced_section();
        let forces = SectionForceEvaluator::for_section(&config).evaluate(1e-7, 0.0);
        assert!(forces.moment > 0.0);
        // antisymmetric strain on a symmetric section: no net axial force
        assert!(forces.axial_force.abs() < 1e-6 * forces.moment.abs());
    }

    #[test]
    fn test_evaluate_is_deterministic() {
        let config = reinforced_section();
        let evaluator = SectionForceEvaluator::for_section(&config);
        let a = evaluator.evaluate(3.3e-6, -4.1e-4);
        let b = evaluator.evaluate(3.3e-6, -4.1e-4);
        assert_eq!(a.axial_force.to_bits(), b.axial_force.to_bits());
        assert_eq!(a.moment.to_bits(), b.moment.to_bits());
    }

    #[test]
    fn test_strain_extremes() {
        let config = plain_section(50);
        let (max, min) = SectionForceEvaluator::for_section(&config).strain_extremes(1e-5, 1e-4);
        assert_relative_eq!(max, 1e-4 + 1e-5 * 250.0, max_relative = 1e-12);
        assert_relative_eq!(min, 1e-4 - 1e-5 * 250.0, max_relative = 1e-12);
    }

    #[test]
    fn test_strain_field() {
        let field = StrainField::new(2e-6, -1e-4);
        assert_relative_eq!(field.strain_at(100.0), 1e-4, max_relative = 1e-12);
        assert_eq!(field.strain_at(0.0), -1e-4);
    }
}
