//! # Section Analysis
//!
//! The analysis engine: force evaluation, axial equilibrium and the
//! curvature sweep.
//!
//! ## Example
//!
//! ```rust
//! use rcsection_core::calculations::{analyze, AnalysisRequest, CurvatureRange, FailureMode};
//! use rcsection_core::materials::{ConcreteGrade, SteelGrade};
//! use rcsection_core::section::{ReinforcementLayer, SectionConfiguration, SectionGeometry};
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
//! let request = AnalysisRequest::new(100e3, CurvatureRange::new(0.0, 1e-7, 5));
//! let result = analyze(&config, &request)?;
//! assert_eq!(result.failure_mode, FailureMode::NoFailure);
//! assert_eq!(result.len(), 5);
//! # Ok::<(), rcsection_core::errors::SectionError>(())
//! ```

pub mod equilibrium;
pub mod forces;
pub mod sweep;

pub use equilibrium::{
    AxialResidual, BracketingSolver, EquilibriumObjective, EquilibriumSolver, EquilibriumState, NonConvergence,
    RootFinder, RootSolution, SecantSolver, SolverSettings,
};
pub use forces::{ForceBreakdown, SectionForceEvaluator, SectionForces, StrainField};
pub use sweep::{AnalysisResult, CurvatureRange, CurvatureSweepDriver, FailureMode, SweepRecord};

use serde::{Deserialize, Serialize};

use crate::errors::{SectionError, SectionResult};
use crate::section::{SectionConfiguration, DEFAULT_FIBER_COUNT};

fn default_fiber_count() -> usize {
    DEFAULT_FIBER_COUNT
}

/// A full moment-curvature analysis request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    /// Target axial force (N), compression positive
    pub target_axial_force: f64,
    pub curvature: CurvatureRange,
    #[serde(default = "default_fiber_count")]
    pub fiber_count: usize,
}

impl AnalysisRequest {
    pub fn new(target_axial_force: f64, curvature: CurvatureRange) -> Self {
        AnalysisRequest {
            target_axial_force,
            curvature,
            fiber_count: DEFAULT_FIBER_COUNT,
        }
    }

    pub fn with_fiber_count(self, fiber_count: usize) -> Self {
        AnalysisRequest { fiber_count, ..self }
    }
}

/// Run a request against a configuration, re-meshing if the request asks
/// for a different fiber count.
pub fn analyze(config: &SectionConfiguration, request: &AnalysisRequest) -> SectionResult<AnalysisResult> {
    let meshed = config.with_fiber_count(request.fiber_count)?;
    meshed.sweep(request.target_axial_force, &request.curvature)
}

impl SectionConfiguration {
    /// Section resultants for curvature `κ` and offset `ε₀`.
    pub fn evaluate(&self, curvature: f64, epsilon0: f64) -> SectionForces {
        SectionForceEvaluator::for_section(self).evaluate(curvature, epsilon0)
    }

    /// Solve axial equilibrium at one curvature with the default root finder.
    ///
    /// # Errors
    ///
    /// `NonConvergence` with the root finder's reason.
    pub fn solve_epsilon0(&self, curvature: f64, target_axial_force: f64) -> SectionResult<EquilibriumState> {
        EquilibriumSolver::new(SectionForceEvaluator::for_section(self))
            .solve_epsilon0(curvature, target_axial_force)
            .map_err(|reason| SectionError::non_convergence(curvature, reason.to_string()))
    }

    /// Sweep a curvature range at a fixed target axial force.
    pub fn sweep(&self, target_axial_force: f64, range: &CurvatureRange) -> SectionResult<AnalysisResult> {
        CurvatureSweepDriver::new(self).sweep_range(target_axial_force, range)
    }
}
