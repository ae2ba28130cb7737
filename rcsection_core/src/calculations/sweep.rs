//! # Curvature Sweep
//!
//! Steps the curvature over a range, solves axial equilibrium at each step
//! and stops on concrete crushing, on non-convergence, or when the range is
//! exhausted.
//!
//! ```text
//! for κ in range:
//!     solve ε₀ ──fail──► NonConvergence (step excluded, warn!)
//!        │
//!     record step (residual above tolerance: converged = false, warn!)
//!        │
//!     min strain ≤ −εcu ──► ConcreteCrushing (step included)
//! NoFailure
//! ```

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::calculations::equilibrium::{BracketingSolver, EquilibriumSolver, RootFinder};
use crate::calculations::forces::SectionForceEvaluator;
use crate::errors::{SectionError, SectionResult};
use crate::section::SectionConfiguration;

/// Evenly spaced curvatures, both ends included.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvatureRange {
    /// First curvature (1/mm)
    pub start: f64,
    /// Last curvature (1/mm)
    pub end: f64,
    pub steps: usize,
}

impl CurvatureRange {
    pub fn new(start: f64, end: f64, steps: usize) -> Self {
        CurvatureRange { start, end, steps }
    }

    pub fn validate(&self) -> SectionResult<()> {
        if self.steps == 0 {
            return Err(SectionError::invalid_input(
                "curvature_range.steps",
                "0",
                "At least one curvature step is required",
            ));
        }
        if !self.start.is_finite() {
            return Err(SectionError::invalid_input(
                "curvature_range.start",
                self.start.to_string(),
                "Curvature bound must be finite",
            ));
        }
        if !self.end.is_finite() {
            return Err(SectionError::invalid_input(
                "curvature_range.end",
                self.end.to_string(),
                "Curvature bound must be finite",
            ));
        }
        Ok(())
    }

    /// The curvature sequence. A single step yields just `start`.
    pub fn curvatures(&self) -> SectionResult<Vec<f64>> {
        self.validate()?;
        if self.steps == 1 {
            return Ok(vec![self.start]);
        }
        let increment = (self.end - self.start) / (self.steps - 1) as f64;
        Ok((0..self.steps)
            .map(|i| {
                if i == self.steps - 1 {
                    self.end
                } else {
                    self.start + i as f64 * increment
                }
            })
            .collect())
    }
}

/// One solved curvature step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepRecord {
    pub curvature: f64,
    pub epsilon0: f64,
    /// Axial force at the solved state (N)
    pub axial_force: f64,
    /// Equilibrium residual (N)
    pub residual: f64,
    /// Moment (N·mm)
    pub moment: f64,
    /// Largest concrete fiber strain
    pub max_strain: f64,
    /// Smallest concrete fiber strain
    pub min_strain: f64,
    /// |residual| within the solver's force tolerance
    pub converged: bool,
}

/// How a sweep ended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "details")]
pub enum FailureMode {
    /// Extreme compressive fiber reached the ultimate strain
    ConcreteCrushing {
        curvature: f64,
        min_strain: f64,
        ultimate_strain: f64,
    },
    /// Equilibrium could not be found; the step is not in the trace
    NonConvergence { curvature: f64, reason: String },
    /// Every curvature in the range was solved
    NoFailure,
}

impl FailureMode {
    pub fn label(&self) -> String {
        match self {
            FailureMode::ConcreteCrushing {
                curvature,
                min_strain,
                ultimate_strain,
            } => format!(
                "Concrete crushing at curvature {:.3e} (strain {:.5} <= -{})",
                curvature, min_strain, ultimate_strain
            ),
            FailureMode::NonConvergence { curvature, reason } => {
                format!("Non-convergence at curvature {:.3e}: {}", curvature, reason)
            }
            FailureMode::NoFailure => "No failure within the curvature range".to_string(),
        }
    }

    pub fn is_structural_failure(&self) -> bool {
        matches!(self, FailureMode::ConcreteCrushing { .. })
    }
}

/// Ordered trace of solved steps plus the terminal failure mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Target axial force (N), compression positive
    pub target_axial_force: f64,
    pub requested_steps: usize,
    pub records: Vec<SweepRecord>,
    pub failure_mode: FailureMode,
}

impl AnalysisResult {
    pub fn records(&self) -> &[SweepRecord] {
        &self.records
    }

    /// Largest moment over the converged steps (N·mm), `None` when no step
    /// converged. Steps that stopped on a residual jump are not in
    /// equilibrium and do not count.
    pub fn max_moment(&self) -> Option<f64> {
        self.records
            .iter()
            .filter(|r| r.converged)
            .map(|r| r.moment)
            .reduce(f64::max)
    }

    /// Number of recorded steps whose residual exceeds the tolerance
    pub fn unconverged_steps(&self) -> usize {
        self.records.iter().filter(|r| !r.converged).count()
    }

    /// Curvature of the last recorded step
    pub fn final_curvature(&self) -> Option<f64> {
        self.records.last().map(|r| r.curvature)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Drives a curvature sweep over one section configuration.
#[derive(Debug, Clone)]
pub struct CurvatureSweepDriver<'a, R: RootFinder = BracketingSolver> {
    solver: EquilibriumSolver<'a, R>,
    ultimate_strain: f64,
}

impl<'a> CurvatureSweepDriver<'a, BracketingSolver> {
    pub fn new(config: &'a SectionConfiguration) -> Self {
        CurvatureSweepDriver {
            solver: EquilibriumSolver::new(SectionForceEvaluator::for_section(config)),
            ultimate_strain: config.materials().epsu,
        }
    }
}

impl<'a, R: RootFinder> CurvatureSweepDriver<'a, R> {
    pub fn with_root_finder(config: &'a SectionConfiguration, root_finder: R) -> Self {
        CurvatureSweepDriver {
            solver: EquilibriumSolver::with_root_finder(SectionForceEvaluator::for_section(config), root_finder),
            ultimate_strain: config.materials().epsu,
        }
    }

    /// Sweep `steps` curvatures from `start` to `end` at a fixed target
    /// axial force (N, compression positive).
    ///
    /// # Errors
    ///
    /// `InvalidInput` for zero steps or non-finite bounds or target. Crushing
    /// and non-convergence are reported through [`FailureMode`].
    pub fn sweep(&self, target_axial_force: f64, start: f64, end: f64, steps: usize) -> SectionResult<AnalysisResult> {
        self.sweep_range(target_axial_force, &CurvatureRange::new(start, end, steps))
    }

    pub fn sweep_range(&self, target_axial_force: f64, range: &CurvatureRange) -> SectionResult<AnalysisResult> {
        if !target_axial_force.is_finite() {
            return Err(SectionError::invalid_input(
                "target_axial_force",
                target_axial_force.to_string(),
                "Target axial force must be finite",
            ));
        }
        let curvatures = range.curvatures()?;

        info!(
            "Starting curvature sweep: N = {:.1} kN, kappa {:e} to {:e}, {} steps",
            target_axial_force / 1e3,
            range.start,
            range.end,
            range.steps
        );

        let evaluator = self.solver.evaluator();
        let mut records = Vec::with_capacity(curvatures.len());
        let mut failure_mode = FailureMode::NoFailure;

        for (step, &curvature) in curvatures.iter().enumerate() {
            let state = match self.solver.solve_epsilon0(curvature, target_axial_force) {
                Ok(state) => state,
                Err(reason) => {
                    warn!("Step {}: no equilibrium at curvature {:e}: {}", step, curvature, reason);
                    failure_mode = FailureMode::NonConvergence {
                        curvature,
                        reason: reason.to_string(),
                    };
                    break;
                }
            };

            let (max_strain, min_strain) = evaluator.strain_extremes(curvature, state.epsilon0);
            debug!(
                "Step {}: kappa = {:e}, epsilon0 = {:e}, M = {:.3} kN*m, residual = {:.3e} N",
                step,
                curvature,
                state.epsilon0,
                state.moment / 1e6,
                state.residual
            );
            if !state.converged {
                warn!(
                    "Step {}: residual {:.3e} N at curvature {:e} exceeds the force tolerance",
                    step, state.residual, curvature
                );
            }
            records.push(SweepRecord {
                curvature,
                epsilon0: state.epsilon0,
                axial_force: state.axial_force,
                residual: state.residual,
                moment: state.moment,
                max_strain,
                min_strain,
                converged: state.converged,
            });

            if min_strain <= -self.ultimate_strain {
                failure_mode = FailureMode::ConcreteCrushing {
                    curvature,
                    min_strain,
                    ultimate_strain: self.ultimate_strain,
                };
                break;
            }
        }

        let result = AnalysisResult {
            target_axial_force,
            requested_steps: range.steps,
            records,
            failure_mode,
        };
        info!(
            "Sweep finished after {} of {} steps: {}",
            result.len(),
            range.steps,
            result.failure_mode.label()
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::equilibrium::{EquilibriumObjective, NonConvergence, RootSolution};
    use crate::materials::{ConcreteGrade, SteelGrade};
    use crate::section::{ReinforcementLayer, SectionGeometry};
    use std::cell::Cell;

    /// Bracketing solver that gives up from its `fail_from`-th call on.
    #[derive(Debug)]
    struct GivesUpAfter {
        calls: Cell<usize>,
        fail_from: usize,
        inner: BracketingSolver,
    }

    impl GivesUpAfter {
        fn new(fail_from: usize) -> Self {
            GivesUpAfter {
                calls: Cell::new(0),
                fail_from,
                inner: BracketingSolver::default(),
            }
        }
    }

    impl RootFinder for GivesUpAfter {
        fn find_root(
            &self,
            objective: &dyn EquilibriumObjective,
            initial_guess: f64,
        ) -> Result<RootSolution, NonConvergence> {
            let call = self.calls.get();
            self.calls.set(call + 1);
            if call >= self.fail_from {
                return Err(NonConvergence::MaxIterations {
                    iterations: 100,
                    residual: 2.5e3,
                });
            }
            self.inner.find_root(objective, initial_guess)
        }

        fn force_tolerance(&self) -> f64 {
            self.inner.force_tolerance()
        }
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
    fn test_curvature_sequence() {
        let range = CurvatureRange::new(0.0, 1e-5, 5);
        let curvatures = range.curvatures().unwrap();
        assert_eq!(curvatures.len(), 5);
        assert_eq!(curvatures[0], 0.0);
        assert_eq!(curvatures[4], 1e-5);
        assert!((curvatures[2] - 5e-6).abs() < 1e-18);
    }

    #[test]
    fn test_single_step_is_start() {
        let curvatures = CurvatureRange::new(2e-6, 9e-6, 1).curvatures().unwrap();
        assert_eq!(curvatures, vec![2e-6]);
    }

    #[test]
    fn test_invalid_ranges_rejected_before_solving() {
        let config = reinforced_section();
        let driver = CurvatureSweepDriver::new(&config);
        assert!(driver.sweep(0.0, 0.0, 1e-5, 0).is_err());
        assert!(driver.sweep(0.0, f64::NAN, 1e-5, 10).is_err());
        assert!(driver.sweep(0.0, 0.0, f64::INFINITY, 10).is_err());
        assert!(driver.sweep(f64::NAN, 0.0, 1e-5, 10).is_err());
    }

    #[test]
    fn test_exhaustion_reports_no_failure() {
        let config = reinforced_section();
        let result = CurvatureSweepDriver::new(&config).sweep(100e3, 0.0, 1e-7, 5).unwrap();
        assert_eq!(result.failure_mode, FailureMode::NoFailure);
        assert_eq!(result.len(), 5);
        assert_eq!(result.final_curvature(), Some(1e-7));
        assert!(result.records().iter().all(|r| r.residual.abs() <= 1.0 && r.converged));
        assert_eq!(result.unconverged_steps(), 0);
        // moment grows with curvature in the elastic range
        for pair in result.records().windows(2) {
            assert!(pair[1].moment > pair[0].moment);
        }
    }

    #[test]
    fn test_crushing_keeps_failing_step() {
        let config = reinforced_section();
        let result = CurvatureSweepDriver::new(&config).sweep(0.0, 0.0, 0.0015, 200).unwrap();
        match result.failure_mode {
            FailureMode::ConcreteCrushing {
                curvature,
                min_strain,
                ultimate_strain,
            } => {
                let last = result.records().last().unwrap();
                assert_eq!(last.curvature, curvature);
                assert_eq!(last.min_strain, min_strain);
                assert!(min_strain <= -ultimate_strain);
            }
            ref other => panic!("expected crushing, got {:?}", other),
        }
        assert!(result.len() < 200);
        assert!(result.failure_mode.is_structural_failure());
        let max_moment = result.max_moment().unwrap();
        assert!(max_moment > 0.0 && max_moment.is_finite());
    }

    #[test]
    fn test_non_convergence_excludes_step() {
        let config = SectionConfiguration::new(
            ConcreteGrade::C30,
            SteelGrade::Hrb400,
            SectionGeometry::rectangular(300.0, 500.0).unwrap(),
            vec![],
        )
        .unwrap();
        let result = CurvatureSweepDriver::new(&config).sweep(1e9, 0.0, 1e-5, 10).unwrap();
        assert!(result.is_empty());
        assert_eq!(result.max_moment(), None);
        match &result.failure_mode {
            FailureMode::NonConvergence { curvature, reason } => {
                assert_eq!(*curvature, 0.0);
                assert!(!reason.is_empty());
            }
            other => panic!("expected non-convergence, got {:?}", other),
        }
        assert!(result.failure_mode.label().starts_with("Non-convergence"));
    }

    #[test]
    fn test_mid_sweep_failure_keeps_earlier_steps() {
        let config = reinforced_section();
        let range = CurvatureRange::new(0.0, 1e-7, 5);
        let driver = CurvatureSweepDriver::with_root_finder(&config, GivesUpAfter::new(3));
        let result = driver.sweep_range(100e3, &range).unwrap();

        assert_eq!(result.len(), 3);
        assert!(result.records().iter().all(|r| r.converged));
        let curvatures = range.curvatures().unwrap();
        let recorded: Vec<f64> = result.records().iter().map(|r| r.curvature).collect();
        assert_eq!(recorded, curvatures[..3].to_vec());
        match &result.failure_mode {
            FailureMode::NonConvergence { curvature, reason } => {
                assert_eq!(*curvature, curvatures[3]);
                assert!(reason.contains("100 iterations"));
            }
            other => panic!("expected non-convergence, got {:?}", other),
        }
        assert_eq!(result.final_curvature(), Some(curvatures[2]));
        assert_eq!(result.max_moment(), Some(result.records()[2].moment));
    }

    #[test]
    fn test_residual_jump_is_flagged_and_left_out_of_max_moment() {
        // the cracking jump leaves no exact root at the fourth step
        let config = reinforced_section();
        let result = CurvatureSweepDriver::new(&config).sweep(0.0, 0.0, 0.0015, 200).unwrap();
        assert!(result.failure_mode.is_structural_failure());

        for record in result.records() {
            assert_eq!(record.converged, record.residual.abs() <= 1.0);
        }
        assert!(!result.records()[3].converged);
        assert!(result.records()[3].residual.abs() > 1.0e3);
        assert!(result.unconverged_steps() >= 1);

        let converged_max = result
            .records()
            .iter()
            .filter(|r| r.converged)
            .map(|r| r.moment)
            .fold(f64::NEG_INFINITY, f64::max);
        assert_eq!(result.max_moment(), Some(converged_max));
    }

    #[test]
    fn test_failure_mode_labels() {
        assert_eq!(FailureMode::NoFailure.label(), "No failure within the curvature range");
        let crushing = FailureMode::ConcreteCrushing {
            curvature: 6.8e-5,
            min_strain: -0.0036,
            ultimate_strain: 0.0035,
        };
        assert!(crushing.label().starts_with("Concrete crushing"));
    }
}
