//! # Axial Equilibrium
//!
//! For a fixed curvature κ and target axial force N, find the strain offset
//! ε₀ that zeroes the axial residual `r(ε₀) = N(κ, ε₀) − N_target`.
//!
//! The residual is not smooth: the tension softening law jumps at the
//! cracking strain and at the ultimate tensile strain, and crushed fibers
//! drop to zero stress. Root finders therefore only see the residual through
//! [`EquilibriumObjective`] and must cope with jumps.
//!
//! ## Root Finders
//!
//! | Finder | Strategy | Failure |
//! |--------|----------|---------|
//! | [`BracketingSolver`] | outward scan + Illinois regula falsi | `NoSignChange` |
//! | [`SecantSolver`] | secant iteration from the guess | `MaxIterations`, `Stalled` |
//!
//! ## Example
//!
//! ```rust
//! use rcsection_core::calculations::{BracketingSolver, RootFinder};
//!
//! let solver = BracketingSolver::default();
//! let root = solver.find_root(&|x: f64| 2.0e6 * (x - 3.0e-4), 0.0).unwrap();
//! assert!(root.residual.abs() <= 1.0);
//! assert!((root.root - 3.0e-4).abs() < 1e-6);
//! ```

use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calculations::forces::SectionForceEvaluator;
use crate::errors::{SectionError, SectionResult};

/// Scalar function whose root is sought.
pub trait EquilibriumObjective {
    fn residual(&self, epsilon0: f64) -> f64;
}

impl<F> EquilibriumObjective for F
where
    F: Fn(f64) -> f64,
{
    fn residual(&self, epsilon0: f64) -> f64 {
        self(epsilon0)
    }
}

/// Why a root finder gave up.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "details")]
pub enum NonConvergence {
    /// The residual kept its sign over the whole search interval
    #[error("residual does not change sign within ±{search_limit} of the initial guess")]
    NoSignChange { search_limit: f64 },

    /// Iteration budget exhausted
    #[error("no convergence after {iterations} iterations (residual {residual:.3e} N)")]
    MaxIterations { iterations: usize, residual: f64 },

    /// Secant slope vanished or became non-finite
    #[error("iteration stalled after {iterations} iterations (residual {residual:.3e} N)")]
    Stalled { iterations: usize, residual: f64 },

    /// The residual itself was NaN or infinite
    #[error("non-finite residual at epsilon0 = {epsilon0:e}")]
    NonFinite { epsilon0: f64 },
}

/// Tolerances and limits shared by the root finders.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverSettings {
    pub max_iterations: usize,
    /// Accepted |residual| (N)
    pub force_tolerance: f64,
    /// Bracket width or step size at which iteration stops
    pub strain_tolerance: f64,
    /// First outward step of the bracket scan
    pub initial_step: f64,
    /// Largest offset from the guess the scan will try
    pub bracket_limit: f64,
    /// Among several roots within tolerance, the one nearest this strain wins
    #[serde(default)]
    pub preferred_root: f64,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            force_tolerance: 1.0,
            strain_tolerance: 1e-14,
            initial_step: 1e-4,
            bracket_limit: 1.0,
            preferred_root: 0.0,
        }
    }
}

impl SolverSettings {
    pub fn validate(&self) -> SectionResult<()> {
        if self.max_iterations == 0 {
            return Err(SectionError::invalid_input(
                "max_iterations",
                "0",
                "max_iterations must be greater than zero",
            ));
        }
        let positive = [
            ("force_tolerance", self.force_tolerance),
            ("strain_tolerance", self.strain_tolerance),
            ("initial_step", self.initial_step),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(SectionError::invalid_input(field, value.to_string(), "must be positive"));
            }
        }
        if !(self.bracket_limit.is_finite() && self.bracket_limit >= self.initial_step) {
            return Err(SectionError::invalid_input(
                "bracket_limit",
                self.bracket_limit.to_string(),
                format!("must be at least initial_step ({})", self.initial_step),
            ));
        }
        if !self.preferred_root.is_finite() {
            return Err(SectionError::invalid_input(
                "preferred_root",
                self.preferred_root.to_string(),
                "must be finite",
            ));
        }
        Ok(())
    }
}

/// A root together with the residual actually achieved there.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RootSolution {
    pub root: f64,
    pub residual: f64,
    pub iterations: usize,
}

/// Strategy for locating a root of an [`EquilibriumObjective`].
pub trait RootFinder {
    fn find_root(&self, objective: &dyn EquilibriumObjective, initial_guess: f64) -> Result<RootSolution, NonConvergence>;

    /// |residual| (N) below which a returned root counts as converged.
    fn force_tolerance(&self) -> f64;
}

fn checked_residual(objective: &dyn EquilibriumObjective, x: f64) -> Result<f64, NonConvergence> {
    let r = objective.residual(x);
    if r.is_finite() {
        Ok(r)
    } else {
        Err(NonConvergence::NonFinite { epsilon0: x })
    }
}

/// Smaller |residual| wins; ties go to the newer candidate `b`.
fn closer(a: RootSolution, b: RootSolution) -> RootSolution {
    if b.residual.abs() <= a.residual.abs() {
        b
    } else {
        a
    }
}

/// Outward bracket scan followed by Illinois regula falsi.
///
/// Points `guess ± initial_step·2ⁿ` are visited on the upper side, then the
/// lower side, up to `bracket_limit`. Each sign change between consecutive
/// points on one side is refined. Every point and refinement within the force
/// tolerance is collected, and the one nearest `preferred_root` is returned.
/// The softening branch of concrete in tension gives the residual spurious
/// roots at large elongation; the nearest-root rule keeps the solution on the
/// branch that is continuous with the unloaded state.
///
/// Without any root within tolerance the refinement with the smallest
/// |residual| is returned, which is the case when every sign change is a jump
/// in the residual. Callers compare its residual with [`force_tolerance`].
///
/// [`force_tolerance`]: RootFinder::force_tolerance
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BracketingSolver {
    settings: SolverSettings,
}

impl BracketingSolver {
    pub fn new(settings: SolverSettings) -> SectionResult<Self> {
        settings.validate()?;
        Ok(BracketingSolver { settings })
    }

    pub fn settings(&self) -> &SolverSettings {
        &self.settings
    }

    fn refine(
        &self,
        objective: &dyn EquilibriumObjective,
        (mut a, mut fa): (f64, f64),
        (mut b, mut fb): (f64, f64),
    ) -> Result<RootSolution, NonConvergence> {
        let mut best = closer(
            RootSolution { root: a, residual: fa, iterations: 0 },
            RootSolution { root: b, residual: fb, iterations: 0 },
        );
        // -1: b was replaced last, +1: a was replaced last
        let mut side = 0i8;

        for iteration in 1..=self.settings.max_iterations {
            let x = (a * fb - b * fa) / (fb - fa);
            if !x.is_finite() || x == a || x == b {
                break;
            }
            let fx = checked_residual(objective, x)?;
            best = closer(best, RootSolution { root: x, residual: fx, iterations: iteration });

            if fx.abs() <= self.settings.force_tolerance {
                break;
            }

            if (fx < 0.0) == (fb < 0.0) {
                b = x;
                fb = fx;
                if side == -1 {
                    fa *= 0.5;
                }
                side = -1;
            } else {
                a = x;
                fa = fx;
                if side == 1 {
                    fb *= 0.5;
                }
                side = 1;
            }

            if (b - a).abs() <= self.settings.strain_tolerance {
                break;
            }
        }

        Ok(best)
    }
}

impl RootFinder for BracketingSolver {
    fn find_root(&self, objective: &dyn EquilibriumObjective, initial_guess: f64) -> Result<RootSolution, NonConvergence> {
        let tolerance = self.settings.force_tolerance;
        let r0 = checked_residual(objective, initial_guess)?;

        let mut roots: Vec<RootSolution> = Vec::new();
        if r0.abs() <= tolerance {
            roots.push(RootSolution {
                root: initial_guess,
                residual: r0,
                iterations: 0,
            });
        }

        let mut jump: Option<RootSolution> = None;
        for direction in [1.0, -1.0] {
            let mut previous = (initial_guess, r0);
            let mut step = self.settings.initial_step;

            while step <= self.settings.bracket_limit {
                let x = initial_guess + direction * step;
                let r = checked_residual(objective, x)?;
                if r.abs() <= tolerance {
                    roots.push(RootSolution { root: x, residual: r, iterations: 0 });
                } else if previous.1.abs() > tolerance && (r < 0.0) != (previous.1 < 0.0) {
                    let candidate = self.refine(objective, previous, (x, r))?;
                    debug!(
                        "Refined bracket [{:e}, {:e}] -> epsilon0 = {:e}, residual = {:.3e} N",
                        previous.0, x, candidate.root, candidate.residual
                    );
                    if candidate.residual.abs() <= tolerance {
                        roots.push(candidate);
                    } else {
                        jump = Some(match jump {
                            Some(current) => closer(current, candidate),
                            None => candidate,
                        });
                    }
                }

                previous = (x, r);
                step *= 2.0;
            }
        }

        let preferred = self.settings.preferred_root;
        if roots.len() > 1 {
            debug!("{} roots within tolerance, taking the one nearest {:e}", roots.len(), preferred);
        }
        roots
            .into_iter()
            .min_by(|a, b| (a.root - preferred).abs().total_cmp(&(b.root - preferred).abs()))
            .or(jump)
            .ok_or(NonConvergence::NoSignChange {
                search_limit: self.settings.bracket_limit,
            })
    }

    fn force_tolerance(&self) -> f64 {
        self.settings.force_tolerance
    }
}

/// Derivative-free secant iteration starting at the guess and at
/// `guess + initial_step`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SecantSolver {
    settings: SolverSettings,
}

impl SecantSolver {
    pub fn new(settings: SolverSettings) -> SectionResult<Self> {
        settings.validate()?;
        Ok(SecantSolver { settings })
    }

    pub fn settings(&self) -> &SolverSettings {
        &self.settings
    }
}

impl RootFinder for SecantSolver {
    fn find_root(&self, objective: &dyn EquilibriumObjective, initial_guess: f64) -> Result<RootSolution, NonConvergence> {
        let mut x0 = initial_guess;
        let mut f0 = checked_residual(objective, x0)?;
        if f0.abs() <= self.settings.force_tolerance {
            return Ok(RootSolution { root: x0, residual: f0, iterations: 0 });
        }
        let mut x1 = initial_guess + self.settings.initial_step;
        let mut f1 = checked_residual(objective, x1)?;

        for iteration in 1..=self.settings.max_iterations {
            if f1.abs() <= self.settings.force_tolerance {
                return Ok(RootSolution {
                    root: x1,
                    residual: f1,
                    iterations: iteration - 1,
                });
            }

            let slope = (f1 - f0) / (x1 - x0);
            if !slope.is_finite() || slope == 0.0 {
                return Err(NonConvergence::Stalled {
                    iterations: iteration - 1,
                    residual: f1,
                });
            }

            let x2 = x1 - f1 / slope;
            let f2 = checked_residual(objective, x2)?;
            if (x2 - x1).abs() <= self.settings.strain_tolerance && f2.abs() > self.settings.force_tolerance {
                return Err(NonConvergence::Stalled {
                    iterations: iteration,
                    residual: f2,
                });
            }

            x0 = x1;
            f0 = f1;
            x1 = x2;
            f1 = f2;
        }

        if f1.abs() <= self.settings.force_tolerance {
            return Ok(RootSolution {
                root: x1,
                residual: f1,
                iterations: self.settings.max_iterations,
            });
        }
        Err(NonConvergence::MaxIterations {
            iterations: self.settings.max_iterations,
            residual: f1,
        })
    }

    fn force_tolerance(&self) -> f64 {
        self.settings.force_tolerance
    }
}

/// `N(κ, ε₀) − N_target` for one curvature.
#[derive(Debug, Clone, Copy)]
pub struct AxialResidual<'e, 'a> {
    evaluator: &'e SectionForceEvaluator<'a>,
    curvature: f64,
    target_axial_force: f64,
}

impl<'e, 'a> AxialResidual<'e, 'a> {
    pub fn new(evaluator: &'e SectionForceEvaluator<'a>, curvature: f64, target_axial_force: f64) -> Self {
        AxialResidual {
            evaluator,
            curvature,
            target_axial_force,
        }
    }
}

impl EquilibriumObjective for AxialResidual<'_, '_> {
    fn residual(&self, epsilon0: f64) -> f64 {
        self.evaluator.evaluate(self.curvature, epsilon0).axial_force - self.target_axial_force
    }
}

/// Solved section state at one curvature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquilibriumState {
    pub epsilon0: f64,
    /// Axial force at the solved state (N), compression positive
    pub axial_force: f64,
    /// Moment at the solved state (N·mm)
    pub moment: f64,
    /// `axial_force − target` at the solved state (N)
    pub residual: f64,
    pub iterations: usize,
    /// |residual| within the root finder's force tolerance. False when the
    /// finder settled on a jump in the residual.
    pub converged: bool,
}

/// Finds ε₀ for a curvature and a target axial force.
#[derive(Debug, Clone)]
pub struct EquilibriumSolver<'a, R: RootFinder = BracketingSolver> {
    evaluator: SectionForceEvaluator<'a>,
    root_finder: R,
}

impl<'a> EquilibriumSolver<'a, BracketingSolver> {
    pub fn new(evaluator: SectionForceEvaluator<'a>) -> Self {
        EquilibriumSolver {
            evaluator,
            root_finder: BracketingSolver::default(),
        }
    }
}

impl<'a, R: RootFinder> EquilibriumSolver<'a, R> {
    pub fn with_root_finder(evaluator: SectionForceEvaluator<'a>, root_finder: R) -> Self {
        EquilibriumSolver { evaluator, root_finder }
    }

    pub fn evaluator(&self) -> &SectionForceEvaluator<'a> {
        &self.evaluator
    }

    /// Compressive demand starts from a shortened section, anything else from
    /// an elongated one.
    pub fn initial_guess(target_axial_force: f64) -> f64 {
        if target_axial_force > 0.0 {
            -0.001
        } else {
            0.001
        }
    }

    /// Solve `N(κ, ε₀) = N_target` for ε₀.
    pub fn solve_epsilon0(&self, curvature: f64, target_axial_force: f64) -> Result<EquilibriumState, NonConvergence> {
        let objective = AxialResidual::new(&self.evaluator, curvature, target_axial_force);
        let guess = Self::initial_guess(target_axial_force);
        let solution = self.root_finder.find_root(&objective, guess)?;

        let forces = self.evaluator.evaluate(curvature, solution.root);
        let residual = forces.axial_force - target_axial_force;
        Ok(EquilibriumState {
            epsilon0: solution.root,
            axial_force: forces.axial_force,
            moment: forces.moment,
            residual,
            iterations: solution.iterations,
            converged: residual.abs() <= self.root_finder.force_tolerance(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materials::{ConcreteGrade, SteelGrade};
    use crate::section::{ReinforcementLayer, SectionConfiguration, SectionGeometry};
    use approx::assert_relative_eq;

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
    fn test_settings_defaults() {
        let settings = SolverSettings::default();
        assert_eq!(settings.max_iterations, 100);
        assert_eq!(settings.force_tolerance, 1.0);
        assert_eq!(settings.strain_tolerance, 1e-14);
        assert_eq!(settings.initial_step, 1e-4);
        assert_eq!(settings.bracket_limit, 1.0);
        assert_eq!(settings.preferred_root, 0.0);
        settings.validate().unwrap();
    }

    #[test]
    fn test_settings_validation() {
        let zero_iterations = SolverSettings {
            max_iterations: 0,
            ..SolverSettings::default()
        };
        assert!(BracketingSolver::new(zero_iterations).is_err());

        let bad_limit = SolverSettings {
            bracket_limit: 1e-5,
            ..SolverSettings::default()
        };
        assert!(SecantSolver::new(bad_limit).is_err());
    }

    #[test]
    fn test_bracketing_linear_root() {
        let solver = BracketingSolver::default();
        let root = solver.find_root(&|x: f64| 5.0e9 * (x + 2.0e-4), 0.001).unwrap();
        assert!(root.residual.abs() <= 1.0);
        assert_relative_eq!(root.root, -2.0e-4, max_relative = 1e-6);
    }

    #[test]
    fn test_bracketing_returns_guess_when_already_balanced() {
        let solver = BracketingSolver::default();
        let root = solver.find_root(&|x: f64| 1.0e9 * (x - 0.001), 0.001).unwrap();
        assert_eq!(root.root, 0.001);
        assert_eq!(root.iterations, 0);
    }

    #[test]
    fn test_bracketing_takes_root_nearest_zero() {
        // roots at -1e-4 and 6e-4; the scan from 0.001 meets 6e-4 first
        let f = |x: f64| 1.0e12 * (x + 1.0e-4) * (x - 6.0e-4);
        let root = BracketingSolver::default().find_root(&f, 0.001).unwrap();
        assert!(root.residual.abs() <= 1.0);
        assert_relative_eq!(root.root, -1.0e-4, max_relative = 1e-4);

        let settings = SolverSettings {
            preferred_root: 5.0e-4,
            ..SolverSettings::default()
        };
        let root = BracketingSolver::new(settings).unwrap().find_root(&f, 0.001).unwrap();
        assert_relative_eq!(root.root, 6.0e-4, max_relative = 1e-6);
    }

    #[test]
    fn test_zero_target_at_zero_curvature_is_unloaded_state() {
        let config = reinforced_section();
        let solver = EquilibriumSolver::new(SectionForceEvaluator::for_section(&config));
        let state = solver.solve_epsilon0(0.0, 0.0).unwrap();
        assert!(state.converged);
        assert!(state.epsilon0.abs() < 1e-9, "epsilon0 = {:e}", state.epsilon0);
    }

    #[test]
    fn test_bracketing_on_jump_reports_residual() {
        // step from -1000 to +1000 at 0.3: no exact root, converges on the jump
        let solver = BracketingSolver::default();
        let root = solver
            .find_root(&|x: f64| if x < 0.3 { -1000.0 } else { 1000.0 }, 0.0)
            .unwrap();
        assert_eq!(root.residual.abs(), 1000.0);
        assert!((root.root - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_bracketing_prefers_true_root_over_jump() {
        // jump at +0.0005 is found first, the continuous root at -0.0003 wins
        let f = |x: f64| {
            if x > 0.0005 {
                -1.0e6
            } else {
                1.0e9 * (x + 0.0003)
            }
        };
        let root = BracketingSolver::default().find_root(&f, 0.0).unwrap();
        assert!(root.residual.abs() <= 1.0);
        assert_relative_eq!(root.root, -0.0003, max_relative = 1e-6);
    }

    #[test]
    fn test_bracketing_no_sign_change() {
        let err = BracketingSolver::default().find_root(&|_x: f64| -5.0, 0.0).unwrap_err();
        assert_eq!(err, NonConvergence::NoSignChange { search_limit: 1.0 });
    }

    #[test]
    fn test_non_finite_residual() {
        let err = BracketingSolver::default().find_root(&|_x: f64| f64::NAN, 0.0).unwrap_err();
        assert!(matches!(err, NonConvergence::NonFinite { .. }));
    }

    #[test]
    fn test_secant_linear_root() {
        let root = SecantSolver::default()
            .find_root(&|x: f64| 3.0e9 * (x - 4.0e-4), 0.001)
            .unwrap();
        assert!(root.residual.abs() <= 1.0);
        assert!(root.iterations <= 3);
    }

    #[test]
    fn test_secant_stalls_on_flat_residual() {
        let err = SecantSolver::default().find_root(&|_x: f64| 10.0, 0.0).unwrap_err();
        assert!(matches!(err, NonConvergence::Stalled { iterations: 0, .. }));
    }

    #[test]
    fn test_secant_max_iterations() {
        let settings = SolverSettings {
            max_iterations: 3,
            ..SolverSettings::default()
        };
        // far from either root, three secant steps overshoot back and forth
        let f = |x: f64| x.atan() * 1.0e6 - 0.5e6 * x.signum();
        let err = SecantSolver::new(settings).unwrap().find_root(&f, 10.0).unwrap_err();
        assert!(matches!(err, NonConvergence::MaxIterations { iterations: 3, .. }));
    }

    #[test]
    fn test_initial_guess_heuristic() {
        assert_eq!(EquilibriumSolver::<BracketingSolver>::initial_guess(100e3), -0.001);
        assert_eq!(EquilibriumSolver::<BracketingSolver>::initial_guess(0.0), 0.001);
        assert_eq!(EquilibriumSolver::<BracketingSolver>::initial_guess(-50e3), 0.001);
    }

    #[test]
    fn test_solve_compressive_target() {
        let config = reinforced_section();
        let solver = EquilibriumSolver::new(SectionForceEvaluator::for_section(&config));
        let state = solver.solve_epsilon0(1e-7, 200e3).unwrap();
        assert!(state.residual.abs() <= 1.0);
        assert!(state.converged);
        assert!(state.epsilon0 < 0.0);
        assert_relative_eq!(state.axial_force, 200e3, max_relative = 1e-5);
        assert!(state.moment > 0.0);
    }

    #[test]
    fn test_secant_solver_on_section() {
        let config = reinforced_section();
        let evaluator = SectionForceEvaluator::for_section(&config);
        let solver = EquilibriumSolver::with_root_finder(evaluator, SecantSolver::default());
        let state = solver.solve_epsilon0(1e-7, 100e3).unwrap();
        assert!(state.residual.abs() <= 1.0);
        assert_relative_eq!(state.axial_force, 100e3, max_relative = 1e-5);
    }

    #[test]
    fn test_unreachable_target_does_not_converge() {
        let config = SectionConfiguration::new(
            ConcreteGrade::C30,
            SteelGrade::Hrb400,
            SectionGeometry::rectangular(300.0, 500.0).unwrap(),
            vec![],
        )
        .unwrap();
        let solver = EquilibriumSolver::new(SectionForceEvaluator::for_section(&config));
        let err = solver.solve_epsilon0(0.0, 1e9).unwrap_err();
        assert!(matches!(err, NonConvergence::NoSignChange { .. }));
    }

    #[test]
    fn test_non_convergence_display() {
        let err = NonConvergence::NoSignChange { search_limit: 1.0 };
        assert!(err.to_string().contains("does not change sign"));
    }
}
