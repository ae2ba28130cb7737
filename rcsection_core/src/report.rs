//! # Analysis Reports
//!
//! Assembles everything an engineer needs from one configuration file:
//! section and material data, an optional single-point evaluation, an
//! optional equilibrium ("balance") solution and the full moment-curvature
//! trace. Forces are reported in kN and moments in kN·m.
//!
//! ## Example
//!
//! ```rust
//! use rcsection_core::config::SectionConfigFile;
//! use rcsection_core::report::AnalysisReport;
//!
//! let mut file = SectionConfigFile::template();
//! file.analysis.curvature_range.steps = 5;
//! file.analysis.curvature_range.end = 1e-6;
//!
//! let report = AnalysisReport::generate(&file, None)?;
//! assert_eq!(report.full_analysis.n_steps, 5);
//! assert!(report.single_calculation.is_some());
//! # Ok::<(), rcsection_core::errors::SectionError>(())
//! ```

use std::path::Path;

use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::calculations::{analyze, AnalysisResult, FailureMode};
use crate::config::SectionConfigFile;
use crate::errors::SectionResult;
use crate::materials::MaterialParameters;
use crate::section::{ContourPoint, SectionConfiguration};
use crate::units::{KilonewtonMeters, Kilonewtons, NewtonMillimeters, Newtons};

fn kilonewtons(newtons: f64) -> f64 {
    Kilonewtons::from(Newtons(newtons)).value()
}

fn kilonewton_meters(newton_millimeters: f64) -> f64 {
    KilonewtonMeters::from(NewtonMillimeters(newton_millimeters)).value()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigInfo {
    pub section_name: String,
    pub description: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_file: Option<String>,
    pub analyzed_at: DateTime<Utc>,
}

/// A resolved reinforcement layer as reported. Bar count and diameter come
/// from the file's layer of the same name, when there is one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
    /// mm
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diameter: Option<f64>,
    /// mm²
    pub area: f64,
    /// Height coordinate (mm)
    pub position: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionInfo {
    /// mm
    pub height: f64,
    /// mm²
    pub area: f64,
    pub contour: Vec<ContourPoint>,
    pub fiber_count: usize,
    pub reinforcement: Vec<LayerInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialsInfo {
    pub concrete: String,
    pub steel: String,
    pub parameters: MaterialParameters,
}

/// Section forces at a prescribed (κ, ε₀).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SingleCalculation {
    pub kappa: f64,
    pub epsilon0: f64,
    /// kN, compression positive
    pub axial_force: f64,
    /// kN·m
    pub moment: f64,
}

/// Outcome of solving axial equilibrium at one curvature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BalanceOutcome {
    Converged {
        epsilon0: f64,
        /// kN
        axial_force: f64,
        /// kN·m
        moment: f64,
        /// N
        residual: f64,
    },
    /// The solver stopped on a jump in the residual; the state is the
    /// nearest it got and is not in equilibrium.
    Unconverged {
        epsilon0: f64,
        /// kN
        axial_force: f64,
        /// kN·m
        moment: f64,
        /// N
        residual: f64,
    },
    NonConvergence {
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceCalculation {
    pub kappa: f64,
    /// kN
    pub target_axial_force: f64,
    pub outcome: BalanceOutcome,
}

/// One row of the moment-curvature trace.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepReport {
    pub curvature: f64,
    pub epsilon0: f64,
    /// kN·m
    pub moment: f64,
    pub max_concrete_strain: f64,
    pub min_concrete_strain: f64,
    pub converged: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FullAnalysis {
    pub n_steps: usize,
    pub requested_steps: usize,
    /// kN·m, over converged steps only
    pub max_moment: Option<f64>,
    /// Recorded steps left on a residual jump
    #[serde(default)]
    pub unconverged_steps: usize,
    /// Human-readable failure description
    pub failure_mode: String,
    pub failure: FailureMode,
    pub final_curvature: Option<f64>,
    pub steps: Vec<StepReport>,
}

impl From<&AnalysisResult> for FullAnalysis {
    fn from(result: &AnalysisResult) -> Self {
        FullAnalysis {
            n_steps: result.len(),
            requested_steps: result.requested_steps,
            max_moment: result.max_moment().map(kilonewton_meters),
            unconverged_steps: result.unconverged_steps(),
            failure_mode: result.failure_mode.label(),
            failure: result.failure_mode.clone(),
            final_curvature: result.final_curvature(),
            steps: result
                .records()
                .iter()
                .map(|r| StepReport {
                    curvature: r.curvature,
                    epsilon0: r.epsilon0,
                    moment: kilonewton_meters(r.moment),
                    max_concrete_strain: r.max_strain,
                    min_concrete_strain: r.min_strain,
                    converged: r.converged,
                })
                .collect(),
        }
    }
}

/// Complete report for one configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub config_info: ConfigInfo,
    pub section_info: SectionInfo,
    pub materials: MaterialsInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub single_calculation: Option<SingleCalculation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance_calculation: Option<BalanceCalculation>,
    pub full_analysis: FullAnalysis,
}

impl AnalysisReport {
    /// Build the section, run the sweep and assemble the report.
    ///
    /// When the file has a `single_calculation`, the section forces at its
    /// (κ, ε₀) and the equilibrium at its κ are included.
    pub fn generate(file: &SectionConfigFile, source: Option<&Path>) -> SectionResult<Self> {
        file.validate()?;
        let config = file.to_configuration()?;
        let request = file.analysis_request()?;
        let result = analyze(&config, &request)?;
        info!(
            "Analysis of '{}' finished: {} steps, {}",
            file.section_name,
            result.len(),
            result.failure_mode.label()
        );
        Ok(AnalysisReport::assemble(file, &config, &result, source))
    }

    /// Assemble a report from an already computed sweep.
    pub fn assemble(
        file: &SectionConfigFile,
        config: &SectionConfiguration,
        result: &AnalysisResult,
        source: Option<&Path>,
    ) -> Self {
        let reinforcement = config
            .reinforcement()
            .iter()
            .map(|point| {
                let spec = file.reinforcement.layers.get(&point.name);
                LayerInfo {
                    name: point.name.clone(),
                    count: spec.map(|s| s.count),
                    diameter: spec.map(|s| s.diameter),
                    area: point.area,
                    position: point.position,
                }
            })
            .collect();

        let (single_calculation, balance_calculation) = match &file.analysis.single_calculation {
            Some(single) => {
                let forces = config.evaluate(single.kappa, single.epsilon0);
                let single_calculation = SingleCalculation {
                    kappa: single.kappa,
                    epsilon0: single.epsilon0,
                    axial_force: kilonewtons(forces.axial_force),
                    moment: kilonewton_meters(forces.moment),
                };
                let outcome = match config.solve_epsilon0(single.kappa, result.target_axial_force) {
                    Ok(state) if state.converged => BalanceOutcome::Converged {
                        epsilon0: state.epsilon0,
                        axial_force: kilonewtons(state.axial_force),
                        moment: kilonewton_meters(state.moment),
                        residual: state.residual,
                    },
                    Ok(state) => {
                        warn!(
                            "Balance at curvature {:e}: residual {:.3e} N exceeds the force tolerance",
                            single.kappa, state.residual
                        );
                        BalanceOutcome::Unconverged {
                            epsilon0: state.epsilon0,
                            axial_force: kilonewtons(state.axial_force),
                            moment: kilonewton_meters(state.moment),
                            residual: state.residual,
                        }
                    }
                    Err(e) => BalanceOutcome::NonConvergence { reason: e.to_string() },
                };
                let balance = BalanceCalculation {
                    kappa: single.kappa,
                    target_axial_force: kilonewtons(result.target_axial_force),
                    outcome,
                };
                (Some(single_calculation), Some(balance))
            }
            None => (None, None),
        };

        AnalysisReport {
            config_info: ConfigInfo {
                section_name: file.section_name.clone(),
                description: file.description.clone(),
                version: file.version.clone(),
                config_file: source.map(|p| p.display().to_string()),
                analyzed_at: Utc::now(),
            },
            section_info: SectionInfo {
                height: config.geometry().height(),
                area: config.geometry().area(),
                contour: config.geometry().points().to_vec(),
                fiber_count: config.fiber_count(),
                reinforcement,
            },
            materials: MaterialsInfo {
                concrete: file.materials.concrete_type.clone(),
                steel: file.materials.steel_type.clone(),
                parameters: *config.materials(),
            },
            single_calculation,
            balance_calculation,
            full_analysis: FullAnalysis::from(result),
        }
    }
}
