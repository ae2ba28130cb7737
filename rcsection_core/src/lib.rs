//! # rcsection_core - Reinforced-Concrete Section Analysis Engine
//!
//! `rcsection_core` computes the moment-curvature response of a symmetric
//! reinforced-concrete cross-section under a prescribed axial force using
//! fiber-based nonlinear section analysis. All inputs and outputs are
//! JSON-serializable.
//!
//! ## Design Philosophy
//!
//! - **Immutable configurations**: builders return new values, nothing is
//!   mutated behind an analysis
//! - **Explicit placement**: every reinforcement layer carries its own anchor
//! - **Typed outcomes**: crushing and non-convergence are reported as a
//!   [`calculations::FailureMode`], not as errors
//! - **Rich errors**: structured error types, not just strings
//!
//! ## Quick Start
//!
//! ```rust
//! use rcsection_core::calculations::FailureMode;
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
//! let state = config.solve_epsilon0(1e-7, 200e3)?;
//! assert!(state.residual.abs() <= 1.0);
//! # Ok::<(), rcsection_core::errors::SectionError>(())
//! ```
//!
//! ## Modules
//!
//! - [`materials`] - Concrete and steel grades and stress-strain laws
//! - [`section`] - Geometry, reinforcement, fiber mesh and configuration
//! - [`calculations`] - Force evaluation, equilibrium and curvature sweep
//! - [`config`] - JSON configuration files
//! - [`report`] - Analysis reports in kN and kN·m
//! - [`file_io`] - Loading configurations, atomic saves and CSV export
//! - [`units`] - Type-safe unit wrappers
//! - [`errors`] - Structured error types

pub mod calculations;
pub mod config;
pub mod errors;
pub mod file_io;
pub mod materials;
pub mod report;
pub mod section;
pub mod units;

// Re-export commonly used types at crate root for convenience
pub use calculations::{analyze, AnalysisRequest, AnalysisResult, CurvatureRange, FailureMode};
pub use config::SectionConfigFile;
pub use errors::{SectionError, SectionResult};
pub use file_io::{load_config, save_json, write_results_csv};
pub use report::AnalysisReport;
pub use section::SectionConfiguration;
