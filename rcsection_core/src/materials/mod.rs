//! # Materials
//!
//! Concrete and reinforcing steel definitions, and the constitutive laws the
//! section analysis integrates over the fiber mesh.
//!
//! ## Material Types
//!
//! - **Concrete**: grades C20–C80, parabolic-linear compression, linear
//!   softening tension
//! - **Steel**: HPB300, HRB335, HRB400, HRB500, RRB400, elastic-perfectly
//!   plastic
//!
//! ## Example
//!
//! ```rust
//! use rcsection_core::materials::{ConcreteGrade, MaterialParameters, SteelGrade};
//!
//! let params = MaterialParameters::from_grades(ConcreteGrade::C30, SteelGrade::Hrb400);
//! assert_eq!(params.f_cd, 30.0);
//! assert!((params.f_yd - 347.83).abs() < 0.01);
//! ```

pub mod concrete;
pub mod steel;

pub use concrete::{concrete_compressive_stress, concrete_tensile_stress, ConcreteGrade};
pub use steel::{steel_stress, SteelGrade, GAMMA_S, STEEL_MODULUS_MPA};

use serde::{Deserialize, Serialize};

use crate::errors::{SectionError, SectionResult};

/// Concrete elastic modulus used for every grade (MPa)
pub const CONCRETE_MODULUS_MPA: f64 = 3.0e4;
/// Strain at peak compressive stress
pub const CONCRETE_PEAK_STRAIN: f64 = 0.002;
/// Ultimate (crushing) compressive strain
pub const CONCRETE_ULTIMATE_STRAIN: f64 = 0.0035;
/// Tensile strain at which softening starts
pub const CONCRETE_CRACKING_STRAIN: f64 = 1e-4;
/// Tensile strain beyond which the concrete carries no tension
pub const CONCRETE_ULTIMATE_TENSILE_STRAIN: f64 = 1e-3;

/// Material constants consumed by the section analysis.
///
/// Stresses and moduli are in MPa, strains are dimensionless magnitudes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaterialParameters {
    /// Design compressive strength of concrete
    pub f_cd: f64,
    /// Design tensile strength of concrete
    pub f_td: f64,
    /// Concrete elastic modulus
    pub e_c: f64,
    /// Peak compressive strain
    pub eps0: f64,
    /// Ultimate compressive strain
    pub epsu: f64,
    /// Tensile cracking strain
    pub eps_t0: f64,
    /// Ultimate tensile strain
    pub eps_tu: f64,
    /// Design yield strength of steel
    pub f_yd: f64,
    /// Steel elastic modulus
    pub e_s: f64,
}

impl MaterialParameters {
    /// Derive the parameter set for a concrete/steel grade pair.
    pub fn from_grades(concrete: ConcreteGrade, steel: SteelGrade) -> Self {
        let f_ck = concrete.f_ck_mpa();
        MaterialParameters {
            f_cd: f_ck,
            f_td: (0.2 * f_ck).max(0.0),
            e_c: CONCRETE_MODULUS_MPA,
            eps0: CONCRETE_PEAK_STRAIN,
            epsu: CONCRETE_ULTIMATE_STRAIN,
            eps_t0: CONCRETE_CRACKING_STRAIN,
            eps_tu: CONCRETE_ULTIMATE_TENSILE_STRAIN,
            f_yd: steel.f_yd_mpa(),
            e_s: STEEL_MODULUS_MPA,
        }
    }

    /// Check the parameter invariants: positive strengths and moduli, and
    /// peak strains strictly below their ultimate strains.
    pub fn validate(&self) -> SectionResult<()> {
        let positive = [
            ("f_cd", self.f_cd),
            ("f_td", self.f_td),
            ("e_c", self.e_c),
            ("eps0", self.eps0),
            ("eps_t0", self.eps_t0),
            ("f_yd", self.f_yd),
            ("e_s", self.e_s),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(SectionError::invalid_input(
                    field,
                    value.to_string(),
                    "Material constant must be positive and finite",
                ));
            }
        }
        if !(self.epsu.is_finite() && self.eps0 < self.epsu) {
            return Err(SectionError::invalid_input(
                "epsu",
                self.epsu.to_string(),
                format!("Ultimate compressive strain must exceed peak strain {}", self.eps0),
            ));
        }
        if !(self.eps_tu.is_finite() && self.eps_t0 < self.eps_tu) {
            return Err(SectionError::invalid_input(
                "eps_tu",
                self.eps_tu.to_string(),
                format!("Ultimate tensile strain must exceed cracking strain {}", self.eps_t0),
            ));
        }
        Ok(())
    }

    /// Signed concrete stress, tension positive.
    ///
    /// The compressive and tensile branches are mutually exclusive by the sign
    /// of the strain, so one of the two terms is always zero.
    pub fn concrete_stress(&self, strain: f64) -> f64 {
        concrete_tensile_stress(strain, self.f_td, self.e_c, self.eps_t0, self.eps_tu)
            - concrete_compressive_stress(strain, self.f_cd, self.eps0, self.epsu)
    }

    /// Steel stress, tension positive.
    pub fn steel_stress(&self, strain: f64) -> f64 {
        steel_stress(strain, self.f_yd, self.e_s)
    }

    /// Yield strain of the reinforcement f_yd / E_s
    pub fn steel_yield_strain(&self) -> f64 {
        self.f_yd / self.e_s
    }
}

impl Default for MaterialParameters {
    fn default() -> Self {
        MaterialParameters::from_grades(ConcreteGrade::C30, SteelGrade::Hrb400)
    }
}
