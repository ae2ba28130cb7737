//! Reinforcing steel grades and the elastic-perfectly-plastic law
//!
//! Characteristic yield strengths follow the Chinese bar designations. The
//! design yield strength applies the partial factor [`GAMMA_S`].

use serde::{Deserialize, Serialize};

use crate::errors::{SectionError, SectionResult};

/// Partial safety factor for reinforcing steel
pub const GAMMA_S: f64 = 1.15;

/// Elastic modulus of reinforcing steel (MPa)
pub const STEEL_MODULUS_MPA: f64 = 2.0e5;

/// Reinforcing bar grades
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SteelGrade {
    /// Plain round bar, f_yk = 300 MPa
    #[serde(rename = "HPB300")]
    Hpb300,
    /// Hot-rolled ribbed bar, f_yk = 335 MPa
    #[serde(rename = "HRB335")]
    Hrb335,
    /// Hot-rolled ribbed bar, f_yk = 400 MPa
    #[serde(rename = "HRB400")]
    Hrb400,
    /// Hot-rolled ribbed bar, f_yk = 500 MPa
    #[serde(rename = "HRB500")]
    Hrb500,
    /// Residual-heat-treated ribbed bar, f_yk = 400 MPa
    #[serde(rename = "RRB400")]
    Rrb400,
}

impl SteelGrade {
    /// All steel grades for selection lists
    pub const ALL: [SteelGrade; 5] = [
        SteelGrade::Hpb300,
        SteelGrade::Hrb335,
        SteelGrade::Hrb400,
        SteelGrade::Hrb500,
        SteelGrade::Rrb400,
    ];

    /// Characteristic yield strength f_yk (MPa)
    pub fn f_yk_mpa(&self) -> f64 {
        match self {
            SteelGrade::Hpb300 => 300.0,
            SteelGrade::Hrb335 => 335.0,
            SteelGrade::Hrb400 => 400.0,
            SteelGrade::Hrb500 => 500.0,
            SteelGrade::Rrb400 => 400.0,
        }
    }

    /// Design yield strength f_yd = f_yk / γs (MPa)
    pub fn f_yd_mpa(&self) -> f64 {
        self.f_yk_mpa() / GAMMA_S
    }

    /// Grade code as written in configuration files
    pub fn code(&self) -> &'static str {
        match self {
            SteelGrade::Hpb300 => "HPB300",
            SteelGrade::Hrb335 => "HRB335",
            SteelGrade::Hrb400 => "HRB400",
            SteelGrade::Hrb500 => "HRB500",
            SteelGrade::Rrb400 => "RRB400",
        }
    }

    /// Parse from common string representations ("HRB400", "hrb 400")
    pub fn from_str_flexible(s: &str) -> SectionResult<Self> {
        match s.trim().to_uppercase().replace([' ', '-', '_'], "").as_str() {
            "HPB300" => Ok(SteelGrade::Hpb300),
            "HRB335" => Ok(SteelGrade::Hrb335),
            "HRB400" => Ok(SteelGrade::Hrb400),
            "HRB500" => Ok(SteelGrade::Hrb500),
            "RRB400" => Ok(SteelGrade::Rrb400),
            _ => Err(SectionError::material_not_found(s)),
        }
    }

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            SteelGrade::Hpb300 => "HPB300 plain round bar",
            SteelGrade::Hrb335 => "HRB335 ribbed bar",
            SteelGrade::Hrb400 => "HRB400 ribbed bar",
            SteelGrade::Hrb500 => "HRB500 ribbed bar",
            SteelGrade::Rrb400 => "RRB400 heat-treated ribbed bar",
        }
    }
}

impl std::fmt::Display for SteelGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Steel stress, tension positive: `clamp(e_s·ε, −f_yd, +f_yd)`.
pub fn steel_stress(strain: f64, f_yd: f64, e_s: f64) -> f64 {
    (e_s * strain).clamp(-f_yd, f_yd)
}
