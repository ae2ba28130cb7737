//! Concrete grades and stress-strain laws (GB 50010 style)
//!
//! Grades are named by their characteristic cube strength in MPa, C20 to C80
//! in steps of 5. The compressive law is the parabola-rectangle variant with a
//! linear descending branch; the tensile law is linear up to cracking followed
//! by linear softening.

use serde::{Deserialize, Serialize};

use crate::errors::{SectionError, SectionResult};

/// Concrete strength grades
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ConcreteGrade {
    C20,
    C25,
    C30,
    C35,
    C40,
    C45,
    C50,
    C55,
    C60,
    C65,
    C70,
    C75,
    C80,
}

impl ConcreteGrade {
    /// All concrete grades, weakest first
    pub const ALL: [ConcreteGrade; 13] = [
        ConcreteGrade::C20,
        ConcreteGrade::C25,
        ConcreteGrade::C30,
        ConcreteGrade::C35,
        ConcreteGrade::C40,
        ConcreteGrade::C45,
        ConcreteGrade::C50,
        ConcreteGrade::C55,
        ConcreteGrade::C60,
        ConcreteGrade::C65,
        ConcreteGrade::C70,
        ConcreteGrade::C75,
        ConcreteGrade::C80,
    ];

    /// Characteristic compressive strength f_ck (MPa)
    pub fn f_ck_mpa(&self) -> f64 {
        match self {
            ConcreteGrade::C20 => 20.0,
            ConcreteGrade::C25 => 25.0,
            ConcreteGrade::C30 => 30.0,
            ConcreteGrade::C35 => 35.0,
            ConcreteGrade::C40 => 40.0,
            ConcreteGrade::C45 => 45.0,
            ConcreteGrade::C50 => 50.0,
            ConcreteGrade::C55 => 55.0,
            ConcreteGrade::C60 => 60.0,
            ConcreteGrade::C65 => 65.0,
            ConcreteGrade::C70 => 70.0,
            ConcreteGrade::C75 => 75.0,
            ConcreteGrade::C80 => 80.0,
        }
    }

    /// Grade code as written in configuration files (e.g. "C30")
    pub fn code(&self) -> &'static str {
        match self {
            ConcreteGrade::C20 => "C20",
            ConcreteGrade::C25 => "C25",
            ConcreteGrade::C30 => "C30",
            ConcreteGrade::C35 => "C35",
            ConcreteGrade::C40 => "C40",
            ConcreteGrade::C45 => "C45",
            ConcreteGrade::C50 => "C50",
            ConcreteGrade::C55 => "C55",
            ConcreteGrade::C60 => "C60",
            ConcreteGrade::C65 => "C65",
            ConcreteGrade::C70 => "C70",
            ConcreteGrade::C75 => "C75",
            ConcreteGrade::C80 => "C80",
        }
    }

    /// Parse from common string representations ("C30", "c30", "C 30", "C-30")
    pub fn from_str_flexible(s: &str) -> SectionResult<Self> {
        let normalized = s.trim().to_uppercase().replace([' ', '-', '_'], "");
        ConcreteGrade::ALL
            .iter()
            .copied()
            .find(|grade| grade.code() == normalized)
            .ok_or_else(|| SectionError::material_not_found(s))
    }

    /// Get display name
    pub fn display_name(&self) -> String {
        format!("Concrete {}", self.code())
    }
}

impl std::fmt::Display for ConcreteGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Compressive stress magnitude for a concrete strain.
///
/// Compression is negative strain. The returned value is a non-negative
/// magnitude; callers apply it as compression.
///
/// - `|ε| ≤ eps0`: `f_cd·(2·r − r²)` with `r = |ε|/eps0`
/// - `eps0 < |ε| ≤ epsu`: `f_cd·(1 − 0.8·(|ε| − eps0)/(epsu − eps0))`
/// - crushed (`|ε| > epsu`) or not in compression (`ε ≥ 0`): 0
pub fn concrete_compressive_stress(strain: f64, f_cd: f64, eps0: f64, epsu: f64) -> f64 {
    if strain >= 0.0 {
        return 0.0;
    }
    let magnitude = strain.abs();

    if magnitude <= eps0 {
        let ratio = magnitude / eps0;
        f_cd * (2.0 * ratio - ratio * ratio)
    } else if magnitude <= epsu {
        f_cd * (1.0 - 0.8 * (magnitude - eps0) / (epsu - eps0))
    } else {
        0.0
    }
}

/// Tensile stress for a concrete strain.
///
/// - `ε ≤ 0`: 0
/// - `0 < ε ≤ eps_t0`: `e_c·ε`
/// - `eps_t0 < ε ≤ eps_tu`: `f_td·(1 − 1.7·(ε − eps_t0)/(eps_tu − eps_t0))`
/// - cracked (`ε > eps_tu`): 0
///
/// The softening branch is applied as written and turns negative once the
/// strain passes `eps_t0 + (eps_tu − eps_t0)/1.7`.
pub fn concrete_tensile_stress(strain: f64, f_td: f64, e_c: f64, eps_t0: f64, eps_tu: f64) -> f64 {
    if strain <= 0.0 {
        return 0.0;
    }

    if strain <= eps_t0 {
        e_c * strain
    } else if strain <= eps_tu {
        f_td * (1.0 - 1.7 * (strain - eps_t0) / (eps_tu - eps_t0))
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const F_CD: f64 = 30.0;
    const EPS0: f64 = 0.002;
    const EPSU: f64 = 0.0035;

    #[test]
    fn test_grade_strengths() {
        assert_eq!(ConcreteGrade::C20.f_ck_mpa(), 20.0);
        assert_eq!(ConcreteGrade::C80.f_ck_mpa(), 80.0);
        for pair in ConcreteGrade::ALL.windows(2) {
            assert_eq!(pair[1].f_ck_mpa() - pair[0].f_ck_mpa(), 5.0);
        }
    }

    #[test]
    fn test_parse_flexible() {
        assert_eq!(ConcreteGrade::from_str_flexible("C30").unwrap(), ConcreteGrade::C30);
        assert_eq!(ConcreteGrade::from_str_flexible(" c45 ").unwrap(), ConcreteGrade::C45);
        assert_eq!(ConcreteGrade::from_str_flexible("C-60").unwrap(), ConcreteGrade::C60);
        let err = ConcreteGrade::from_str_flexible("C33").unwrap_err();
        assert_eq!(err.error_code(), "MATERIAL_NOT_FOUND");
    }

    #[test]
    fn test_serde_uses_code() {
        let json = serde_json::to_string(&ConcreteGrade::C35).unwrap();
        assert_eq!(json, "\"C35\"");
    }

    #[test]
    fn test_compression_zero_for_tension() {
        assert_eq!(concrete_compressive_stress(0.0, F_CD, EPS0, EPSU), 0.0);
        assert_eq!(concrete_compressive_stress(0.001, F_CD, EPS0, EPSU), 0.0);
    }

    #[test]
    fn test_compression_parabolic_branch() {
        // r = 0.5: 30 * (1.0 - 0.25) = 22.5
        let stress = concrete_compressive_stress(-0.001, F_CD, EPS0, EPSU);
        assert!((stress - 22.5).abs() < 1e-9);
        // peak at eps0
        let peak = concrete_compressive_stress(-EPS0, F_CD, EPS0, EPSU);
        assert!((peak - F_CD).abs() < 1e-9);
    }

    #[test]
    fn test_compression_descending_branch() {
        // At epsu the stress has dropped to 0.2 f_cd
        let at_ultimate = concrete_compressive_stress(-EPSU, F_CD, EPS0, EPSU);
        assert!((at_ultimate - 0.2 * F_CD).abs() < 1e-9);
        // midway: 30 * (1 - 0.4) = 18
        let mid = concrete_compressive_stress(-0.00275, F_CD, EPS0, EPSU);
        assert!((mid - 18.0).abs() < 1e-9);
    }

    #[test]
    fn test_compression_crushed() {
        assert_eq!(concrete_compressive_stress(-0.0036, F_CD, EPS0, EPSU), 0.0);
    }

    #[test]
    fn test_tension_branches() {
        let (f_td, e_c, eps_t0, eps_tu) = (6.0, 3.0e4, 1e-4, 1e-3);
        assert_eq!(concrete_tensile_stress(-0.001, f_td, e_c, eps_t0, eps_tu), 0.0);
        assert_eq!(concrete_tensile_stress(0.0, f_td, e_c, eps_t0, eps_tu), 0.0);
        // elastic
        let elastic = concrete_tensile_stress(5e-5, f_td, e_c, eps_t0, eps_tu);
        assert!((elastic - 1.5).abs() < 1e-12);
        // softening midpoint: 6 * (1 - 0.85) = 0.9
        let softening = concrete_tensile_stress(5.5e-4, f_td, e_c, eps_t0, eps_tu);
        assert!((softening - 0.9).abs() < 1e-9);
        // cracked
        assert_eq!(concrete_tensile_stress(1.1e-3, f_td, e_c, eps_t0, eps_tu), 0.0);
    }

    #[test]
    fn test_tension_softening_is_not_clamped() {
        let stress = concrete_tensile_stress(1e-3, 6.0, 3.0e4, 1e-4, 1e-3);
        assert!((stress + 4.2).abs() < 1e-9);
    }
}
