//! # Unit Types
//!
//! Lightweight newtypes for the SI units used at the reporting boundary.
//!
//! The analysis core works in a single consistent system:
//! - Length: millimetres (mm)
//! - Force: newtons (N)
//! - Stress: megapascals (MPa = N/mm²)
//! - Moment: newton-millimetres (N·mm)
//! - Curvature: 1/mm
//!
//! Reports and configuration files use kilonewtons and kilonewton-metres,
//! so conversions live here rather than as scattered `/ 1e6` literals.
//!
//! ## Example
//!
//! ```rust
//! use rcsection_core::units::{KilonewtonMeters, Kilonewtons, NewtonMillimeters, Newtons};
//!
//! let n: Newtons = Kilonewtons(500.0).into();
//! assert_eq!(n.0, 500_000.0);
//!
//! let m: KilonewtonMeters = NewtonMillimeters(2.5e8).into();
//! assert_eq!(m.0, 250.0);
//! ```

use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Sub};

// ============================================================================
// Force Units
// ============================================================================

/// Force in newtons
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Newtons(pub f64);

/// Force in kilonewtons
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Kilonewtons(pub f64);

impl From<Newtons> for Kilonewtons {
    fn from(n: Newtons) -> Self {
        Kilonewtons(n.0 / 1000.0)
    }
}

impl From<Kilonewtons> for Newtons {
    fn from(kn: Kilonewtons) -> Self {
        Newtons(kn.0 * 1000.0)
    }
}

// ============================================================================
// Moment Units
// ============================================================================

/// Moment in newton-millimetres
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NewtonMillimeters(pub f64);

/// Moment in kilonewton-metres
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KilonewtonMeters(pub f64);

impl From<NewtonMillimeters> for KilonewtonMeters {
    fn from(m: NewtonMillimeters) -> Self {
        KilonewtonMeters(m.0 / 1.0e6)
    }
}

impl From<KilonewtonMeters> for NewtonMillimeters {
    fn from(m: KilonewtonMeters) -> Self {
        NewtonMillimeters(m.0 * 1.0e6)
    }
}

// ============================================================================
// Geometry / Stress Units
// ============================================================================

/// Length in millimetres
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Millimeters(pub f64);

/// Area in square millimetres
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SqMm(pub f64);

/// Stress in megapascals (N/mm²)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Megapascals(pub f64);

impl SqMm {
    /// Area of `count` round bars of diameter `diameter`: count·π·(d/2)²
    pub fn of_bars(count: u32, diameter: Millimeters) -> Self {
        let radius = diameter.0 / 2.0;
        SqMm(count as f64 * std::f64::consts::PI * radius * radius)
    }
}

// ============================================================================
// Arithmetic Implementations (macro to reduce boilerplate)
// ============================================================================

macro_rules! impl_arithmetic {
    ($type:ty) => {
        impl Add for $type {
            type Output = Self;
            fn add(self, rhs: Self) -> Self::Output {
                Self(self.0 + rhs.0)
            }
        }

        impl Sub for $type {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self::Output {
                Self(self.0 - rhs.0)
            }
        }

        impl Mul<f64> for $type {
            type Output = Self;
            fn mul(self, rhs: f64) -> Self::Output {
                Self(self.0 * rhs)
            }
        }

        impl Div<f64> for $type {
            type Output = Self;
            fn div(self, rhs: f64) -> Self::Output {
                Self(self.0 / rhs)
            }
        }

        impl $type {
            /// Get the raw f64 value
            pub fn value(self) -> f64 {
                self.0
            }
        }
    };
}

impl_arithmetic!(Newtons);
impl_arithmetic!(Kilonewtons);
impl_arithmetic!(NewtonMillimeters);
impl_arithmetic!(KilonewtonMeters);
impl_arithmetic!(Millimeters);
impl_arithmetic!(SqMm);
impl_arithmetic!(Megapascals);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kilonewtons_to_newtons() {
        let kn = Kilonewtons(1.5);
        let n: Newtons = kn.into();
        assert_eq!(n.0, 1500.0);
    }

    #[test]
    fn test_moment_conversion() {
        let m: KilonewtonMeters = NewtonMillimeters(3.0e6).into();
        assert_eq!(m.0, 3.0);
        let back: NewtonMillimeters = m.into();
        assert_eq!(back.0, 3.0e6);
    }

    #[test]
    fn test_bar_area() {
        // 3 bars of 20 mm: 3 * π * 100 = 942.48 mm²
        let area = SqMm::of_bars(3, Millimeters(20.0));
        assert!((area.0 - 942.48).abs() < 0.01);
        assert_eq!(SqMm::of_bars(0, Millimeters(25.0)).0, 0.0);
    }

    #[test]
    fn test_arithmetic() {
        let a = Kilonewtons(10.0);
        let b = Kilonewtons(4.0);
        assert_eq!((a + b).0, 14.0);
        assert_eq!((a - b).0, 6.0);
        assert_eq!((a * 2.0).value(), 20.0);
        assert_eq!((a / 2.0).value(), 5.0);
    }

    #[test]
    fn test_serialization() {
        let kn = Kilonewtons(12.5);
        let json = serde_json::to_string(&kn).unwrap();
        assert_eq!(json, "12.5");
        let roundtrip: Kilonewtons = serde_json::from_str(&json).unwrap();
        assert_eq!(kn, roundtrip);
    }
}
