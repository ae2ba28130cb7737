//! Symmetric section contours
//!
//! A section is described by its half-width as a function of height. The
//! height axis runs through the centroid of a symmetric section, so the
//! contour must span `[-h/2, h/2]`.

use serde::{Deserialize, Serialize};

use crate::errors::{SectionError, SectionResult};

/// Allowed mismatch between `-min_y` and `max_y` (mm)
pub const SYMMETRY_TOLERANCE: f64 = 1e-3;

/// One contour vertex: half-width of the section at height `y`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContourPoint {
    /// Height coordinate (mm), positive up
    pub y: f64,
    /// Half-width at this height (mm)
    pub half_width: f64,
}

impl ContourPoint {
    pub fn new(y: f64, half_width: f64) -> Self {
        ContourPoint { y, half_width }
    }
}

impl From<(f64, f64)> for ContourPoint {
    fn from((y, half_width): (f64, f64)) -> Self {
        ContourPoint { y, half_width }
    }
}

/// Validated symmetric contour, sorted by increasing height.
///
/// Deserialization goes through the same validation as
/// [`SectionGeometry::from_contour`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ContourPoint>", into = "Vec<ContourPoint>")]
pub struct SectionGeometry {
    points: Vec<ContourPoint>,
}

impl SectionGeometry {
    /// Build a geometry from contour points in any order.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` for fewer than 2 points, non-finite values or zero height
    /// - `NegativeHalfWidth` for any half-width below zero
    /// - `NonSymmetricContour` when `|min_y + max_y| > 1e-3`
    pub fn from_contour<P: Into<ContourPoint>>(points: impl IntoIterator<Item = P>) -> SectionResult<Self> {
        let mut points: Vec<ContourPoint> = points.into_iter().map(Into::into).collect();

        if points.len() < 2 {
            return Err(SectionError::invalid_input(
                "contour_points",
                points.len().to_string(),
                "A contour needs at least 2 points",
            ));
        }
        if let Some(p) = points.iter().find(|p| !p.y.is_finite() || !p.half_width.is_finite()) {
            return Err(SectionError::invalid_input(
                "contour_points",
                format!("({}, {})", p.y, p.half_width),
                "Contour coordinates must be finite",
            ));
        }
        if let Some(p) = points.iter().find(|p| p.half_width < 0.0) {
            return Err(SectionError::NegativeHalfWidth {
                y: p.y,
                half_width: p.half_width,
            });
        }

        points.sort_by(|a, b| a.y.total_cmp(&b.y));

        let min_y = points[0].y;
        let max_y = points[points.len() - 1].y;
        if (min_y + max_y).abs() > SYMMETRY_TOLERANCE {
            return Err(SectionError::NonSymmetricContour { min_y, max_y });
        }
        if max_y - min_y <= 0.0 {
            return Err(SectionError::invalid_input(
                "contour_points",
                format!("height {}", max_y - min_y),
                "Section height must be positive",
            ));
        }
        if points.iter().all(|p| p.half_width == 0.0) {
            return Err(SectionError::invalid_input(
                "contour_points",
                "all half-widths are 0",
                "Section must have a positive area",
            ));
        }

        Ok(SectionGeometry { points })
    }

    /// Rectangular shorthand: expands to `[(-h/2, b/2), (h/2, b/2)]`.
    pub fn rectangular(width: f64, height: f64) -> SectionResult<Self> {
        if !(width.is_finite() && width > 0.0) {
            return Err(SectionError::invalid_input("width", width.to_string(), "Width must be positive"));
        }
        if !(height.is_finite() && height > 0.0) {
            return Err(SectionError::invalid_input("height", height.to_string(), "Height must be positive"));
        }
        SectionGeometry::from_contour([
            ContourPoint::new(-height / 2.0, width / 2.0),
            ContourPoint::new(height / 2.0, width / 2.0),
        ])
    }

    /// Contour points sorted by height
    pub fn points(&self) -> &[ContourPoint] {
        &self.points
    }

    /// Lowest height coordinate (bottom extreme)
    pub fn min_y(&self) -> f64 {
        self.points[0].y
    }

    /// Highest height coordinate (top extreme)
    pub fn max_y(&self) -> f64 {
        self.points[self.points.len() - 1].y
    }

    /// Overall section height
    pub fn height(&self) -> f64 {
        self.max_y() - self.min_y()
    }

    /// Half-width at height `y`, linearly interpolated and held flat outside
    /// the contour's range.
    pub fn half_width_at(&self, y: f64) -> f64 {
        let first = self.points[0];
        let last = self.points[self.points.len() - 1];
        if y <= first.y {
            return first.half_width;
        }
        if y >= last.y {
            return last.half_width;
        }

        // first index strictly above y; hi.y > y >= lo.y so the span is never zero
        let idx = self.points.partition_point(|p| p.y <= y);
        let lo = self.points[idx - 1];
        let hi = self.points[idx];
        let t = (y - lo.y) / (hi.y - lo.y);
        lo.half_width + t * (hi.half_width - lo.half_width)
    }

    /// Exact area of the piecewise-linear contour (trapezoidal rule on the
    /// full width).
    pub fn area(&self) -> f64 {
        self.points
            .windows(2)
            .map(|w| (w[1].y - w[0].y) * (w[0].half_width + w[1].half_width))
            .sum()
    }
}

impl TryFrom<Vec<ContourPoint>> for SectionGeometry {
    type Error = SectionError;

    fn try_from(points: Vec<ContourPoint>) -> Result<Self, Self::Error> {
        SectionGeometry::from_contour(points)
    }
}

impl From<SectionGeometry> for Vec<ContourPoint> {
    fn from(geometry: SectionGeometry) -> Self {
        geometry.points
    }
}

/// Either an explicit contour or the rectangle shorthand.
///
/// ## JSON Example
///
/// ```json
/// { "rectangle": { "width": 300.0, "height": 500.0 } }
/// { "contour": [ { "y": -250.0, "half_width": 150.0 }, { "y": 250.0, "half_width": 150.0 } ] }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionShape {
    Rectangle { width: f64, height: f64 },
    Contour(Vec<ContourPoint>),
}

impl SectionShape {
    /// Validate and expand into a [`SectionGeometry`]
    pub fn to_geometry(&self) -> SectionResult<SectionGeometry> {
        match self {
            SectionShape::Rectangle { width, height } => SectionGeometry::rectangular(*width, *height),
            SectionShape::Contour(points) => SectionGeometry::from_contour(points.iter().copied()),
        }
    }
}
