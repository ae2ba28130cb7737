//! Fiber discretization of a section

use serde::{Deserialize, Serialize};

use crate::errors::{SectionError, SectionResult};
use crate::section::geometry::SectionGeometry;

/// Default number of concrete fibers
pub const DEFAULT_FIBER_COUNT: usize = 50;

/// Concrete fibers: evenly spaced heights spanning the section, with the
/// area each height represents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FiberMesh {
    heights: Vec<f64>,
    areas: Vec<f64>,
    spacing: f64,
}

impl FiberMesh {
    /// Discretize `geometry` into `fiber_count` fibers.
    ///
    /// Heights are `fiber_count` evenly spaced samples over `[min_y, max_y]`
    /// (both ends included). Each fiber's area is the interpolated full
    /// width at its height times the uniform spacing.
    pub fn discretize(geometry: &SectionGeometry, fiber_count: usize) -> SectionResult<Self> {
        if fiber_count < 2 {
            return Err(SectionError::invalid_input(
                "fiber_count",
                fiber_count.to_string(),
                "At least 2 fibers are required",
            ));
        }

        let min_y = geometry.min_y();
        let max_y = geometry.max_y();
        let spacing = (max_y - min_y) / (fiber_count - 1) as f64;

        let heights: Vec<f64> = (0..fiber_count)
            .map(|i| {
                if i == fiber_count - 1 {
                    max_y
                } else {
                    min_y + i as f64 * spacing
                }
            })
            .collect();

        let areas = heights
            .iter()
            .map(|&y| 2.0 * geometry.half_width_at(y) * spacing)
            .collect();

        Ok(FiberMesh {
            heights,
            areas,
            spacing,
        })
    }

    /// Fiber heights, strictly increasing
    pub fn heights(&self) -> &[f64] {
        &self.heights
    }

    /// Fiber areas, aligned with [`heights`](Self::heights)
    pub fn areas(&self) -> &[f64] {
        &self.areas
    }

    /// Iterate `(height, area)` pairs
    pub fn fibers(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.heights.iter().copied().zip(self.areas.iter().copied())
    }

    /// Uniform height increment between fibers
    pub fn spacing(&self) -> f64 {
        self.spacing
    }

    pub fn len(&self) -> usize {
        self.heights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heights.is_empty()
    }

    /// Sum of fiber areas
    pub fn total_area(&self) -> f64 {
        self.areas.iter().sum()
    }
}
