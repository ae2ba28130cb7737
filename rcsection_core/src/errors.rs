//! # Error Types
//!
//! Structured error types for rcsection_core. Configuration problems are
//! reported before any fiber mesh is built, so a caller can always tell a bad
//! input apart from a numerical outcome of the analysis.
//!
//! ## Example
//!
//! ```rust
//! use rcsection_core::errors::{SectionError, SectionResult};
//!
//! fn validate_cover(cover_mm: f64) -> SectionResult<()> {
//!     if cover_mm < 0.0 {
//!         return Err(SectionError::invalid_input(
//!             "cover",
//!             cover_mm.to_string(),
//!             "Cover must not be negative",
//!         ));
//!     }
//!     Ok(())
//! }
//!
//! assert!(validate_cover(-5.0).unwrap_err().is_configuration_error());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for rcsection_core operations
pub type SectionResult<T> = Result<T, SectionError>;

/// Structured error type for section configuration, analysis and file I/O.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum SectionError {
    /// An input value is invalid (out of range, non-finite, etc.)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// A required field is missing
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    /// Unknown concrete or steel grade
    #[error("Material not found: {material_name}")]
    MaterialNotFound { material_name: String },

    /// Contour extremes are not mirror images about height 0
    #[error("Contour must be symmetric about y = 0: min y = {min_y}, max y = {max_y}")]
    NonSymmetricContour { min_y: f64, max_y: f64 },

    /// A contour point has a negative half-width
    #[error("Contour half-width must not be negative: {half_width} at y = {y}")]
    NegativeHalfWidth { y: f64, half_width: f64 },

    /// Axial equilibrium could not be established at a curvature
    #[error("No axial equilibrium at curvature {curvature:e}: {reason}")]
    NonConvergence { curvature: f64, reason: String },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Configuration schema version mismatch
    #[error("Version mismatch: file version {file_version}, expected {expected_version}")]
    VersionMismatch {
        file_version: String,
        expected_version: String,
    },
}

impl SectionError {
    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        SectionError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a MissingField error
    pub fn missing_field(field: impl Into<String>) -> Self {
        SectionError::MissingField {
            field: field.into(),
        }
    }

    /// Create a MaterialNotFound error
    pub fn material_not_found(material_name: impl Into<String>) -> Self {
        SectionError::MaterialNotFound {
            material_name: material_name.into(),
        }
    }

    /// Create a NonConvergence error
    pub fn non_convergence(curvature: f64, reason: impl Into<String>) -> Self {
        SectionError::NonConvergence {
            curvature,
            reason: reason.into(),
        }
    }

    /// Create a FileError
    pub fn file_error(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        SectionError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a SerializationError
    pub fn serialization(reason: impl Into<String>) -> Self {
        SectionError::SerializationError {
            reason: reason.into(),
        }
    }

    /// True for errors raised while building a section configuration.
    ///
    /// These abort an analysis before any computation and are never retried.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            SectionError::InvalidInput { .. }
                | SectionError::MissingField { .. }
                | SectionError::MaterialNotFound { .. }
                | SectionError::NonSymmetricContour { .. }
                | SectionError::NegativeHalfWidth { .. }
        )
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            SectionError::InvalidInput { .. } => "INVALID_INPUT",
            SectionError::MissingField { .. } => "MISSING_FIELD",
            SectionError::MaterialNotFound { .. } => "MATERIAL_NOT_FOUND",
            SectionError::NonSymmetricContour { .. } => "NON_SYMMETRIC_CONTOUR",
            SectionError::NegativeHalfWidth { .. } => "NEGATIVE_HALF_WIDTH",
            SectionError::NonConvergence { .. } => "NON_CONVERGENCE",
            SectionError::FileError { .. } => "FILE_ERROR",
            SectionError::SerializationError { .. } => "SERIALIZATION_ERROR",
            SectionError::VersionMismatch { .. } => "VERSION_MISMATCH",
        }
    }
}

impl From<serde_json::Error> for SectionError {
    fn from(e: serde_json::Error) -> Self {
        SectionError::serialization(e.to_string())
    }
}
