//! # Error Types
//!
//! Structured error types for costing_core. Every engine returns these as
//! explicit values so a form can keep rendering after a bad intermediate
//! input, show the previous valid result, and name the offending field.
//!
//! ## Example
//!
//! ```rust
//! use costing_core::errors::{CalcError, CalcResult};
//!
//! fn validate_quantity(quantity: f64) -> CalcResult<()> {
//!     if quantity < 0.0 {
//!         return Err(CalcError::InvalidInput {
//!             field: "quantity".to_string(),
//!             value: quantity.to_string(),
//!             reason: "Quantity cannot be negative".to_string(),
//!         });
//!     }
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for costing_core operations
pub type CalcResult<T> = Result<T, CalcError>;

/// Structured error type for calculation and persistence operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum CalcError {
    /// Unit symbol is not part of the active category's table
    #[error("Invalid unit '{unit}' for {category} conversion")]
    InvalidUnit { category: String, unit: String },

    /// A dimension required by the active shape is missing or out of range
    #[error("Invalid {shape} dimension '{field}': {value} - {reason}")]
    InvalidShapeDimension {
        shape: String,
        field: String,
        value: String,
        reason: String,
    },

    /// An input value is invalid (out of range, wrong type, etc.)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// A required field is missing
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    /// Material not found in the material library
    #[error("Material not found: {material_name}")]
    MaterialNotFound { material_name: String },

    /// No record with this id in the collection
    #[error("Record not found: {collection}/{id}")]
    RecordNotFound { collection: String, id: String },

    /// Calculation could not produce a result
    #[error("Calculation failed: {calculation_type} - {reason}")]
    CalculationFailed {
        calculation_type: String,
        reason: String,
    },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// File is locked by another user/process
    #[error("File locked: '{path}' is locked by {locked_by} since {locked_at}")]
    FileLocked {
        path: String,
        locked_by: String,
        locked_at: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Configuration file could not be read or parsed
    #[error("Configuration error: {reason}")]
    ConfigError { reason: String },

    /// Schema version mismatch
    #[error("Version mismatch: file version {file_version}, expected {expected_version}")]
    VersionMismatch {
        file_version: String,
        expected_version: String,
    },
}

impl CalcError {
    /// Create an InvalidUnit error
    pub fn invalid_unit(category: impl Into<String>, unit: impl Into<String>) -> Self {
        CalcError::InvalidUnit {
            category: category.into(),
            unit: unit.into(),
        }
    }

    /// Create an InvalidShapeDimension error
    pub fn invalid_dimension(
        shape: impl Into<String>,
        field: impl Into<String>,
        value: f64,
        reason: impl Into<String>,
    ) -> Self {
        CalcError::InvalidShapeDimension {
            shape: shape.into(),
            field: field.into(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// Create an InvalidInput error
    pub fn invalid_input(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        CalcError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a MissingField error
    pub fn missing_field(field: impl Into<String>) -> Self {
        CalcError::MissingField {
            field: field.into(),
        }
    }

    /// Create a MaterialNotFound error
    pub fn material_not_found(material_name: impl Into<String>) -> Self {
        CalcError::MaterialNotFound {
            material_name: material_name.into(),
        }
    }

    /// Create a RecordNotFound error
    pub fn record_not_found(collection: impl Into<String>, id: impl ToString) -> Self {
        CalcError::RecordNotFound {
            collection: collection.into(),
            id: id.to_string(),
        }
    }

    /// Create a CalculationFailed error
    pub fn calculation_failed(
        calculation_type: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        CalcError::CalculationFailed {
            calculation_type: calculation_type.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileError
    pub fn file_error(
        operation: impl Into<String>,
        path: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        CalcError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileLocked error
    pub fn file_locked(
        path: impl Into<String>,
        locked_by: impl Into<String>,
        locked_at: impl Into<String>,
    ) -> Self {
        CalcError::FileLocked {
            path: path.into(),
            locked_by: locked_by.into(),
            locked_at: locked_at.into(),
        }
    }

    /// Create a SerializationError from any displayable error
    pub fn serialization(reason: impl ToString) -> Self {
        CalcError::SerializationError {
            reason: reason.to_string(),
        }
    }

    /// Create a ConfigError
    pub fn config(reason: impl Into<String>) -> Self {
        CalcError::ConfigError {
            reason: reason.into(),
        }
    }

    /// Check if this is a recoverable error (e.g., can retry)
    pub fn is_recoverable(&self) -> bool {
        matches!(self, CalcError::FileLocked { .. })
    }

    /// Name of the input field that caused the error, if any.
    ///
    /// Forms use this to attach the validation message to the right widget.
    pub fn field(&self) -> Option<&str> {
        match self {
            CalcError::InvalidShapeDimension { field, .. }
            | CalcError::InvalidInput { field, .. }
            | CalcError::MissingField { field } => Some(field),
            CalcError::InvalidUnit { .. } => Some("unit"),
            CalcError::MaterialNotFound { .. } => Some("material_name"),
            _ => None,
        }
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CalcError::InvalidUnit { .. } => "INVALID_UNIT",
            CalcError::InvalidShapeDimension { .. } => "INVALID_SHAPE_DIMENSION",
            CalcError::InvalidInput { .. } => "INVALID_INPUT",
            CalcError::MissingField { .. } => "MISSING_FIELD",
            CalcError::MaterialNotFound { .. } => "MATERIAL_NOT_FOUND",
            CalcError::RecordNotFound { .. } => "RECORD_NOT_FOUND",
            CalcError::CalculationFailed { .. } => "CALCULATION_FAILED",
            CalcError::FileError { .. } => "FILE_ERROR",
            CalcError::FileLocked { .. } => "FILE_LOCKED",
            CalcError::SerializationError { .. } => "SERIALIZATION_ERROR",
            CalcError::ConfigError { .. } => "CONFIG_ERROR",
            CalcError::VersionMismatch { .. } => "VERSION_MISMATCH",
        }
    }
}
