//! # Error Types
//!
//! Structured error types for dcp_core. The cost engine itself is total and
//! never fails; these errors come from the edges of the library: strict
//! catalog lookups, catalog parsing, optional input validation, and scenario
//! limits. They are designed to be informative for both humans and programs.
//!
//! ## Example
//!
//! ```rust
//! use dcp_core::errors::{CalcError, CalcResult};
//!
//! fn validate_homes(num_homes: u32) -> CalcResult<()> {
//!     if num_homes == 0 {
//!         return Err(CalcError::invalid_input(
//!             "num_homes",
//!             num_homes.to_string(),
//!             "At least one home is required",
//!         ));
//!     }
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for dcp_core operations
pub type CalcResult<T> = Result<T, CalcError>;

/// Structured error type for estimation operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum CalcError {
    /// An input value is invalid (out of range, negative price, etc.)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// Printer not found in the catalog (strict lookup only)
    #[error("Printer not found: {name}")]
    PrinterNotFound { name: String },

    /// Material not found in the catalog (strict lookup only)
    #[error("Material not found: {name}")]
    MaterialNotFound { name: String },

    /// A catalog was constructed with no entries of one kind
    #[error("Catalog has no {kind} entries")]
    EmptyCatalog { kind: String },

    /// Catalog TOML could not be parsed
    #[error("Catalog parse error: {reason}")]
    CatalogParse { reason: String },

    /// Too many (or zero) scenarios passed to the comparator
    #[error("Scenario count {count} is outside 1..={max}")]
    TooManyScenarios { count: usize, max: usize },

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
}

impl CalcError {
    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a PrinterNotFound error
    pub fn printer_not_found(name: impl Into<String>) -> Self {
        CalcError::PrinterNotFound { name: name.into() }
    }

    /// Create a MaterialNotFound error
    pub fn material_not_found(name: impl Into<String>) -> Self {
        CalcError::MaterialNotFound { name: name.into() }
    }

    /// Create a FileError
    pub fn file_error(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CalcError::InvalidInput { .. } => "INVALID_INPUT",
            CalcError::PrinterNotFound { .. } => "PRINTER_NOT_FOUND",
            CalcError::MaterialNotFound { .. } => "MATERIAL_NOT_FOUND",
            CalcError::EmptyCatalog { .. } => "EMPTY_CATALOG",
            CalcError::CatalogParse { .. } => "CATALOG_PARSE",
            CalcError::TooManyScenarios { .. } => "SCENARIO_COUNT",
            CalcError::FileError { .. } => "FILE_ERROR",
            CalcError::SerializationError { .. } => "SERIALIZATION_ERROR",
        }
    }
}

impl From<serde_json::Error> for CalcError {
    fn from(e: serde_json::Error) -> Self {
        CalcError::SerializationError { reason: e.to_string() }
    }
}

impl From<toml::de::Error> for CalcError {
    fn from(e: toml::de::Error) -> Self {
        CalcError::CatalogParse { reason: e.to_string() }
    }
}
