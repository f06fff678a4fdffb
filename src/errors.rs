//! Core error types for the lot costing engine.
//!
//! This module defines storage-agnostic error types. Adapter-specific errors
//! (from whatever backs the snapshot repository) are converted to these types
//! by the adapter.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::fx::FxError;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the costing engine.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Invalid global parameter: {0}")]
    Parameter(#[from] ParameterError),

    #[error("Cost calculation failed: {0}")]
    Calculation(#[from] CalculatorError),

    #[error("Snapshot operation failed: {0}")]
    Snapshot(#[from] SnapshotError),

    #[error("Fx error: {0}")]
    Fx(#[from] FxError),

    #[error("Category '{0}' not found")]
    CategoryNotFound(String),

    #[error("Line '{0}' not found")]
    LineNotFound(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Validation errors for user input at the mutation boundary.
///
/// A rejected mutation leaves the sheet unchanged.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{field} cannot be negative, got {value}")]
    NegativeValue {
        field: &'static str,
        value: Decimal,
    },

    #[error("Required field '{0}' is missing")]
    MissingField(String),

    #[error("Failed to parse decimal number: {0}")]
    DecimalParse(#[from] rust_decimal::Error),
}

/// Rejected global-parameter updates.
#[derive(Error, Debug)]
pub enum ParameterError {
    #[error("Exchange rate must be positive, got {0}")]
    InvalidExchangeRate(Decimal),

    #[error("Margin percentage cannot be negative, got {0}")]
    InvalidMarginPercentage(Decimal),

    #[error("Tax rate cannot be negative, got {0}")]
    InvalidTaxRate(Decimal),
}

/// Errors that occur during subtotal and grand-total calculation.
///
/// These signal corrupt derived state, not a recoverable user condition; the
/// last known-good summary is retained when one surfaces.
#[derive(Error, Debug)]
pub enum CalculatorError {
    #[error("Line {line_id} carries a negative total {total}")]
    NegativeLineTotal { line_id: String, total: Decimal },

    #[error("Calculation failed: {0}")]
    Calculation(String),
}

/// Durability errors. These never touch the in-memory sheet.
#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("Failed to load snapshot: {0}")]
    LoadFailed(String),

    #[error("Failed to save snapshot: {0}")]
    SaveFailed(String),

    #[error("Unsupported snapshot schema version {found}, expected {expected}")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("Malformed snapshot: {0}")]
    Malformed(String),
}

// === From implementations for common error types ===

impl From<rust_decimal::Error> for Error {
    fn from(err: rust_decimal::Error) -> Self {
        Error::Validation(ValidationError::DecimalParse(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Snapshot(SnapshotError::Malformed(err.to_string()))
    }
}

impl From<Error> for String {
    fn from(err: Error) -> Self {
        err.to_string()
    }
}
