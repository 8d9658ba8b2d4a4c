//! Error types for the feature-engineering stage.
//!
//! The transform is fail-fast: a missing column, a column with the wrong
//! dtype or a value that cannot be cast to an integer stops the call and is
//! surfaced unmodified. The one permissive spot is the society-type grouping,
//! where unknown values become null instead of an error.
//!
//! ```
//! use credit_features::error::FeatureError;
//!
//! fn describe(err: &FeatureError) -> &'static str {
//!     match err {
//!         FeatureError::MissingColumn(_) => "input is missing a required column",
//!         FeatureError::InvalidType { .. } => "column has the wrong dtype",
//!         _ => "other failure",
//!     }
//! }
//! ```

use std::fmt;

/// Main error type for feature-engineering operations.
#[derive(Debug)]
pub enum FeatureError {
    /// A required column is absent from the input table.
    MissingColumn(String),

    /// A required column exists but its dtype cannot be used.
    InvalidType {
        column: String,
        expected: &'static str,
        found: String,
    },

    /// A value headed for an integer cast is null, NaN or infinite.
    NonFiniteValue { column: String, row: usize },

    /// A text column that must be populated holds a null.
    NullValue { column: String, row: usize },

    /// Polars failures while building or collecting frames.
    DataProcessing(String),
}

impl fmt::Display for FeatureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingColumn(name) => write!(f, "Missing required column: {name}"),
            Self::InvalidType {
                column,
                expected,
                found,
            } => write!(
                f,
                "Invalid type for column '{column}': expected {expected}, found {found}"
            ),
            Self::NonFiniteValue { column, row } => write!(
                f,
                "Cannot cast column '{column}' to integer: non-finite value at row {row}"
            ),
            Self::NullValue { column, row } => {
                write!(f, "Unexpected null in column '{column}' at row {row}")
            }
            Self::DataProcessing(msg) => write!(f, "Data processing error: {msg}"),
        }
    }
}

impl std::error::Error for FeatureError {}

impl From<polars::error::PolarsError> for FeatureError {
    fn from(err: polars::error::PolarsError) -> Self {
        Self::DataProcessing(err.to_string())
    }
}

/// Result type alias for feature-engineering operations.
pub type Result<T> = std::result::Result<T, FeatureError>;
