//! Centralized error handling for contingent.
//!
//! Every fallible operation in the library returns [`Result<T>`], whose error
//! side is [`ContingentError`]. The variants follow the failure taxonomy of
//! the analysis pipeline:
//!
//! - **Schema errors** ([`ContingentError::MissingColumn`]): a named column is
//!   absent. Surfaced immediately, never retried.
//! - **Empty-input errors** ([`ContingentError::EmptyInput`]): an empty dataset
//!   or an empty / zero-total contingency table.
//! - **Parameter errors** ([`ContingentError::InvalidParameter`]): e.g. a
//!   sliding window with `step == 0`.
//!
//! "Not applicable" outcomes (Fisher on a non-2×2 table, ANOVA with fewer
//! than two groups) are *not* errors; they are modelled with `Option` or a
//! dedicated sum type so callers have to branch on them.
//!
//! ```
//! use contingent::error::ContingentError;
//!
//! fn describe(err: &ContingentError) -> &'static str {
//!     match err {
//!         ContingentError::MissingColumn(_) => "schema",
//!         ContingentError::EmptyInput(_) => "empty input",
//!         ContingentError::Aborted => "cancelled",
//!         _ => "other",
//!     }
//! }
//!
//! assert_eq!(describe(&ContingentError::Aborted), "cancelled");
//! ```
//!
//! The `ResultExt` trait adds `.context()` to any `Result` whose error
//! converts into [`ContingentError`]:
//!
//! ```no_run
//! use contingent::error::ResultExt as _;
//!
//! fn read_settings() -> contingent::error::Result<String> {
//!     std::fs::read_to_string("settings.json").context("Failed to read settings")
//! }
//! ```

use std::fmt;

/// Main error type for contingent operations.
#[derive(Debug)]
pub enum ContingentError {
    /// I/O errors (reading input, writing exports)
    Io(std::io::Error),

    /// A referenced column does not exist in the dataset
    MissingColumn(String),

    /// Empty dataset, empty batch or empty / zero-total table
    EmptyInput(String),

    /// A caller-supplied parameter is out of range
    InvalidParameter(String),

    /// A column holds the wrong kind of values for the operation
    ColumnType(String),

    /// A statistical distribution could not be constructed
    Numeric(String),

    /// Loading or converting tabular input failed
    DataProcessing(String),

    /// Configuration errors
    Config(String),

    /// Run cancelled between batches
    Aborted,

    /// Generic error with context
    Other(String),
}

impl ContingentError {
    pub fn missing_column(name: &str) -> Self {
        Self::MissingColumn(name.to_owned())
    }

    /// True for errors caused by referencing an absent column.
    pub fn is_schema_error(&self) -> bool {
        matches!(self, Self::MissingColumn(_))
    }
}

impl fmt::Display for ContingentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::MissingColumn(name) => write!(f, "Column '{name}' not found in dataset"),
            Self::EmptyInput(msg) => write!(f, "Empty input: {msg}"),
            Self::InvalidParameter(msg) => write!(f, "Invalid parameter: {msg}"),
            Self::ColumnType(msg) => write!(f, "Column type error: {msg}"),
            Self::Numeric(msg) => write!(f, "Numeric error: {msg}"),
            Self::DataProcessing(msg) => write!(f, "Data processing error: {msg}"),
            Self::Config(msg) => write!(f, "Configuration error: {msg}"),
            Self::Aborted => write!(f, "Operation aborted by user"),
            Self::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for ContingentError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ContingentError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<anyhow::Error> for ContingentError {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}

impl From<serde_json::Error> for ContingentError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(format!("JSON error: {err}"))
    }
}

impl From<polars::error::PolarsError> for ContingentError {
    fn from(err: polars::error::PolarsError) -> Self {
        Self::DataProcessing(err.to_string())
    }
}

/// Result type alias for contingent operations.
pub type Result<T> = std::result::Result<T, ContingentError>;

/// Extension trait to add context to results.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, msg: impl Into<String>) -> Result<T>;

    /// Add context using a closure (lazy evaluation).
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<ContingentError>,
{
    fn context(self, msg: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let err: ContingentError = e.into();
            ContingentError::Other(format!("{}: {}", msg.into(), err))
        })
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let err: ContingentError = e.into();
            ContingentError::Other(format!("{}: {}", f(), err))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ContingentError::missing_column("Region");
        assert_eq!(err.to_string(), "Column 'Region' not found in dataset");
        assert!(err.is_schema_error());
    }

    #[test]
    fn test_empty_input_is_not_schema_error() {
        let err = ContingentError::EmptyInput("table has zero total".to_owned());
        assert!(!err.is_schema_error());
        assert_eq!(err.to_string(), "Empty input: table has zero total");
    }

    #[test]
    fn test_result_context() {
        let result: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "survey.csv",
        ));

        let result: Result<()> = result.context("Failed to read input");
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to read input")
        );
    }
}
