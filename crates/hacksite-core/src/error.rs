//! Core error types for hacksite.
//!
//! [`ValidationError`] is the unit of a failed constraint: a human-readable
//! message plus a short machine code. [`SiteError`] is the crate-wide error
//! enum used by configuration loading, the error logger and the error
//! boundary.

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

/// A single failed validation constraint.
///
/// # Examples
///
/// ```
/// use hacksite_core::error::ValidationError;
///
/// let err = ValidationError::new("Name must be at least 2 characters", "min_length")
///     .with_param("min", "2");
/// assert_eq!(err.code, "min_length");
/// assert_eq!(err.to_string(), "Name must be at least 2 characters");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The message shown next to the field.
    pub message: String,
    /// A short code identifying the failed constraint (e.g. "required", "invalid_type").
    pub code: String,
    /// Additional parameters describing the constraint.
    pub params: BTreeMap<String, String>,
}

impl ValidationError {
    /// Creates a new `ValidationError` with a message and code.
    pub fn new(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
            params: BTreeMap::new(),
        }
    }

    /// Adds a parameter to this validation error.
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ValidationError {}

/// The primary error type for hacksite.
#[derive(Error, Debug)]
pub enum SiteError {
    /// A value failed validation.
    #[error("Validation error: {0}")]
    Validation(ValidationError),

    /// A form submission handler failed.
    #[error("Submission failed: {0}")]
    Submission(String),

    /// A component failed while rendering.
    #[error("Render error: {0}")]
    Render(String),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// An error occurred during serialization or deserialization.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// An I/O error occurred.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SiteError {
    /// Returns a stable short code for this error, used in error reports.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Submission(_) => "submission",
            Self::Render(_) => "render",
            Self::Configuration(_) => "configuration",
            Self::Serialization(_) => "serialization",
            Self::Io(_) => "io",
        }
    }
}

impl From<ValidationError> for SiteError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err)
    }
}

impl From<serde_json::Error> for SiteError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// A convenience type alias for `Result<T, SiteError>`.
pub type SiteResult<T> = Result<T, SiteError>;
