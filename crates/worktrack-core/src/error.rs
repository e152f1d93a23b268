//! Core error types for the worktrack backend.
//!
//! This module provides the [`WorktrackError`] enum covering HTTP errors,
//! persistence errors, validation errors, and configuration errors, plus the
//! structured [`ValidationError`] surfaced by model-level validation when a
//! record is rejected on save.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// A validation failure with optional per-field error messages.
///
/// Model validation collects everything that is wrong with a record into a
/// single `ValidationError` so that forms can be re-rendered with field-level
/// messages attached.
///
/// # Examples
///
/// ```
/// use worktrack_core::error::ValidationError;
///
/// let mut err = ValidationError::new("record invalid", "invalid");
/// err.add("name", "must not be blank");
/// assert_eq!(err.on("name"), &["must not be blank".to_string()]);
/// ```
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationError {
    /// The primary error message.
    pub message: String,
    /// A short code identifying the failure (e.g. "blank", "too_long").
    pub code: String,
    /// Per-field error messages, keyed by attribute name.
    pub field_errors: HashMap<String, Vec<String>>,
}

impl ValidationError {
    /// Creates a new `ValidationError` with a message and code.
    pub fn new(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
            field_errors: HashMap::new(),
        }
    }

    /// Adds an error message for a field.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.field_errors
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    /// Returns the error messages recorded for a field.
    pub fn on(&self, field: &str) -> &[String] {
        self.field_errors.get(field).map_or(&[], Vec::as_slice)
    }

    /// Returns `true` if no errors have been recorded at all.
    pub fn is_empty(&self) -> bool {
        self.message.is_empty() && self.field_errors.is_empty()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.message.is_empty() {
            write!(f, "{}", self.message)?;
        }
        let mut first = self.message.is_empty();
        for (field, errors) in &self.field_errors {
            for error in errors {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{field}: {error}")?;
                first = false;
            }
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// The primary error type for the worktrack backend.
///
/// Each variant maps to an HTTP status code via [`WorktrackError::status_code`].
#[derive(Error, Debug)]
pub enum WorktrackError {
    /// HTTP 400 Bad Request.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// HTTP 403 Forbidden.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// HTTP 404 Not Found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// One or more attributes failed validation.
    #[error("Validation failed: {0}")]
    Validation(ValidationError),

    /// A referential-integrity constraint blocked the operation.
    #[error("Integrity error: {0}")]
    Integrity(String),

    /// A generic persistence-layer failure.
    #[error("Database error: {0}")]
    Database(String),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// An I/O error occurred.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WorktrackError {
    /// Returns the HTTP status code associated with this error.
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::BadRequest(_) | Self::Validation(_) => 400,
            Self::PermissionDenied(_) => 403,
            Self::NotFound(_) => 404,
            Self::Integrity(_) => 409,
            Self::Database(_) | Self::Configuration(_) | Self::Io(_) => 500,
        }
    }
}

impl From<ValidationError> for WorktrackError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err)
    }
}

/// A convenience type alias for `Result<T, WorktrackError>`.
pub type WorktrackResult<T> = Result<T, WorktrackError>;
