//! Error types for the finance suite.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for every failure the calculators, the stores and the service bootstrap
//! can report.

use thiserror::Error;

/// The main error type for the finance suite.
///
/// Calculators, stores and configuration loading all return this error type,
/// so handlers can map every failure to an HTTP response in one place.
///
/// # Example
///
/// ```
/// use finance_suite::error::EngineError;
///
/// let error = EngineError::UnknownWageGroup {
///     code: "EG 99".to_string(),
/// };
/// assert_eq!(error.to_string(), "Unknown wage group: EG 99");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// Configuration parsed but its content is inconsistent.
    #[error("Invalid configuration '{key}': {message}")]
    InvalidConfig {
        /// The configuration key or environment variable at fault.
        key: String,
        /// What is wrong with it.
        message: String,
    },

    /// Wage group is not part of the tariff table.
    #[error("Unknown wage group: {code}")]
    UnknownWageGroup {
        /// The wage group that was requested.
        code: String,
    },

    /// Step is not defined for an otherwise known wage group.
    #[error("Step '{step}' is not defined for wage group {group}")]
    UnknownStep {
        /// The wage group.
        group: String,
        /// The step that was requested.
        step: String,
    },

    /// Federal state code has no church-tax rate.
    #[error("Unknown federal state: {code}")]
    UnknownFederalState {
        /// The state code that was requested.
        code: String,
    },

    /// Revision shift direction other than `undo` or `redo`.
    #[error("direction must be 'undo' or 'redo', got '{direction}'")]
    InvalidDirection {
        /// The direction that was requested.
        direction: String,
    },

    /// A request field failed validation.
    #[error("Invalid input field '{field}': {message}")]
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A description of what made the field invalid.
        message: String,
    },

    /// The relational store rejected an operation.
    #[error("Storage error: {0}")]
    Storage(#[from] sqlx::Error),

    /// A stored JSON payload could not be (de)serialized.
    #[error("Payload encoding error: {0}")]
    Payload(#[from] serde_json::Error),

    /// A schema migration failed to apply.
    #[error("Migration {version} failed: {message}")]
    Migration {
        /// The migration version that failed.
        version: u32,
        /// The underlying error.
        message: String,
    },

    /// The store could not be reached at startup.
    #[error("Storage unavailable after {attempts} attempts: {message}")]
    StorageUnavailable {
        /// How many connection attempts were made.
        attempts: u32,
        /// The last connection error.
        message: String,
    },

    /// The background task worker is no longer accepting work.
    #[error("Background task queue is closed")]
    TaskQueueClosed,

    /// The background task queue has no room left.
    #[error("Background task queue is full")]
    TaskQueueFull,
}

impl EngineError {
    /// Creates an [`EngineError::InvalidInput`] for the given field.
    pub fn invalid_input(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Returns true for errors caused by the caller's input.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Self::UnknownWageGroup { .. }
                | Self::UnknownStep { .. }
                | Self::UnknownFederalState { .. }
                | Self::InvalidDirection { .. }
                | Self::InvalidInput { .. }
        )
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
