//! Error types for pagewise
//!
//! This module defines the error hierarchy for the whole crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.
//! A [`PaginateError`] additionally carries the partial page collected
//! before the failure.

use crate::types::PaginationResult;
use std::fmt;
use thiserror::Error;

/// The main error type for pagewise
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Pagination Errors
    // ============================================================================
    /// The per-call time budget elapsed before the page was filled.
    #[error("pagination: resource exhausted after {collected} of {requested} items")]
    ResourceExhausted { requested: usize, collected: usize },

    // ============================================================================
    // Capability Errors
    // ============================================================================
    #[error("Fetch failed: {message}")]
    Fetch { message: String },

    #[error("Processing failed: {message}")]
    Process { message: String },

    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Cursor / State Errors
    // ============================================================================
    #[error("Invalid cursor token: {message}")]
    Cursor { message: String },

    #[error("State error: {message}")]
    State { message: String },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl Error {
    /// Create a fetch error
    pub fn fetch(message: impl Into<String>) -> Self {
        Self::Fetch {
            message: message.into(),
        }
    }

    /// Create a processing error
    pub fn process(message: impl Into<String>) -> Self {
        Self::Process {
            message: message.into(),
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an invalid config value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a cursor token error
    pub fn cursor(message: impl Into<String>) -> Self {
        Self::Cursor {
            message: message.into(),
        }
    }

    /// Create a state error
    pub fn state(message: impl Into<String>) -> Self {
        Self::State {
            message: message.into(),
        }
    }

    /// Whether the time budget ran out.
    ///
    /// The partial result returned alongside is still valid; retrying is
    /// left to the caller.
    pub fn is_resource_exhausted(&self) -> bool {
        matches!(self, Self::ResourceExhausted { .. })
    }
}

/// Result type alias for pagewise
pub type Result<T> = std::result::Result<T, Error>;

/// A failed `paginate` call.
///
/// Holds the items collected before the failure. The engine cursor has
/// already been moved to the last of them, so `result` can be used as a
/// regular page.
pub struct PaginateError<K, V> {
    /// Partial page, never longer than the requested length
    pub result: PaginationResult<K, V>,
    /// Why accumulation stopped
    pub error: Error,
}

impl<K, V> PaginateError<K, V> {
    pub(crate) fn new(result: PaginationResult<K, V>, error: Error) -> Self {
        Self { result, error }
    }

    /// Split into the partial page and the cause
    pub fn into_parts(self) -> (PaginationResult<K, V>, Error) {
        (self.result, self.error)
    }

    /// Whether the time budget ran out
    pub fn is_resource_exhausted(&self) -> bool {
        self.error.is_resource_exhausted()
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for PaginateError<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaginateError")
            .field("result", &self.result)
            .field("error", &self.error)
            .finish()
    }
}

impl<K, V> fmt::Display for PaginateError<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} items returned)",
            self.error,
            self.result.items.len()
        )
    }
}

impl<K: fmt::Debug, V: fmt::Debug> std::error::Error for PaginateError<K, V> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}
