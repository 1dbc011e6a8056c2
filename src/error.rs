//! Unified error type system for the pagepaste pipeline.
//!
//! This module provides a centralized error handling approach, replacing scattered
//! String-based error returns with a typed `AppError` enum.
//!
//! # Design Philosophy
//!
//! - **Typed errors**: Each error variant represents a specific failure scenario
//! - **Context preservation**: Errors carry relevant context for debugging
//! - **Easy conversion**: Automatic conversions from common error types (anyhow, io)
//! - **User-friendly**: String representations are suitable for displaying to users

use std::fmt;

/// Unified application error type.
///
/// This enum represents all possible error scenarios across the pipeline,
/// organized by domain (filesystem, clipboard, automation, config).
#[derive(Debug, Clone)]
pub enum AppError {
    /// Filesystem create/delete/read failures
    Io(String),

    /// An asset path that no longer exists at transfer time
    NotFound(String),

    /// A file that cannot be interpreted as an image
    Decode(String),

    /// A platform capability (clipboard, input synthesis) is absent
    Unsupported(String),

    /// Synthetic-paste delivery did not complete within its bound
    Timeout(String),

    /// Synthetic-paste delivery was attempted and reported failure
    Automation(String),

    /// Malformed user input (interval or page-range values)
    Validation(String),

    /// Configuration errors (loading, parsing, saving)
    Config(String),

    /// Generic/internal errors that don't fit other categories
    Internal(String),
}

impl AppError {
    /// Create an I/O error with a message.
    pub fn io(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    /// Create a not-found error with a message.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a decode error with a message.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Create an unsupported-capability error with a message.
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported(msg.into())
    }

    /// Create a timeout error with a message.
    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    /// Create an automation error with a message.
    pub fn automation(msg: impl Into<String>) -> Self {
        Self::Automation(msg.into())
    }

    /// Create a validation error with a message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a config error with a message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an internal error with a message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Get the error message as a string slice.
    pub fn message(&self) -> &str {
        match self {
            AppError::Io(msg) => msg,
            AppError::NotFound(msg) => msg,
            AppError::Decode(msg) => msg,
            AppError::Unsupported(msg) => msg,
            AppError::Timeout(msg) => msg,
            AppError::Automation(msg) => msg,
            AppError::Validation(msg) => msg,
            AppError::Config(msg) => msg,
            AppError::Internal(msg) => msg,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Io(msg) => write!(f, "I/O error: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::Decode(msg) => write!(f, "Decode error: {}", msg),
            AppError::Unsupported(msg) => write!(f, "Unsupported: {}", msg),
            AppError::Timeout(msg) => write!(f, "Timeout: {}", msg),
            AppError::Automation(msg) => write!(f, "Automation error: {}", msg),
            AppError::Validation(msg) => write!(f, "Validation error: {}", msg),
            AppError::Config(msg) => write!(f, "Config error: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

/// Convert from `anyhow::Error` to `AppError`.
///
/// This implementation preserves the error message and categorizes
/// anyhow errors as internal errors.
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

/// Convert from `std::io::Error` to `AppError`.
///
/// Missing-file errors map to `NotFound`, everything else to `Io`.
impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => AppError::not_found(err.to_string()),
            _ => AppError::io(err.to_string()),
        }
    }
}

/// Convert from `serde_json::Error` to `AppError`.
impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::config(format!("JSON error: {}", err))
    }
}

/// Convert from `image::ImageError` to `AppError`.
///
/// Any decode failure from the image crate maps to the Decode variant.
impl From<image::ImageError> for AppError {
    fn from(err: image::ImageError) -> Self {
        AppError::decode(err.to_string())
    }
}

/// Convert from `AppError` to `String` for display-facing callers.
impl From<AppError> for String {
    fn from(err: AppError) -> Self {
        err.to_string()
    }
}

/// Type alias for Result with AppError.
///
/// This simplifies function signatures throughout the pipeline.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = AppError::decode("not a PNG");
        assert!(matches!(err, AppError::Decode(_)));
        assert_eq!(err.message(), "not a PNG");
    }

    #[test]
    fn test_error_display() {
        let err = AppError::timeout("paste delivery exceeded 5s");
        let display = format!("{}", err);
        assert!(display.contains("Timeout"));
        assert!(display.contains("5s"));
    }

    #[test]
    fn test_from_anyhow() {
        let anyhow_err = anyhow::anyhow!("Something went wrong");
        let app_err: AppError = anyhow_err.into();
        assert!(matches!(app_err, AppError::Internal(_)));
    }

    #[test]
    fn test_from_io_not_found() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let app_err: AppError = io_err.into();
        assert!(matches!(app_err, AppError::NotFound(_)));
    }

    #[test]
    fn test_from_io_other() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let app_err: AppError = io_err.into();
        assert!(matches!(app_err, AppError::Io(_)));
    }

    #[test]
    fn test_into_string() {
        let err = AppError::validation("interval must be a number");
        let s: String = err.into();
        assert!(s.contains("Validation error"));
        assert!(s.contains("interval"));
    }
}
