//! Error types for the LMNOP client.
//!
//! Every failure surfaced by the gateway, the resource clients, the session
//! store and configuration loading is an [`LmsError`]. Transport failures are
//! split into three kinds so callers can stop their own flow without
//! inspecting response shapes:
//!
//! - [`LmsError::NetworkUnavailable`]: no response was received.
//! - [`LmsError::ServerRejected`]: a response arrived with a non-2xx status.
//! - [`LmsError::AuthExpired`]: the backend answered 401; the session has
//!   already been cleared by the time the caller sees this.

use std::path::PathBuf;

/// A specialized `Result` type for LMNOP client operations.
pub type Result<T> = std::result::Result<T, LmsError>;

/// HTTP status the backend uses to reject a missing or expired credential.
pub const AUTH_REJECTED_STATUS: u16 = 401;

/// Errors that can occur while talking to the LMNOP backend.
#[derive(Debug, thiserror::Error)]
pub enum LmsError {
    // ========================================================================
    // Transport Errors
    // ========================================================================
    /// The request was sent but no response was received.
    #[error("No response from server: {message}")]
    NetworkUnavailable {
        /// Description of the transport failure.
        message: String,
    },

    /// The backend answered with a non-2xx status.
    #[error("Server rejected the request ({status}): {body}")]
    ServerRejected {
        /// HTTP status code.
        status: u16,
        /// Normalized error text from the response body.
        body: String,
    },

    /// The backend answered 401; the session was cleared.
    #[error("Session expired or credential rejected: {body}")]
    AuthExpired {
        /// Normalized error text from the response body.
        body: String,
    },

    /// A 2xx response whose body did not match the expected shape.
    #[error("Unexpected response body: {message}")]
    InvalidResponse {
        /// Description of the decoding failure.
        message: String,
    },

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Invalid JSON syntax in configuration file.
    #[error("Invalid JSON in config file '{path}': {message}\n\nSuggestion: Validate your lmnop.json with a JSON linter")]
    ConfigParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Description of the parse error.
        message: String,
    },

    /// Configuration validation failed.
    #[error("Invalid configuration: {message}\n\nSuggestion: {suggestion}")]
    ConfigValidationError {
        /// Description of the validation failure.
        message: String,
        /// Actionable suggestion for the user.
        suggestion: String,
    },

    // ========================================================================
    // Local Errors
    // ========================================================================
    /// The session could not be written to persistent storage.
    #[error("Failed to persist session to '{location}': {message}\n\nSuggestion: Check write permissions for the session file")]
    SessionStorage {
        /// Where the session lives (file path or backend name).
        location: String,
        /// Description of the write failure.
        message: String,
    },

    /// A course image could not be prepared for upload.
    #[error("Invalid image upload '{path}': {message}")]
    InvalidUpload {
        /// Path of the offending file.
        path: PathBuf,
        /// Why the file was refused.
        message: String,
    },

    /// General I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LmsError {
    /// Creates a new `NetworkUnavailable` error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::NetworkUnavailable {
            message: message.into(),
        }
    }

    /// Creates the error matching an HTTP rejection.
    ///
    /// Status 401 maps to [`LmsError::AuthExpired`]; anything else to
    /// [`LmsError::ServerRejected`].
    #[must_use]
    pub fn rejected(status: u16, body: impl Into<String>) -> Self {
        if status == AUTH_REJECTED_STATUS {
            Self::AuthExpired { body: body.into() }
        } else {
            Self::ServerRejected {
                status,
                body: body.into(),
            }
        }
    }

    /// Creates a new `InvalidResponse` error.
    #[must_use]
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }

    /// Creates a new `ConfigParseError` with the given path and message.
    #[must_use]
    pub fn config_parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ConfigParseError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new `ConfigValidationError` with the given message and suggestion.
    #[must_use]
    pub fn config_validation(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::ConfigValidationError {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Creates a new `SessionStorage` error.
    #[must_use]
    pub fn session_storage(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SessionStorage {
            location: location.into(),
            message: message.into(),
        }
    }

    /// Creates a new `InvalidUpload` error.
    #[must_use]
    pub fn invalid_upload(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::InvalidUpload {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Returns the HTTP status carried by a rejection, if any.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::ServerRejected { status, .. } => Some(*status),
            Self::AuthExpired { .. } => Some(AUTH_REJECTED_STATUS),
            _ => None,
        }
    }

    /// Returns the normalized response body of a rejection, if any.
    #[must_use]
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::ServerRejected { body, .. } | Self::AuthExpired { body } => Some(body),
            _ => None,
        }
    }

    /// Returns `true` if the backend rejected the credential.
    #[must_use]
    pub const fn is_auth_expired(&self) -> bool {
        matches!(self, Self::AuthExpired { .. })
    }

    /// Returns `true` if no response was received.
    #[must_use]
    pub const fn is_network(&self) -> bool {
        matches!(self, Self::NetworkUnavailable { .. })
    }
}
