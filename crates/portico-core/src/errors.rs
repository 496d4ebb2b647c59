//! Unified error system for Portico
//!
//! Every failure surfaced by the kernel is a [`PorticoError`]. The codec and
//! permission resolver raise `Validation`/`Forbidden` synchronously; the HTTP
//! layer is the only place remote failures are translated into this taxonomy.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Error Kinds
// ============================================================================

/// Fieldless classification of a [`PorticoError`].
///
/// View code switches on the kind to pick a UI state without caring about the
/// message or status that came with the error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// The requested entity does not exist
    NotFound,
    /// No credential, or the remote rejected it
    Unauthorized,
    /// Credential accepted but the caller lacks permission
    Forbidden,
    /// Malformed input (bad token, mismatched filter, rejected body)
    Validation,
    /// The remote failed or answered with something unusable
    ServerError,
    /// No response was received
    NetworkError,
}

/// Status-to-kind table. Ranges are inclusive and checked in order.
const STATUS_TABLE: &[(u16, u16, ErrorKind)] = &[
    (400, 400, ErrorKind::Validation),
    (401, 401, ErrorKind::Unauthorized),
    (403, 403, ErrorKind::Forbidden),
    (404, 404, ErrorKind::NotFound),
    (422, 422, ErrorKind::Validation),
    (500, 599, ErrorKind::ServerError),
];

impl ErrorKind {
    /// Classify a non-success HTTP status.
    ///
    /// The mapping is total: any status not listed in the table is treated as
    /// a server error.
    pub fn from_status(status: u16) -> Self {
        STATUS_TABLE
            .iter()
            .find(|(lo, hi, _)| (*lo..=*hi).contains(&status))
            .map(|(_, _, kind)| *kind)
            .unwrap_or(ErrorKind::ServerError)
    }

    /// Whether a retry from the calling layer may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ServerError | Self::NetworkError)
    }

    /// Whether the caller should send the user back through authentication.
    #[must_use]
    pub fn requires_reauthentication(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    /// Whether the caller should render a permission-denied state.
    #[must_use]
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, Self::Forbidden)
    }

    /// Whether the caller should render a not-found state.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }

    /// Short label for logging/display.
    pub fn label(&self) -> &'static str {
        match self {
            Self::NotFound => "Not Found",
            Self::Unauthorized => "Unauthorized",
            Self::Forbidden => "Forbidden",
            Self::Validation => "Validation",
            Self::ServerError => "Server Error",
            Self::NetworkError => "Network",
        }
    }

    /// Hint for the user on how to resolve this kind of error.
    pub fn resolution_hint(&self) -> &'static str {
        match self {
            Self::NotFound => "The requested resource could not be found",
            Self::Unauthorized => "Your session has ended, please sign in again",
            Self::Forbidden => "This action requires additional permissions",
            Self::Validation => "Check your input and try again",
            Self::ServerError => "The server could not complete the request, try again later",
            Self::NetworkError => "Check your network connection and retry",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ============================================================================
// Field Errors
// ============================================================================

/// A single field-level validation message reported by the remote.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Name of the offending field
    pub field: String,
    /// Message for that field
    pub message: String,
}

impl FieldError {
    /// Create a field error
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

// ============================================================================
// PorticoError
// ============================================================================

/// Unified error type for all Portico operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
pub enum PorticoError {
    /// Resource not found
    #[error("Not found: {message}")]
    NotFound {
        /// HTTP status, when the error came from a response
        status: Option<u16>,
        /// Error message describing what was not found
        message: String,
    },

    /// Missing or rejected credential
    #[error("Unauthorized: {message}")]
    Unauthorized {
        /// HTTP status, when the error came from a response
        status: Option<u16>,
        /// Error message describing the credential problem
        message: String,
    },

    /// Permission denied
    #[error("Forbidden: {message}")]
    Forbidden {
        /// HTTP status, when the error came from a response
        status: Option<u16>,
        /// Error message describing the permission issue
        message: String,
    },

    /// Invalid input
    #[error("Validation failed: {message}")]
    Validation {
        /// HTTP status, when the error came from a response
        status: Option<u16>,
        /// Error message describing the invalid input
        message: String,
        /// Field-level messages, possibly empty
        fields: Vec<FieldError>,
    },

    /// Remote failure
    #[error("Server error: {message}")]
    ServerError {
        /// HTTP status, when the error came from a response
        status: Option<u16>,
        /// Error message describing the failure
        message: String,
    },

    /// No response received
    #[error("Network error: {message}")]
    Network {
        /// Error message describing the transport failure
        message: String,
    },
}

impl PorticoError {
    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            status: None,
            message: message.into(),
        }
    }

    /// Create an unauthorized error
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            status: None,
            message: message.into(),
        }
    }

    /// Create a forbidden error
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            status: None,
            message: message.into(),
        }
    }

    /// Create a validation error with no field detail
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            status: None,
            message: message.into(),
            fields: Vec::new(),
        }
    }

    /// Create a server error
    pub fn server(message: impl Into<String>) -> Self {
        Self::ServerError {
            status: None,
            message: message.into(),
        }
    }

    /// Create a network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Build the error for a non-success HTTP response.
    pub fn from_status(status: u16, message: impl Into<String>, fields: Vec<FieldError>) -> Self {
        let status_field = Some(status);
        let message = message.into();
        match ErrorKind::from_status(status) {
            ErrorKind::NotFound => Self::NotFound {
                status: status_field,
                message,
            },
            ErrorKind::Unauthorized => Self::Unauthorized {
                status: status_field,
                message,
            },
            ErrorKind::Forbidden => Self::Forbidden {
                status: status_field,
                message,
            },
            ErrorKind::Validation => Self::Validation {
                status: status_field,
                message,
                fields,
            },
            // from_status never yields NetworkError; a status means a response arrived
            ErrorKind::ServerError | ErrorKind::NetworkError => Self::ServerError {
                status: status_field,
                message,
            },
        }
    }

    /// Classification of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Unauthorized { .. } => ErrorKind::Unauthorized,
            Self::Forbidden { .. } => ErrorKind::Forbidden,
            Self::Validation { .. } => ErrorKind::Validation,
            Self::ServerError { .. } => ErrorKind::ServerError,
            Self::Network { .. } => ErrorKind::NetworkError,
        }
    }

    /// HTTP status that produced this error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::NotFound { status, .. }
            | Self::Unauthorized { status, .. }
            | Self::Forbidden { status, .. }
            | Self::Validation { status, .. }
            | Self::ServerError { status, .. } => *status,
            Self::Network { .. } => None,
        }
    }

    /// Bare message without the kind prefix
    pub fn message(&self) -> &str {
        match self {
            Self::NotFound { message, .. }
            | Self::Unauthorized { message, .. }
            | Self::Forbidden { message, .. }
            | Self::Validation { message, .. }
            | Self::ServerError { message, .. }
            | Self::Network { message } => message,
        }
    }

    /// Field-level messages; empty for every kind except `Validation`
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            Self::Validation { fields, .. } => fields,
            _ => &[],
        }
    }
}

/// Standard Result type for Portico operations
pub type Result<T> = std::result::Result<T, PorticoError>;

impl From<serde_json::Error> for PorticoError {
    fn from(err: serde_json::Error) -> Self {
        Self::validation(format!("JSON serialization failed: {err}"))
    }
}

impl From<base64::DecodeError> for PorticoError {
    fn from(err: base64::DecodeError) -> Self {
        Self::validation(format!("Malformed token: {err}"))
    }
}
