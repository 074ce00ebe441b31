use serde::{Deserialize, Serialize};

use crate::forms::ValidationKind;

// ============= Auth Request/Response Types =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Body returned by both auth endpoints.
///
/// Login answers `{success, token}` or `{error}`; signup answers
/// `201 {token, success}` or `{error}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Error body shape shared by every backend route
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub error: String,
    #[serde(default)]
    pub details: Option<String>,
}

// ============= Error Types =============

/// Coarse error taxonomy surfaced to views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    ValidationEmpty,
    ValidationMalformed,
    ValidationTooShort,
    FormInvalid,
    Network,
    Unauthorized,
    ServerConflict,
    Unknown,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ValidationEmpty => "VALIDATION_EMPTY",
            ErrorKind::ValidationMalformed => "VALIDATION_MALFORMED",
            ErrorKind::ValidationTooShort => "VALIDATION_TOO_SHORT",
            ErrorKind::FormInvalid => "FORM_INVALID",
            ErrorKind::Network => "NETWORK",
            ErrorKind::Unauthorized => "UNAUTHORIZED",
            ErrorKind::ServerConflict => "SERVER_CONFLICT",
            ErrorKind::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<ValidationKind> for ErrorKind {
    fn from(kind: ValidationKind) -> Self {
        match kind {
            ValidationKind::Empty => ErrorKind::ValidationEmpty,
            ValidationKind::Malformed => ErrorKind::ValidationMalformed,
            ValidationKind::TooShort => ErrorKind::ValidationTooShort,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Validation failed for '{field}': {kind:?}")]
    Validation { field: String, kind: ValidationKind },

    #[error("Form is invalid: {}", .0.join(", "))]
    FormInvalid(Vec<String>),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Request failed with status {status}: {message}")]
    Server { status: u16, message: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Map into the taxonomy views branch on.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Validation { kind, .. } => (*kind).into(),
            AppError::FormInvalid(_) => ErrorKind::FormInvalid,
            AppError::Network(_) => ErrorKind::Network,
            AppError::Unauthorized(_) => ErrorKind::Unauthorized,
            AppError::Conflict(_) => ErrorKind::ServerConflict,
            AppError::Server { .. }
            | AppError::InvalidInput(_)
            | AppError::Config(_)
            | AppError::Internal(_) => ErrorKind::Unknown,
        }
    }

    /// Build an error from a non-success HTTP status and the backend's
    /// `error` text, if the body carried one.
    pub fn from_status(status: u16, backend_error: Option<String>) -> Self {
        let message =
            backend_error.unwrap_or_else(|| format!("Request failed with status {}", status));

        match status {
            401 | 403 => AppError::Unauthorized(message),
            409 => AppError::Conflict(message),
            _ if message.to_lowercase().contains("already exists") => AppError::Conflict(message),
            _ => AppError::Server { status, message },
        }
    }

    /// Same error kind with a user-facing message in place of the original.
    pub fn with_message(self, message: impl Into<String>) -> Self {
        let message = message.into();
        match self {
            AppError::Network(_) => AppError::Network(message),
            AppError::Unauthorized(_) => AppError::Unauthorized(message),
            AppError::Conflict(_) => AppError::Conflict(message),
            AppError::Server { status, .. } => AppError::Server { status, message },
            AppError::InvalidInput(_) => AppError::InvalidInput(message),
            AppError::Config(_) => AppError::Config(message),
            AppError::Internal(_) => AppError::Internal(message),
            other @ (AppError::Validation { .. } | AppError::FormInvalid(_)) => other,
        }
    }

    /// Text carried by the backend (or the transport) for this error.
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            AppError::Network(msg)
            | AppError::Unauthorized(msg)
            | AppError::Conflict(msg)
            | AppError::Server { message: msg, .. } => Some(msg),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return AppError::from_status(status.as_u16(), None);
        }
        if err.is_decode() {
            return AppError::Internal(format!("Failed to parse response: {}", err));
        }
        if err.is_builder() {
            return AppError::InvalidInput(format!("Failed to build request: {}", err));
        }
        AppError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(format!("JSON error: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
