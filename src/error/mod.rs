//! Client Error Types
//!
//! Error hierarchy for the authenticated HTTP client.

use std::time::Duration;
use thiserror::Error;

/// Root error type for the client.
///
/// Errors are `Clone` so that a single refresh failure can be handed to every
/// request that was waiting on it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("Response error: {0}")]
    Response(#[from] ResponseError),
}

impl ApiError {
    /// Get error code for telemetry.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "CLIENT_CONFIG",
            Self::Network(_) => "CLIENT_NETWORK",
            Self::Protocol(_) => "CLIENT_PROTOCOL",
            Self::Auth(_) => "CLIENT_AUTH",
            Self::Response(_) => "CLIENT_RESPONSE",
        }
    }

    /// Check if the session is over and the user has to sign in again.
    pub fn needs_reauth(&self) -> bool {
        matches!(
            self,
            Self::Auth(AuthError::RefreshUnavailable)
                | Self::Auth(AuthError::RefreshFailed { .. })
        )
    }

    /// Check if the server rejected the request's credentials.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Auth(AuthError::Unauthorized { .. }))
    }

    /// HTTP status attached to the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Auth(AuthError::Unauthorized { .. }) => Some(401),
            Self::Auth(AuthError::Forbidden { .. }) => Some(403),
            Self::Auth(AuthError::RefreshFailed { status, .. }) => *status,
            Self::Response(ResponseError::Status { status, .. }) => Some(*status),
            _ => None,
        }
    }
}

/// Configuration error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid base URL: {url}")]
    InvalidBaseUrl { url: String },

    #[error("Invalid environment variable {name}: {value}")]
    InvalidEnvironment { name: String, value: String },
}

/// Network/transport error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    #[error("Connection failed: {message}")]
    ConnectionFailed { message: String },

    #[error("Request timeout after {timeout:?}")]
    Timeout { timeout: Duration },
}

/// Protocol/response parsing error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },

    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Unexpected redirect to: {location}")]
    UnexpectedRedirect { location: String },

    #[error("Response too large: {size} bytes")]
    ResponseTooLarge { size: usize },

    #[error("Invalid JSON: {message}")]
    InvalidJson { message: String },
}

/// Authentication and session error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    #[error("No refresh token available")]
    RefreshUnavailable,

    #[error("Token refresh failed: {message}")]
    RefreshFailed {
        status: Option<u16>,
        message: String,
    },

    #[error("Token refresh was abandoned before completing")]
    RefreshAbandoned,
}

/// Non-2xx response that is not an authentication failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResponseError {
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },
}

/// Result type for client operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// Error body returned by the API.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Parse error body from HTTP response text.
pub fn parse_error_body(body: &str) -> Option<ApiErrorBody> {
    serde_json::from_str(body).ok()
}

/// Create error from a non-2xx HTTP response.
pub fn create_error_from_response(status: u16, status_text: &str, body: &str) -> ApiError {
    let message = parse_error_body(body)
        .and_then(|b| b.message.or(b.error))
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| {
            if status_text.is_empty() {
                format!("HTTP {}", status)
            } else {
                status_text.to_string()
            }
        });

    match status {
        401 => ApiError::Auth(AuthError::Unauthorized { message }),
        403 => ApiError::Auth(AuthError::Forbidden { message }),
        _ => ApiError::Response(ResponseError::Status { status, message }),
    }
}

/// Get user-friendly error message.
pub fn get_user_message(error: &ApiError) -> String {
    match error {
        ApiError::Auth(AuthError::RefreshUnavailable)
        | ApiError::Auth(AuthError::RefreshFailed { .. }) => {
            "Your session has expired. Please sign in again.".to_string()
        }
        ApiError::Auth(AuthError::RefreshAbandoned) => {
            "The request was interrupted. Please try again.".to_string()
        }
        ApiError::Auth(AuthError::Unauthorized { .. }) => {
            "You are not signed in. Please sign in and try again.".to_string()
        }
        ApiError::Auth(AuthError::Forbidden { .. }) => {
            "You do not have permission to do that.".to_string()
        }
        ApiError::Network(NetworkError::Timeout { .. }) => {
            "The request timed out. Please check your connection and try again.".to_string()
        }
        ApiError::Network(_) => {
            "Could not reach the server. Please check your connection.".to_string()
        }
        _ => "Something went wrong. Please try again.".to_string(),
    }
}
