//! Error types for the three OAuth services.
//!
//! Uses `thiserror` for structured error handling with automatic `From` implementations.
//! [`ServiceError`] is the HTTP-facing taxonomy; everything else converts into it.

use std::time::Duration;

use axum::extract::rejection::FormRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Errors from outbound HTTP calls (introspection, token exchange, resource fetch).
#[derive(thiserror::Error, Debug)]
pub enum UpstreamError {
    /// HTTP transport error (connection, DNS, TLS, etc.)
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        /// Endpoint that was called
        endpoint: String,
        /// Underlying transport error
        #[source]
        source: reqwest::Error,
    },

    /// Request timeout
    #[error("Request to {endpoint} timed out after {timeout:?}")]
    Timeout {
        /// Endpoint that was called
        endpoint: String,
        /// Configured timeout
        timeout: Duration,
    },

    /// Unexpected HTTP status from the peer
    #[error("Unexpected status {status} from {endpoint}")]
    UnexpectedStatus {
        /// Endpoint that was called
        endpoint: String,
        /// HTTP status code
        status: u16,
    },

    /// Response body could not be decoded
    #[error("Failed to decode response from {endpoint}: {message}")]
    Decode {
        /// Endpoint that was called
        endpoint: String,
        /// Decoder message
        message: String,
    },

    /// Endpoint URL could not be built
    #[error("Invalid upstream URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl UpstreamError {
    /// Classify a reqwest error, separating timeouts from other transport failures.
    #[must_use]
    pub fn from_reqwest(endpoint: impl Into<String>, err: reqwest::Error, timeout: Duration) -> Self {
        let endpoint = endpoint.into();
        if err.is_timeout() {
            Self::Timeout { endpoint, timeout }
        } else if err.is_decode() {
            Self::Decode { endpoint, message: err.to_string() }
        } else {
            Self::Http { endpoint, source: err }
        }
    }

    /// Create an unexpected status error.
    #[must_use]
    pub fn unexpected_status(endpoint: impl Into<String>, status: u16) -> Self {
        Self::UnexpectedStatus { endpoint: endpoint.into(), status }
    }

    /// Remote status code, if the peer answered at all.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::UnexpectedStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Errors from parsing `Authorization` header credentials.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum CredentialsError {
    /// Header value is not `<scheme> <payload>`
    #[error("Authorization header must be of the form '{scheme} <credentials>'")]
    Malformed {
        /// Expected scheme
        scheme: &'static str,
    },

    /// Payload is not valid base64
    #[error("Authorization payload is not valid base64")]
    Encoding,

    /// Decoded payload is not `client_id:client_secret`
    #[error("Credentials must be of the form client_id:client_secret")]
    Shape,
}

/// Illegal protocol phase transition.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("Cannot move flow from {from} to {to}")]
pub struct FlowError {
    /// Phase the flow was in
    pub from: &'static str,
    /// Phase that was requested
    pub to: &'static str,
}

/// HTTP-facing error taxonomy shared by all services.
#[derive(thiserror::Error, Debug)]
pub enum ServiceError {
    /// Malformed input (unparseable URL, missing field)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Authentication failure (bad password, bad client secret, unknown/expired/reused code)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authorization failure (valid principal, insufficient grant)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Unknown resource
    #[error("Not found: {0}")]
    NotFound(String),

    /// Introspection, token exchange or resource call failed
    #[error("Upstream error: {0}")]
    Upstream(#[from] UpstreamError),

    /// Internal logic error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Create a bad request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    /// Create an unauthorized error.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    /// Create a forbidden error.
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    /// Create a not found error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// HTTP status this error maps to.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Upstream(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<CredentialsError> for ServiceError {
    fn from(err: CredentialsError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl From<FlowError> for ServiceError {
    fn from(err: FlowError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<FormRejection> for ServiceError {
    fn from(err: FormRejection) -> Self {
        Self::BadRequest(format!("form body: {}", err.body_text()))
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match &self {
            Self::Upstream(err) => {
                tracing::error!(error = %err, remote_status = ?err.status(), "Upstream call failed");
            }
            Self::Internal(_) => tracing::error!(error = %self, "Request failed"),
            _ => tracing::info!(status = status.as_u16(), reason = %self, "Request rejected"),
        }

        // Details stay in the log; the body only carries the reason phrase.
        let body = status.canonical_reason().unwrap_or("Error");
        (status, body).into_response()
    }
}

/// Result type alias for outbound calls.
pub type UpstreamResult<T> = Result<T, UpstreamError>;

/// Result type alias for handlers.
pub type ServiceResult<T> = Result<T, ServiceError>;
