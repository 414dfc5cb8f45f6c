//! Error types for the API gateway.

use thiserror::Error;

/// Errors that can occur while talking to the catalog service.
///
/// Transport failures are kept distinct from server-returned rejections so
/// the session layer can classify them separately: an unreachable service is
/// not the same event as a rejected password.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Existing variants will not be removed in minor versions
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// The service base URL could not be parsed or joined.
    #[error("Invalid base URL: {reason}")]
    InvalidBaseUrl {
        /// Why the URL was rejected
        reason: String,
    },

    /// The HTTP client could not be constructed.
    #[error("HTTP client initialization failed: {reason}")]
    Initialization {
        /// The underlying builder error
        reason: String,
    },

    /// A request payload could not be assembled.
    #[error("Invalid request payload: {reason}")]
    InvalidPayload {
        /// Why the payload was rejected locally
        reason: String,
    },

    /// The service could not be reached at all.
    #[error("Request to {endpoint} failed: {reason}")]
    ConnectionFailed {
        /// Endpoint the request was addressed to
        endpoint: String,
        /// The underlying transport error
        reason: String,
    },

    /// The server rejected the credentials or session (HTTP 401).
    #[error("{message}")]
    Unauthorized {
        /// Human-readable message from the server, or a generic fallback
        message: String,
    },

    /// The server refused the request (other 4xx).
    #[error("{message}")]
    Rejected {
        /// HTTP status code
        status: u16,
        /// Human-readable message from the server, or a generic fallback
        message: String,
    },

    /// The server failed (5xx).
    #[error("Server error {status}: {message}")]
    Server {
        /// HTTP status code
        status: u16,
        /// Human-readable message from the server, or a generic fallback
        message: String,
    },

    /// The response body did not match the expected shape.
    #[error("Invalid response from {endpoint}: {reason}")]
    InvalidResponse {
        /// Endpoint the response came from
        endpoint: String,
        /// Why the body could not be used
        reason: String,
    },
}

impl GatewayError {
    /// Check if this error is a transport failure (service unreachable).
    pub fn is_connection_failed(&self) -> bool {
        matches!(self, GatewayError::ConnectionFailed { .. })
    }

    /// Check if the server rejected the credentials or session.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, GatewayError::Unauthorized { .. })
    }

    /// Check if the server itself failed or answered unintelligibly.
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            GatewayError::Server { .. } | GatewayError::InvalidResponse { .. }
        )
    }

    /// Get the server's human-readable message, if this error carries one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            GatewayError::Unauthorized { message }
            | GatewayError::Rejected { message, .. }
            | GatewayError::Server { message, .. } => Some(message),
            _ => None,
        }
    }
}

impl From<GatewayError> for crate::Error {
    fn from(err: GatewayError) -> Self {
        crate::Error::Gateway(err)
    }
}
