//! Error taxonomy for session operations.

use thiserror::Error;

use crate::gateway::GatewayError;

/// Errors a session operation can surface.
///
/// Variants carry normalized strings rather than source chains so the enum
/// is `Clone` and can live inside the published [`Session`](super::Session)
/// snapshot's error slot. Validation and policy errors are resolved before
/// any network call; the rest are gateway failures normalized at the session
/// boundary.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Existing variants will not be removed in minor versions
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// Input failed local validation; nothing was sent to the server.
    #[error("{reason}")]
    Validation {
        /// What was wrong with the input
        reason: String,
    },

    /// The username is reserved and cannot be self-assigned.
    #[error("The username '{username}' is reserved, please pick another")]
    ReservedName {
        /// The rejected username, trimmed
        username: String,
    },

    /// The server rejected the credentials.
    #[error("{message}")]
    Authentication {
        /// Server-provided message, surfaced verbatim
        message: String,
    },

    /// A privileged operation was attempted without an authenticated session.
    #[error("Not signed in")]
    NotAuthenticated,

    /// The server refused a non-credential operation.
    #[error("{message}")]
    Rejected {
        /// Server-provided message, surfaced verbatim
        message: String,
    },

    /// Another mutating operation is already in flight.
    #[error("Another session operation is already in progress")]
    Busy,

    /// The service could not be reached.
    #[error("Network error: {reason}")]
    Network {
        /// The underlying transport failure
        reason: String,
    },

    /// The service failed or answered unintelligibly.
    #[error("Server error: {message}")]
    Server {
        /// Description of the failure
        message: String,
    },

    /// The manager was disposed; no further operations are accepted.
    #[error("Session manager has been disposed")]
    Disposed,
}

impl SessionError {
    /// Check if this error was resolved locally, before any network call.
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            SessionError::Validation { .. } | SessionError::ReservedName { .. }
        )
    }

    /// Check if this error is the reserved-username policy.
    pub fn is_reserved_name(&self) -> bool {
        matches!(self, SessionError::ReservedName { .. })
    }

    /// Check if the server rejected the credentials or session.
    pub fn is_authentication_error(&self) -> bool {
        matches!(
            self,
            SessionError::Authentication { .. } | SessionError::NotAuthenticated
        )
    }

    /// Check if this error came from an overlapping operation.
    pub fn is_busy(&self) -> bool {
        matches!(self, SessionError::Busy)
    }

    /// Check if this error is a transport failure.
    pub fn is_network_error(&self) -> bool {
        matches!(self, SessionError::Network { .. })
    }

    /// Check if the manager rejected the call because it was disposed.
    pub fn is_disposed(&self) -> bool {
        matches!(self, SessionError::Disposed)
    }

    /// Normalize a failed register/login/reconciliation call.
    ///
    /// Any server rejection of a credentials operation, 401 or otherwise,
    /// reads as an authentication failure with the server's message.
    pub(crate) fn from_credentials_failure(err: &crate::Error) -> Self {
        match err {
            crate::Error::Gateway(g) => match g {
                GatewayError::ConnectionFailed { reason, .. } => SessionError::Network {
                    reason: reason.clone(),
                },
                GatewayError::Unauthorized { message }
                | GatewayError::Rejected { message, .. } => SessionError::Authentication {
                    message: message.clone(),
                },
                GatewayError::Server { message, .. } => SessionError::Server {
                    message: message.clone(),
                },
                other => SessionError::Server {
                    message: other.to_string(),
                },
            },
            other => SessionError::Server {
                message: other.to_string(),
            },
        }
    }

    /// Normalize a failed profile update.
    ///
    /// Unlike a credentials call, a 4xx here is the server refusing the
    /// submitted data, not the identity; only a 401 reads as authentication.
    pub(crate) fn from_profile_failure(err: &crate::Error) -> Self {
        match err {
            crate::Error::Gateway(g) => match g {
                GatewayError::ConnectionFailed { reason, .. } => SessionError::Network {
                    reason: reason.clone(),
                },
                GatewayError::Unauthorized { message } => SessionError::Authentication {
                    message: message.clone(),
                },
                GatewayError::Rejected { message, .. } => SessionError::Rejected {
                    message: message.clone(),
                },
                GatewayError::InvalidPayload { reason } => SessionError::Validation {
                    reason: reason.clone(),
                },
                GatewayError::Server { message, .. } => SessionError::Server {
                    message: message.clone(),
                },
                other => SessionError::Server {
                    message: other.to_string(),
                },
            },
            other => SessionError::Server {
                message: other.to_string(),
            },
        }
    }
}

impl From<SessionError> for crate::Error {
    fn from(err: SessionError) -> Self {
        crate::Error::Session(err)
    }
}
