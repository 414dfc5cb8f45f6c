//!
//! Ludex client core: session and identity management for the game catalog.
//! This library answers "who is signed in" for every other part of the
//! client, and owns the state needed to answer it.
//!
//! ## Core Concepts
//!
//! * **Session Manager (`session::SessionManager`)**: The single holder of
//!   authentication state. Constructed with its collaborators injected, it
//!   rehydrates a persisted identity at startup, reconciles it against the
//!   server, and serializes all mutating operations (register, login,
//!   logout, profile update) through one busy marker.
//! * **Session (`session::Session`)**: The immutable snapshot consumers
//!   read: lifecycle status, current user, credential, last error.
//! * **Credential Store (`store::CredentialStore`)**: Pluggable persistence
//!   for the authentication credential. Deployments either hold a bearer
//!   token explicitly ([`store::FileStore`], [`store::MemoryStore`]) or
//!   lean on ambient cookie transport ([`store::AmbientCredentials`]).
//! * **Identity Cache (`store::IdentityCache`)**: A persisted snapshot of
//!   the signed-in user, used purely as a pre-render hint before the server
//!   confirms or denies it.
//! * **Auth Gateway (`gateway::AuthGateway`)**: The boundary to the catalog
//!   service's authentication endpoints; [`gateway::HttpGateway`] is the
//!   production implementation.
//! * **Image References (`images::ImageRef`)**: Normalized avatar and cover
//!   references, resolved to fetchable URLs in one place.

pub mod gateway;
pub mod images;
pub mod session;
pub mod store;
pub mod user;

/// Re-export the main session types for easier access.
pub use session::{Session, SessionManager, SessionStatus};
/// Re-export the user record, which appears throughout the public API.
pub use user::User;

/// Result type used throughout the Ludex library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the Ludex library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Structured session errors from the session module
    #[error(transparent)]
    Session(session::SessionError),

    /// Structured persistence errors from the store module
    #[error(transparent)]
    Store(store::StoreError),

    /// Structured transport errors from the gateway module
    #[error(transparent)]
    Gateway(gateway::GatewayError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Session(_) => "session",
            Error::Store(_) => "store",
            Error::Gateway(_) => "gateway",
        }
    }

    /// Check if this error is authentication-related.
    ///
    /// Covers both the session module's view (bad credentials, not signed
    /// in) and the gateway's raw 401 classification.
    pub fn is_authentication_error(&self) -> bool {
        match self {
            Error::Session(session_err) => session_err.is_authentication_error(),
            Error::Gateway(gateway_err) => gateway_err.is_unauthorized(),
            _ => false,
        }
    }

    /// Check if this error is validation-related.
    pub fn is_validation_error(&self) -> bool {
        match self {
            Error::Session(session_err) => session_err.is_validation_error(),
            _ => false,
        }
    }

    /// Check if this error means an operation was already in flight.
    pub fn is_busy(&self) -> bool {
        match self {
            Error::Session(session_err) => session_err.is_busy(),
            _ => false,
        }
    }

    /// Check if this error indicates the server could not be reached.
    pub fn is_network_error(&self) -> bool {
        match self {
            Error::Session(session_err) => session_err.is_network_error(),
            Error::Gateway(gateway_err) => gateway_err.is_connection_failed(),
            _ => false,
        }
    }

    /// Check if this error came from a disposed session manager.
    pub fn is_disposed(&self) -> bool {
        match self {
            Error::Session(session_err) => session_err.is_disposed(),
            _ => false,
        }
    }

    /// Check if this error is I/O related.
    pub fn is_io_error(&self) -> bool {
        match self {
            Error::Store(store_err) => store_err.is_io_error(),
            _ => false,
        }
    }
}
