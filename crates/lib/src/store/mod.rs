//! Persistence for the session's two named slots.
//!
//! Across restarts the client keeps at most two pieces of state: the
//! credential that makes subsequent requests authenticated, and the
//! last-known user record used as a pre-render hint. The [`CredentialStore`]
//! and [`IdentityCache`] traits cover those slots; the session manager is
//! their only writer.
//!
//! Two credential variants are supported, chosen per deployment at
//! construction time and never switched at runtime:
//!
//! - **token-held** ([`FileStore`], [`MemoryStore`]): the client keeps an
//!   opaque token and the gateway attaches it to every request.
//! - **ambient-session** ([`AmbientCredentials`]): the server manages a
//!   cookie session; the client stores nothing and rehydration is purely an
//!   "ask the server who I am" call.

use async_trait::async_trait;

use crate::{Result, user::User};

mod ambient;
pub mod errors;
mod file;
mod memory;

pub use ambient::AmbientCredentials;
pub use errors::StoreError;
pub use file::FileStore;
pub use memory::MemoryStore;

/// How a deployment makes requests authenticated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CredentialScheme {
    /// The client holds an opaque token and attaches it per request
    Token,
    /// The server holds the session in a cookie; the client stores nothing
    Ambient,
}

/// Storage for the credential slot.
///
/// Implementations must be `Send + Sync`; the session manager shares them
/// with the HTTP gateway, which reads (never writes) the slot to decorate
/// outgoing requests.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Which credential scheme this store implements.
    ///
    /// Lets the session manager distinguish a token deployment with an empty
    /// slot (nothing to reconcile, short-circuit to anonymous) from an
    /// ambient deployment (the server must always be asked).
    fn scheme(&self) -> CredentialScheme;

    /// Persist the credential, replacing any previous one.
    async fn save(&self, token: &str) -> Result<()>;

    /// Retrieve the persisted credential, if any.
    async fn load(&self) -> Result<Option<String>>;

    /// Remove the persisted credential.
    ///
    /// Clearing an already-empty slot is not an error.
    async fn clear(&self) -> Result<()>;
}

/// Storage for the last-known user snapshot.
///
/// The snapshot is a pre-render hint only: it lets a UI show who was signed
/// in before the authoritative reconciliation answer arrives. It is never
/// consulted for authorization, and the server's copy overwrites it
/// unconditionally.
#[async_trait]
pub trait IdentityCache: Send + Sync {
    /// Persist the user snapshot, replacing any previous one.
    async fn save(&self, user: &User) -> Result<()>;

    /// Retrieve the persisted snapshot, if any.
    async fn load(&self) -> Result<Option<User>>;

    /// Remove the persisted snapshot.
    ///
    /// Must be called whenever the credential slot is cleared so a stale
    /// identity cannot outlive its credential.
    async fn clear(&self) -> Result<()>;
}
