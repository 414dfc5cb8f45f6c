//! Boundary to the catalog service's auth endpoints.
//!
//! The session manager talks to the service exclusively through the
//! [`AuthGateway`] trait: register, login, logout, the `me` reconciliation
//! probe, and the profile update. [`HttpGateway`] is the production
//! implementation; tests substitute scripted gateways to drive the state
//! machine without a network.

use async_trait::async_trait;

use crate::{Result, user::User};

pub mod errors;
mod http;
mod wire;

pub use errors::GatewayError;
pub use http::HttpGateway;

/// Outcome of a successful register or login call.
#[derive(Clone, Debug)]
pub struct AuthPayload {
    /// The account, as the server canonicalized it
    pub user: User,
    /// Opaque bearer token; absent on ambient-session deployments
    pub token: Option<String>,
}

/// Profile changes submitted as one bundle.
///
/// The server treats the update as a whole: the response carries the full
/// replacement user record, never a partial patch.
#[derive(Clone, Debug)]
pub struct ProfileUpdate {
    /// New display name
    pub username: String,
    /// New avatar image, if the user picked one
    pub avatar: Option<AvatarUpload>,
}

/// Raw avatar image bytes for a profile update.
#[derive(Clone, Debug)]
pub struct AvatarUpload {
    /// Original file name, e.g. `avatar.png`
    pub filename: String,
    /// MIME type, e.g. `image/png`
    pub content_type: String,
    /// Image contents
    pub bytes: Vec<u8>,
}

/// The network operations the session manager depends on.
///
/// Implementations attach whatever credential the deployment's
/// [`CredentialStore`](crate::store::CredentialStore) currently holds;
/// callers never pass tokens explicitly.
#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// `POST /api/auth/register` - create an account and sign it in.
    async fn register(&self, username: &str, password: &str) -> Result<AuthPayload>;

    /// `POST /api/auth/login` - authenticate an existing account.
    async fn login(&self, username: &str, password: &str) -> Result<AuthPayload>;

    /// `POST /api/auth/logout` - invalidate the server-side session.
    async fn logout(&self) -> Result<()>;

    /// `GET /api/auth/me` - ask the server who the current credential belongs to.
    ///
    /// A 401 here is the expected signal that the stored credential has
    /// expired; implementations surface it as
    /// [`GatewayError::Unauthorized`].
    async fn me(&self) -> Result<User>;

    /// `PUT /api/users/profile` - replace profile fields, multipart.
    async fn update_profile(&self, update: ProfileUpdate) -> Result<User>;
}
