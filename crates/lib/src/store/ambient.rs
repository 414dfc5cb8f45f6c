//! Credential store for ambient cookie-session deployments.

use async_trait::async_trait;

use super::{CredentialScheme, CredentialStore};
use crate::Result;

/// Credential store that stores nothing.
///
/// For deployments where the server manages the session through a cookie the
/// client never sees a token: the gateway's cookie jar carries authentication
/// and rehydration always asks the server who the current user is. All three
/// slot operations are no-ops so the session manager stays variant-agnostic.
#[derive(Debug, Default, Clone, Copy)]
pub struct AmbientCredentials;

impl AmbientCredentials {
    /// Create the ambient credential store.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CredentialStore for AmbientCredentials {
    fn scheme(&self) -> CredentialScheme {
        CredentialScheme::Ambient
    }

    async fn save(&self, _token: &str) -> Result<()> {
        Ok(())
    }

    async fn load(&self) -> Result<Option<String>> {
        Ok(None)
    }

    async fn clear(&self) -> Result<()> {
        Ok(())
    }
}
