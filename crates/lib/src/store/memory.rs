//! In-memory slot storage.

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{CredentialScheme, CredentialStore, IdentityCache};
use crate::{Result, user::User};

/// Non-persistent store holding both session slots in memory.
///
/// Backs tests and embedders that do not want identity to survive the
/// process. Implements the token scheme: an empty slot means nobody was
/// signed in, so rehydration can settle without a network call.
#[derive(Debug, Default)]
pub struct MemoryStore {
    credential: RwLock<Option<String>>,
    profile: RwLock<Option<User>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    fn scheme(&self) -> CredentialScheme {
        CredentialScheme::Token
    }

    async fn save(&self, token: &str) -> Result<()> {
        *self.credential.write().await = Some(token.to_string());
        Ok(())
    }

    async fn load(&self) -> Result<Option<String>> {
        Ok(self.credential.read().await.clone())
    }

    async fn clear(&self) -> Result<()> {
        *self.credential.write().await = None;
        Ok(())
    }
}

#[async_trait]
impl IdentityCache for MemoryStore {
    async fn save(&self, user: &User) -> Result<()> {
        *self.profile.write().await = Some(user.clone());
        Ok(())
    }

    async fn load(&self) -> Result<Option<User>> {
        Ok(self.profile.read().await.clone())
    }

    async fn clear(&self) -> Result<()> {
        *self.profile.write().await = None;
        Ok(())
    }
}
