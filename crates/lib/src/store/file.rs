//! File-backed slot storage.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use tracing::warn;

use super::{CredentialScheme, CredentialStore, IdentityCache, errors::StoreError};
use crate::{Result, user::User};

const CREDENTIAL_SLOT: &str = "credential";
const PROFILE_SLOT: &str = "profile";

/// Wire shape of the credential slot file.
#[derive(serde::Serialize, serde::Deserialize)]
struct CredentialSlot {
    token: String,
}

/// Token-held store persisting both session slots as JSON files.
///
/// Each slot is one pretty-printed file (`credential.json`, `profile.json`)
/// under the given directory, created on first save. A slot that fails to
/// parse is treated as absent rather than poisoning every startup; the
/// session manager then falls back to an anonymous session.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `dir`.
    ///
    /// The directory is created lazily on the first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the slot files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn slot_path(&self, slot: &'static str) -> PathBuf {
        self.dir.join(format!("{slot}.json"))
    }

    async fn read_slot<T: DeserializeOwned>(&self, slot: &'static str) -> Result<Option<T>> {
        match tokio::fs::read_to_string(self.slot_path(slot)).await {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(value) => Ok(Some(value)),
                Err(e) => {
                    warn!(slot, error = %e, "Discarding unreadable slot file");
                    Ok(None)
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::FileIo { slot, source: e }.into()),
        }
    }

    async fn write_slot<T: Serialize>(&self, slot: &'static str, value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)
            .map_err(|e| StoreError::SerializationFailed { slot, source: e })?;
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| StoreError::FileIo { slot, source: e })?;
        tokio::fs::write(self.slot_path(slot), json)
            .await
            .map_err(|e| StoreError::FileIo { slot, source: e }.into())
    }

    async fn remove_slot(&self, slot: &'static str) -> Result<()> {
        match tokio::fs::remove_file(self.slot_path(slot)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::FileIo { slot, source: e }.into()),
        }
    }
}

#[async_trait]
impl CredentialStore for FileStore {
    fn scheme(&self) -> CredentialScheme {
        CredentialScheme::Token
    }

    async fn save(&self, token: &str) -> Result<()> {
        self.write_slot(
            CREDENTIAL_SLOT,
            &CredentialSlot {
                token: token.to_string(),
            },
        )
        .await
    }

    async fn load(&self) -> Result<Option<String>> {
        let slot: Option<CredentialSlot> = self.read_slot(CREDENTIAL_SLOT).await?;
        Ok(slot.map(|s| s.token))
    }

    async fn clear(&self) -> Result<()> {
        self.remove_slot(CREDENTIAL_SLOT).await
    }
}

#[async_trait]
impl IdentityCache for FileStore {
    async fn save(&self, user: &User) -> Result<()> {
        self.write_slot(PROFILE_SLOT, user).await
    }

    async fn load(&self) -> Result<Option<User>> {
        self.read_slot(PROFILE_SLOT).await
    }

    async fn clear(&self) -> Result<()> {
        self.remove_slot(PROFILE_SLOT).await
    }
}
