//! Server-owned identity record, cached client-side.

use serde::{Deserialize, Serialize};

use crate::images::ImageRef;

/// Role id the server assigns to administrators.
///
/// Role semantics are server-defined and opaque to the client beyond this
/// one value.
pub const ADMIN_ROLE_ID: i64 = 1;

/// A user account as reported by the catalog service.
///
/// Created server-side at registration. The client never edits a `User` in
/// place: login, profile update, and rehydration each replace the cached
/// record wholesale with the server's copy, so server-side normalization
/// (e.g. a trimmed username) always wins.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    /// Stable account identifier
    pub id: u64,

    /// Unique login name (mutable via profile update)
    pub username: String,

    /// Server-assigned role id
    pub role_id: i64,

    /// Reference to the account's avatar image, if any
    pub avatar: ImageRef,
}

impl User {
    /// Whether this account carries the administrator role.
    pub fn is_admin(&self) -> bool {
        self.role_id == ADMIN_ROLE_ID
    }
}
