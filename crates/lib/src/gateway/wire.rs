//! Wire models for the catalog service's auth endpoints.
//!
//! The service has described avatars several ways over its lifetime: a bare
//! path, a boolean "has avatar" flag next to the account id, a separate
//! `avatar_id`, and a handful of placeholder literals meaning "nothing".
//! All of that is absorbed here, at deserialization, into [`ImageRef`] so
//! the rest of the crate never type-sniffs.

use serde::{Deserialize, Serialize};

use crate::{
    images::{ImageKind, ImageRef},
    user::User,
};

/// Request body for `POST /api/auth/register` and `POST /api/auth/login`.
#[derive(Debug, Serialize)]
pub(crate) struct CredentialsBody<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Response body for register/login: the account plus an optional token.
///
/// Ambient-session deployments omit `token` and set a cookie instead.
#[derive(Debug, Deserialize)]
pub(crate) struct AuthBody {
    pub user: WireUser,
    #[serde(default)]
    pub token: Option<String>,
}

/// Response body for `GET /api/auth/me` and `PUT /api/users/profile`.
#[derive(Debug, Deserialize)]
pub(crate) struct UserBody {
    pub user: WireUser,
}

/// Failure body: every error response carries a human-readable `message`.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

/// A user record as the service sends it.
#[derive(Debug, Deserialize)]
pub(crate) struct WireUser {
    pub id: u64,
    pub username: String,
    pub role_id: i64,
    #[serde(default)]
    avatar: Option<AvatarField>,
    #[serde(default)]
    avatar_id: Option<u64>,
}

/// The historical encodings of the `avatar` field.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AvatarField {
    Flag(bool),
    Path(String),
}

/// Path literals the service has used to mean "no image".
const EMPTY_PATH_LITERALS: [&str; 4] = ["", "placeholder", "null", "{}"];

impl WireUser {
    /// Normalize into the crate's [`User`], collapsing the avatar encodings
    /// into one tagged reference.
    pub(crate) fn into_user(self) -> User {
        let avatar = match self.avatar {
            None | Some(AvatarField::Flag(false)) => ImageRef::None,
            Some(AvatarField::Flag(true)) => ImageRef::Owner {
                // Newer responses carry a dedicated avatar_id; older ones
                // reuse the account id.
                id: self.avatar_id.unwrap_or(self.id),
                kind: ImageKind::User,
            },
            Some(AvatarField::Path(path)) => {
                if EMPTY_PATH_LITERALS.contains(&path.as_str()) {
                    ImageRef::None
                } else {
                    ImageRef::Path(path)
                }
            }
        };

        User {
            id: self.id,
            username: self.username,
            role_id: self.role_id,
            avatar,
        }
    }
}
