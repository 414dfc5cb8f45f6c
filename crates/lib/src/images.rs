//! Image references and URL resolution.
//!
//! The catalog service historically described images several ways (a bare
//! path, a "has avatar" flag next to an owner id, an object wrapping an
//! avatar id). [`ImageRef`] is the single tagged form the rest of the crate
//! works with; the gateway normalizes wire responses into it, and
//! [`resolve`] turns it back into a displayable URL.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use url::Url;

/// What an owner-served image belongs to.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum ImageKind {
    /// User avatar, served from `/api/users/avatar/{id}`
    User,
    /// Game cover, served from `/api/games/cover/{id}`
    Game,
}

/// Reference to an image held by the catalog service.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum ImageRef {
    /// No image; callers render their fallback
    #[default]
    None,
    /// Direct path, either absolute or relative to the service base URL
    Path(String),
    /// Image served from the owner's endpoint, addressed by owner id
    Owner {
        /// Id of the owning user or game
        id: u64,
        /// Which owner endpoint serves the image
        kind: ImageKind,
    },
}

impl ImageRef {
    /// Whether there is an image to display at all.
    pub fn is_some(&self) -> bool {
        !matches!(self, ImageRef::None)
    }
}

/// Resolve an image reference into a displayable URL.
///
/// Server paths land under the base URL, including any subpath the base
/// carries; absolute URLs pass through untouched. Owner-served images get a
/// `t` query parameter so a re-uploaded image is not hidden behind a cached
/// copy of the same URL. `fallback` is returned verbatim for
/// [`ImageRef::None`] and for paths the base URL cannot absorb.
///
/// # Arguments
/// * `base` - Service base URL, e.g. `http://localhost:5000`
/// * `image` - The reference to resolve
/// * `fallback` - Asset to use when there is nothing to show
pub fn resolve(base: &Url, image: &ImageRef, fallback: &str) -> String {
    match image {
        ImageRef::None => fallback.to_string(),
        ImageRef::Path(path) => match join_under(base, path) {
            Ok(url) => url.to_string(),
            Err(_) => fallback.to_string(),
        },
        ImageRef::Owner { id, kind } => {
            let path = match kind {
                ImageKind::User => format!("api/users/avatar/{id}"),
                ImageKind::Game => format!("api/games/cover/{id}"),
            };
            match join_under(base, &path) {
                Ok(mut url) => {
                    url.query_pairs_mut()
                        .append_pair("t", &unix_millis().to_string());
                    url.to_string()
                }
                Err(_) => fallback.to_string(),
            }
        }
    }
}

/// Join a server path under the base URL, keeping any subpath the base
/// carries.
///
/// `Url::join` treats a leading `/` as site-absolute, which would drop a
/// base path like `/catalog`; server paths here are always relative to the
/// service root, wherever it is mounted.
fn join_under(base: &Url, path: &str) -> Result<Url, url::ParseError> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let normalized = format!("{}/", base.path());
        base.set_path(&normalized);
    }
    base.join(path.strip_prefix('/').unwrap_or(path))
}

fn unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}
