//! Session snapshot types.

use std::fmt;

use super::errors::SessionError;
use crate::user::User;

/// Where the session currently stands in its lifecycle.
///
/// `Unknown` exists only for the instant between construction and the
/// automatic rehydration attempt; consumers normally first observe
/// `Checking`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionStatus {
    /// Nothing is known yet
    Unknown,
    /// Rehydration/reconciliation is in flight
    Checking,
    /// The server has confirmed who the user is
    Authenticated,
    /// Nobody is signed in
    Anonymous,
    /// Reconciliation failed for a reason other than an invalid credential
    Error,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionStatus::Unknown => "unknown",
            SessionStatus::Checking => "checking",
            SessionStatus::Authenticated => "authenticated",
            SessionStatus::Anonymous => "anonymous",
            SessionStatus::Error => "error",
        };
        f.write_str(s)
    }
}

/// Immutable snapshot of the session state.
///
/// The session manager is the only writer; everything a consumer sees is a
/// clone taken inside the manager's critical section, so `user` and `status`
/// are always mutually consistent: `user` is present if and only if `status`
/// is [`SessionStatus::Authenticated`].
#[derive(Clone, Debug)]
pub struct Session {
    /// Current lifecycle state
    pub status: SessionStatus,

    /// The authenticated user; present iff `status` is `Authenticated`
    pub user: Option<User>,

    /// The held token on token deployments; ambient deployments leave this
    /// empty even while authenticated
    pub credential: Option<String>,

    /// Outcome of the last failed operation; cleared when a new one starts
    pub last_error: Option<SessionError>,

    /// Whether rehydration or a mutating operation is in flight
    pub busy: bool,

    /// Last-known user from the identity cache, offered as a pre-render hint
    /// while the authoritative answer is outstanding; never consulted for
    /// authorization
    pub profile_hint: Option<User>,
}

impl Session {
    /// Whether the server has confirmed an identity.
    pub fn is_authenticated(&self) -> bool {
        self.status == SessionStatus::Authenticated
    }

    /// The authorization predicate gating privileged UI.
    ///
    /// True only for a confirmed administrator; `Checking`, `Anonymous`, and
    /// `Error` states are never admin, regardless of any cached hint.
    pub fn is_admin(&self) -> bool {
        self.status == SessionStatus::Authenticated
            && self.user.as_ref().is_some_and(User::is_admin)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self {
            status: SessionStatus::Unknown,
            user: None,
            credential: None,
            last_error: None,
            busy: false,
            profile_hint: None,
        }
    }
}
