//! Session management: who is signed in, and is that belief authoritative.
//!
//! [`SessionManager`] owns the session state machine
//! (`Unknown → Checking → {Authenticated | Anonymous}`, with `Error` for
//! failed reconciliation) and is the only writer of the credential and
//! identity slots. Consumers read immutable [`Session`] snapshots through
//! `current()`/`subscribe()` and drive changes through the four mutating
//! operations plus `refresh()`.
//!
//! Construction immediately starts rehydration: restore identity from the
//! stores without user interaction, then reconcile it against the server's
//! authoritative view.

use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::{
    Result,
    gateway::{AuthGateway, AuthPayload, ProfileUpdate},
    store::{CredentialScheme, CredentialStore, IdentityCache},
};

pub mod errors;
mod state;

pub use errors::SessionError;
pub use state::{Session, SessionStatus};

/// Username that cannot be self-assigned at registration.
const RESERVED_USERNAME: &str = "admin";

/// The mutable session cell guarded by the state mutex.
struct Cell {
    session: Session,
    /// Bumped by `dispose()`; a write whose ticket no longer matches is
    /// discarded on arrival instead of applied
    epoch: u64,
    disposed: bool,
}

/// Internal state for SessionManager
///
/// This structure holds the actual implementation data for SessionManager.
/// SessionManager itself is just a cheap-to-clone handle wrapping
/// Arc<SessionInternal>.
struct SessionInternal {
    gateway: Arc<dyn AuthGateway>,
    credentials: Arc<dyn CredentialStore>,
    cache: Arc<dyn IdentityCache>,
    cell: Mutex<Cell>,
    /// Mirrors the cell's session after every transition; readers and
    /// subscribers take snapshots from here without touching the mutex
    watch: watch::Sender<Session>,
}

impl SessionInternal {
    fn publish(&self, cell: &Cell) {
        self.watch.send_replace(cell.session.clone());
    }

    /// Acquire the busy marker and clear the error slot.
    ///
    /// Returns the epoch ticket the operation must present when applying its
    /// result. Overlapping mutating calls are rejected here, never queued or
    /// interleaved.
    fn begin_op(&self, op: &'static str) -> Result<u64> {
        let mut cell = self.cell.lock().unwrap();
        if cell.disposed {
            return Err(SessionError::Disposed.into());
        }
        if cell.session.busy {
            debug!(op, "Rejecting overlapping session operation");
            return Err(SessionError::Busy.into());
        }
        cell.session.busy = true;
        cell.session.last_error = None;
        self.publish(&cell);
        Ok(cell.epoch)
    }

    /// Apply a state transition inside the critical section.
    ///
    /// Returns false when the ticket is stale (the manager was disposed
    /// while the operation was in flight); the transition is then discarded.
    fn apply(&self, epoch: u64, f: impl FnOnce(&mut Session)) -> bool {
        let mut cell = self.cell.lock().unwrap();
        if cell.disposed || cell.epoch != epoch {
            debug!("Discarding session update from a stale operation");
            return false;
        }
        f(&mut cell.session);
        self.publish(&cell);
        true
    }

    /// Record a failed operation: release the busy marker and expose the
    /// error, leaving the rest of the state exactly as it was.
    fn fail_op(&self, epoch: u64, err: SessionError) {
        let recorded = self.apply(epoch, |s| {
            s.busy = false;
            s.last_error = Some(err.clone());
        });
        if recorded {
            debug!(error = %err, "Session operation failed");
        }
    }

    /// Clear both persisted slots, logging rather than propagating failures.
    async fn clear_stores(&self) {
        if let Err(e) = self.credentials.clear().await {
            warn!(error = %e, "Failed to clear credential slot");
        }
        if let Err(e) = self.cache.clear().await {
            warn!(error = %e, "Failed to clear profile snapshot");
        }
    }

    /// Land a successful register/login: persist, then transition.
    ///
    /// Credential and user are applied in one critical section so no reader
    /// can observe one without the other. Returns false when the manager was
    /// disposed while the call was in flight and the result was discarded.
    async fn complete_sign_in(&self, epoch: u64, payload: AuthPayload, op: &'static str) -> bool {
        if let Some(token) = payload.token.as_deref()
            && let Err(e) = self.credentials.save(token).await
        {
            warn!(error = %e, "Failed to persist credential");
        }
        if let Err(e) = self.cache.save(&payload.user).await {
            warn!(error = %e, "Failed to persist profile snapshot");
        }

        let applied = self.apply(epoch, |s| {
            s.status = SessionStatus::Authenticated;
            s.user = Some(payload.user.clone());
            s.credential = payload.token.clone();
            s.profile_hint = None;
            s.busy = false;
        });
        if applied {
            info!(username = %payload.user.username, op, "Signed in");
        }
        applied
    }

    /// Confirm or correct the session against the server's view.
    ///
    /// Shared by the construction-time rehydration and [`SessionManager::refresh`].
    async fn reconcile(&self, epoch: u64) -> std::result::Result<(), SessionError> {
        // 1. A token deployment with an empty slot has nobody to ask about.
        //    Ambient deployments always ask; the cookie jar decides.
        let credential = match self.credentials.load().await {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "Failed to read credential slot");
                None
            }
        };
        if self.credentials.scheme() == CredentialScheme::Token && credential.is_none() {
            self.clear_stores().await;
            self.apply(epoch, |s| {
                s.status = SessionStatus::Anonymous;
                s.user = None;
                s.credential = None;
                s.profile_hint = None;
                s.busy = false;
            });
            debug!("No stored credential, settling anonymous");
            return Ok(());
        }

        // 2. Ask the server who this credential belongs to.
        match self.gateway.me().await {
            Ok(user) => {
                // The server's copy wins over whatever the cache held.
                if let Err(e) = self.cache.save(&user).await {
                    warn!(error = %e, "Failed to persist profile snapshot");
                }
                let applied = self.apply(epoch, |s| {
                    s.status = SessionStatus::Authenticated;
                    s.user = Some(user.clone());
                    s.credential = credential.clone();
                    s.profile_hint = None;
                    s.busy = false;
                });
                if applied {
                    info!(username = %user.username, "Session reconciled");
                }
                Ok(())
            }
            Err(err) if err.is_authentication_error() => {
                // An expired credential is expected, not exceptional: settle
                // anonymous with the error slot left empty.
                self.clear_stores().await;
                self.apply(epoch, |s| {
                    s.status = SessionStatus::Anonymous;
                    s.user = None;
                    s.credential = None;
                    s.profile_hint = None;
                    s.last_error = None;
                    s.busy = false;
                });
                debug!("Stored credential no longer valid, settling anonymous");
                Ok(())
            }
            Err(err) => {
                let err = SessionError::from_credentials_failure(&err);
                self.apply(epoch, |s| {
                    // A live authenticated session survives a failed probe;
                    // otherwise the caller gets a retryable Error state. The
                    // credential stays stored so retrying can succeed.
                    if s.status != SessionStatus::Authenticated {
                        s.status = SessionStatus::Error;
                        s.user = None;
                    }
                    s.last_error = Some(err.clone());
                    s.busy = false;
                });
                warn!(error = %err, "Session reconciliation failed");
                Err(err)
            }
        }
    }
}

/// Holder of the client's authentication state.
///
/// One manager runs per application instance, constructed explicitly with
/// its gateway and stores injected and torn down with [`dispose`]. It is a
/// cheap-to-clone handle around shared internal state, so the UI layer and
/// background tasks can all hold it.
///
/// [`dispose`]: SessionManager::dispose
///
/// ## Example
///
/// ```no_run
/// # use std::sync::Arc;
/// # use ludex::{gateway::HttpGateway, session::SessionManager, store::MemoryStore};
/// # #[tokio::main]
/// # async fn main() -> ludex::Result<()> {
/// let store = Arc::new(MemoryStore::new());
/// let gateway = Arc::new(HttpGateway::new("http://localhost:5000", store.clone())?);
/// let session = SessionManager::start(gateway, store.clone(), store);
///
/// // Rehydration runs on its own; wait for the authoritative answer
/// session.settled().await;
///
/// let snapshot = session.login("alice", "hunter2").await?;
/// println!("signed in as {}", snapshot.user.unwrap().username);
/// session.dispose();
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<SessionInternal>,
}

impl SessionManager {
    /// Construct the manager and start rehydrating.
    ///
    /// The returned handle is usable immediately: state is `Checking` and
    /// the busy marker is held until the rehydration attempt settles, so
    /// mutating calls issued before then observe `Busy`.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Arguments
    /// * `gateway` - Boundary to the catalog service
    /// * `credentials` - The deployment's credential slot
    /// * `cache` - The deployment's identity cache slot
    pub fn start(
        gateway: Arc<dyn AuthGateway>,
        credentials: Arc<dyn CredentialStore>,
        cache: Arc<dyn IdentityCache>,
    ) -> Self {
        let initial = Session::default();
        let (watch, _) = watch::channel(initial.clone());
        let inner = Arc::new(SessionInternal {
            gateway,
            credentials,
            cache,
            cell: Mutex::new(Cell {
                session: initial,
                epoch: 0,
                disposed: false,
            }),
            watch,
        });

        // The rehydration attempt needs no external trigger.
        let epoch = {
            let mut cell = inner.cell.lock().unwrap();
            cell.session.status = SessionStatus::Checking;
            cell.session.busy = true;
            inner.publish(&cell);
            cell.epoch
        };
        tokio::spawn(run_rehydration(inner.clone(), epoch));

        debug!("Session manager started");
        Self { inner }
    }

    /// The latest session snapshot.
    pub fn current(&self) -> Session {
        self.inner.watch.borrow().clone()
    }

    /// Subscribe to session changes.
    ///
    /// Every state transition publishes a fresh snapshot; the receiver
    /// always starts with the current one.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.inner.watch.subscribe()
    }

    /// Wait until no operation is in flight and return that snapshot.
    ///
    /// Primarily used right after construction to wait out the initial
    /// rehydration instead of rendering from the pre-render hint.
    pub async fn settled(&self) -> Session {
        let mut rx = self.subscribe();
        loop {
            let snapshot = rx.borrow_and_update().clone();
            if !snapshot.busy {
                return snapshot;
            }
            if rx.changed().await.is_err() {
                return self.current();
            }
        }
    }

    /// The authorization predicate gating privileged UI.
    ///
    /// Pure function of the current snapshot: no I/O, no locking beyond the
    /// watch read, safe to call on every render.
    pub fn is_admin(&self) -> bool {
        self.inner.watch.borrow().is_admin()
    }

    /// Authenticate an existing account.
    ///
    /// Validation failures are resolved locally before any network call. On
    /// success the credential (token deployments) and user are replaced in
    /// one critical section; on failure the prior state is left intact with
    /// the normalized error in the snapshot's error slot.
    ///
    /// # Arguments
    /// * `username` - Login name; must be non-empty after trimming
    /// * `password` - Password; must be non-empty after trimming
    ///
    /// # Returns
    /// The settled session snapshot, or the error that was also recorded in
    /// `last_error`.
    pub async fn login(&self, username: &str, password: &str) -> Result<Session> {
        let epoch = self.inner.begin_op("login")?;

        // 1. Validate before any network traffic
        if let Err(err) = validate_credentials(username, password) {
            self.inner.fail_op(epoch, err.clone());
            return Err(err.into());
        }

        // 2. Authenticate against the service
        match self.inner.gateway.login(username, password).await {
            Ok(payload) => {
                if !self.inner.complete_sign_in(epoch, payload, "login").await {
                    return Err(SessionError::Disposed.into());
                }
                Ok(self.current())
            }
            Err(err) => {
                let err = SessionError::from_credentials_failure(&err);
                self.inner.fail_op(epoch, err.clone());
                Err(err.into())
            }
        }
    }

    /// Create an account and sign it in.
    ///
    /// Same contract as [`login`], plus the client-side username policy:
    /// privileged usernames are not self-assignable, so the literal
    /// `admin` (case-insensitive) is rejected before the server is ever
    /// contacted.
    ///
    /// [`login`]: SessionManager::login
    pub async fn register(&self, username: &str, password: &str) -> Result<Session> {
        let epoch = self.inner.begin_op("register")?;

        // 1. Validate and apply the reserved-name policy locally
        if let Err(err) = validate_credentials(username, password) {
            self.inner.fail_op(epoch, err.clone());
            return Err(err.into());
        }
        if let Some(err) = reserved_name(username) {
            self.inner.fail_op(epoch, err.clone());
            return Err(err.into());
        }

        // 2. Create the account
        match self.inner.gateway.register(username, password).await {
            Ok(payload) => {
                if !self
                    .inner
                    .complete_sign_in(epoch, payload, "register")
                    .await
                {
                    return Err(SessionError::Disposed.into());
                }
                Ok(self.current())
            }
            Err(err) => {
                let err = SessionError::from_credentials_failure(&err);
                self.inner.fail_op(epoch, err.clone());
                Err(err.into())
            }
        }
    }

    /// Sign out.
    ///
    /// The local transition always happens: state ends `Anonymous` with both
    /// slots cleared. A failed server-side invalidation is logged and
    /// swallowed, never surfaced, since the local sign-out is already done.
    pub async fn logout(&self) -> Result<Session> {
        let epoch = self.inner.begin_op("logout")?;

        // 1. Best-effort server-side invalidation, while the credential is
        //    still attached to outgoing requests
        if let Err(err) = self.inner.gateway.logout().await {
            warn!(error = %err, "Server-side session invalidation failed");
        }

        // 2. Local sign-out
        self.inner.clear_stores().await;
        let applied = self.inner.apply(epoch, |s| {
            s.status = SessionStatus::Anonymous;
            s.user = None;
            s.credential = None;
            s.profile_hint = None;
            s.last_error = None;
            s.busy = false;
        });
        if applied {
            info!("Signed out");
        }
        Ok(self.current())
    }

    /// Replace profile fields.
    ///
    /// Requires an authenticated session. On success the server's returned
    /// record replaces the cached user wholesale; no field of the optimistic
    /// copy survives a server omission. On failure the cached user is
    /// untouched.
    ///
    /// # Arguments
    /// * `update` - New display name and, optionally, a new avatar image
    pub async fn update_profile(&self, update: ProfileUpdate) -> Result<Session> {
        let epoch = self.inner.begin_op("update_profile")?;

        // 1. Privilege and validity checks, locally
        if self.current().status != SessionStatus::Authenticated {
            let err = SessionError::NotAuthenticated;
            self.inner.fail_op(epoch, err.clone());
            return Err(err.into());
        }
        if update.username.trim().is_empty() {
            let err = SessionError::Validation {
                reason: "Display name must not be empty".to_string(),
            };
            self.inner.fail_op(epoch, err.clone());
            return Err(err.into());
        }

        // 2. Submit and adopt the server's replacement record
        match self.inner.gateway.update_profile(update).await {
            Ok(user) => {
                if let Err(e) = self.inner.cache.save(&user).await {
                    warn!(error = %e, "Failed to persist profile snapshot");
                }
                let applied = self.inner.apply(epoch, |s| {
                    s.user = Some(user.clone());
                    s.busy = false;
                });
                if !applied {
                    return Err(SessionError::Disposed.into());
                }
                info!(username = %user.username, "Profile updated");
                Ok(self.current())
            }
            Err(err) => {
                let err = SessionError::from_profile_failure(&err);
                self.inner.fail_op(epoch, err.clone());
                Err(err.into())
            }
        }
    }

    /// Re-run reconciliation against the server.
    ///
    /// The retry path out of the `Error` state, also usable to pick up
    /// server-side changes. A 401 demotes to `Anonymous` exactly like a
    /// stale rehydration; a transport failure from an authenticated session
    /// records the error but keeps the session.
    pub async fn refresh(&self) -> Result<Session> {
        let epoch = self.inner.begin_op("refresh")?;
        match self.inner.reconcile(epoch).await {
            Ok(()) => Ok(self.current()),
            Err(err) => Err(err.into()),
        }
    }

    /// Tear the manager down.
    ///
    /// In-flight responses are discarded on arrival rather than applied, and
    /// every later operation fails with [`SessionError::Disposed`]. Disposal
    /// does not touch the persisted slots; a stored identity survives for
    /// the next manager to rehydrate.
    pub fn dispose(&self) {
        let mut cell = self.inner.cell.lock().unwrap();
        if cell.disposed {
            return;
        }
        cell.disposed = true;
        cell.epoch += 1;
        cell.session.busy = false;
        self.inner.publish(&cell);
        debug!("Session manager disposed");
    }
}

/// Construction-time rehydration: surface the cached identity as a
/// pre-render hint, then reconcile against the server.
async fn run_rehydration(inner: Arc<SessionInternal>, epoch: u64) {
    match inner.cache.load().await {
        Ok(Some(user)) => {
            inner.apply(epoch, |s| s.profile_hint = Some(user.clone()));
        }
        Ok(None) => {}
        Err(e) => warn!(error = %e, "Failed to read profile snapshot"),
    }

    let _ = inner.reconcile(epoch).await;
}

fn validate_credentials(username: &str, password: &str) -> std::result::Result<(), SessionError> {
    if username.trim().is_empty() || password.trim().is_empty() {
        return Err(SessionError::Validation {
            reason: "Username and password must not be empty".to_string(),
        });
    }
    Ok(())
}

fn reserved_name(username: &str) -> Option<SessionError> {
    let trimmed = username.trim();
    trimmed
        .eq_ignore_ascii_case(RESERVED_USERNAME)
        .then(|| SessionError::ReservedName {
            username: trimmed.to_string(),
        })
}
