//! Command implementations for the Ludex CLI.

pub mod login;
pub mod logout;
pub mod profile;
pub mod register;
pub mod whoami;

use std::{path::PathBuf, sync::Arc};

use ludex::{gateway::HttpGateway, session::SessionManager, store::FileStore};
use tracing::debug;

use crate::cli::ConnectionArgs;

/// Slot directory used when neither the flag nor the env var names one.
const DEFAULT_STATE_DIR: &str = ".ludex";

/// Build the session the way a client application would: one file store
/// backing both slots, with the gateway reading the same store.
pub(crate) fn start_session(
    args: &ConnectionArgs,
) -> Result<SessionManager, Box<dyn std::error::Error>> {
    let dir = args
        .state_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_DIR));
    debug!(dir = %dir.display(), api_url = %args.api_url, "Starting session");

    let store = Arc::new(FileStore::new(dir));
    let gateway = Arc::new(HttpGateway::new(&args.api_url, store.clone())?);
    Ok(SessionManager::start(gateway, store.clone(), store))
}

/// Take the password from the flag or prompt for it without echo.
pub(crate) async fn resolve_password(
    flag: Option<String>,
) -> Result<String, Box<dyn std::error::Error>> {
    match flag {
        Some(password) => Ok(password),
        None => {
            let password =
                tokio::task::spawn_blocking(|| rpassword::prompt_password("Password: ")).await??;
            Ok(password)
        }
    }
}
