//! Logout command - sign out and clear the stored identity.

use crate::{cli::ConnectionArgs, commands::start_session};

/// Run the logout command
pub async fn run(args: &ConnectionArgs) -> Result<(), Box<dyn std::error::Error>> {
    let manager = start_session(args)?;
    manager.settled().await;

    match manager.logout().await {
        Ok(_) => {
            println!("Signed out.");
            manager.dispose();
            Ok(())
        }
        Err(e) => {
            eprintln!("logout failed: {e}");
            std::process::exit(1);
        }
    }
}
