//! Whoami command - show the reconciled session.

use ludex::{images, session::SessionStatus};
use url::Url;

use crate::{cli::ConnectionArgs, commands::start_session};

const AVATAR_FALLBACK: &str = "(no avatar)";

/// Run the whoami command
pub async fn run(args: &ConnectionArgs) -> Result<(), Box<dyn std::error::Error>> {
    let manager = start_session(args)?;
    let session = manager.settled().await;

    match session.status {
        SessionStatus::Authenticated => {
            if let Some(user) = &session.user {
                println!("Signed in as {} (id {})", user.username, user.id);
                if user.is_admin() {
                    println!("role:   admin");
                }
                let base = Url::parse(&args.api_url)?;
                println!(
                    "avatar: {}",
                    images::resolve(&base, &user.avatar, AVATAR_FALLBACK)
                );
            }
            manager.dispose();
            Ok(())
        }
        SessionStatus::Error => {
            eprintln!("could not reach the catalog service");
            if let Some(err) = session.last_error {
                eprintln!("  {err}");
            }
            std::process::exit(1);
        }
        _ => {
            println!("Not signed in.");
            manager.dispose();
            Ok(())
        }
    }
}
