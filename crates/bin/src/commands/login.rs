//! Login command - authenticate against the catalog service.

use crate::{
    cli::AuthArgs,
    commands::{resolve_password, start_session},
};

/// Run the login command
pub async fn run(args: &AuthArgs) -> Result<(), Box<dyn std::error::Error>> {
    let password = resolve_password(args.password.clone()).await?;
    let manager = start_session(&args.connection)?;
    manager.settled().await;

    match manager.login(&args.username, &password).await {
        Ok(session) => {
            if let Some(user) = session.user {
                println!("Signed in as {}.", user.username);
                if user.is_admin() {
                    println!("You have admin privileges on this catalog.");
                }
            }
            manager.dispose();
            Ok(())
        }
        Err(e) => {
            eprintln!("login failed: {e}");
            std::process::exit(1);
        }
    }
}
