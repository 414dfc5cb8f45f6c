//! Register command - create a catalog account and sign in.

use crate::{
    cli::AuthArgs,
    commands::{resolve_password, start_session},
};

/// Run the register command
pub async fn run(args: &AuthArgs) -> Result<(), Box<dyn std::error::Error>> {
    let password = resolve_password(args.password.clone()).await?;
    let manager = start_session(&args.connection)?;
    manager.settled().await;

    match manager.register(&args.username, &password).await {
        Ok(session) => {
            if let Some(user) = session.user {
                println!("Account created. Signed in as {}.", user.username);
            }
            manager.dispose();
            Ok(())
        }
        Err(e) => {
            eprintln!("registration failed: {e}");
            std::process::exit(1);
        }
    }
}
