//! Profile command - update the display name and avatar.

use std::path::Path;

use ludex::gateway::{AvatarUpload, ProfileUpdate};

use crate::{cli::ProfileArgs, commands::start_session};

/// Run the profile update command
pub async fn run(args: &ProfileArgs) -> Result<(), Box<dyn std::error::Error>> {
    let avatar = match &args.avatar {
        Some(path) => Some(read_avatar(path).await?),
        None => None,
    };

    let manager = start_session(&args.connection)?;
    manager.settled().await;

    let update = ProfileUpdate {
        username: args.username.clone(),
        avatar,
    };
    match manager.update_profile(update).await {
        Ok(session) => {
            if let Some(user) = session.user {
                println!("Profile updated: {}", user.username);
            }
            manager.dispose();
            Ok(())
        }
        Err(e) => {
            eprintln!("profile update failed: {e}");
            std::process::exit(1);
        }
    }
}

/// Load the avatar file and tag it with a content type from the extension.
async fn read_avatar(path: &Path) -> Result<AvatarUpload, Box<dyn std::error::Error>> {
    let bytes = tokio::fs::read(path).await?;
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("avatar")
        .to_string();
    let content_type = match path.extension().and_then(|e| e.to_str()) {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    };

    Ok(AvatarUpload {
        filename,
        content_type: content_type.to_string(),
        bytes,
    })
}
