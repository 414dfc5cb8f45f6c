//! CLI argument definitions for the Ludex binary.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Ludex game catalog client
#[derive(Parser, Debug)]
#[command(name = "ludex")]
#[command(about = "Ludex: sign in to the game catalog and manage your profile")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create an account and sign in
    Register(AuthArgs),
    /// Sign in to the catalog
    Login(AuthArgs),
    /// Sign out and clear the stored identity
    Logout(ConnectionArgs),
    /// Show the current session
    Whoami(ConnectionArgs),
    /// Update the signed-in profile
    Profile(ProfileArgs),
}

/// Connection and storage settings shared by all commands
#[derive(Args, Debug)]
pub struct ConnectionArgs {
    /// Base URL of the catalog service
    #[arg(
        short,
        long,
        default_value = "http://localhost:5000",
        env = "LUDEX_API_URL"
    )]
    pub api_url: String,

    /// Directory holding the credential and profile slots
    #[arg(short = 'D', long, env = "LUDEX_STATE_DIR")]
    pub state_dir: Option<PathBuf>,
}

/// Arguments for the register and login commands
#[derive(Args, Debug)]
pub struct AuthArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Account username
    pub username: String,

    /// Password; prompted for when not given
    #[arg(short, long)]
    pub password: Option<String>,
}

/// Arguments for the profile command
#[derive(Args, Debug)]
pub struct ProfileArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// New display name
    #[arg(long)]
    pub username: String,

    /// Path to a new avatar image
    #[arg(long)]
    pub avatar: Option<PathBuf>,
}
