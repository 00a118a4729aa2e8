use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug, PartialEq)]
#[command(author, version, about = "Translation platform admin console", long_about = None)]
pub struct CliArgs {
    /// Session storage file (defaults to CONSOLE_STORAGE_PATH, then the
    /// per-user data directory)
    #[arg(long)]
    pub storage: Option<PathBuf>,

    /// Sign in before running the command
    #[arg(long, requires = "password")]
    pub email: Option<String>,

    #[arg(long, requires = "email")]
    pub password: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Fetch and cache the signed-in user's profile
    Me,
    /// End the current session
    Logout,
    /// Show one article
    Article { id: String },
    /// Load and print the reference tables
    References,
    /// Check whether the cached session may open a console path
    Guard { path: String },
    /// Print messages from a WebSocket endpoint until it closes
    Watch { path: String },
}

impl CliArgs {
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.email, &self.password) {
            (Some(email), Some(password)) => Some((email.as_str(), password.as_str())),
            _ => None,
        }
    }
}
