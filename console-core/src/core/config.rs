//! Process-wide console configuration.
//!
//! Resolved once at startup from environment-style inputs and shared
//! read-only (`Arc<Config>`) with every component that needs it.

use std::path::PathBuf;

use super::error::ConsoleError;

pub const API_ADDRESS_VAR: &str = "CONSOLE_API_ADDRESS";
pub const WEBSOCKET_ADDRESS_VAR: &str = "CONSOLE_WEBSOCKET_ADDRESS";
pub const SIMPLIFIED_TRANSLATION_VAR: &str = "CONSOLE_SIMPLIFIED_TRANSLATION";
pub const STORAGE_PATH_VAR: &str = "CONSOLE_STORAGE_PATH";

/// Storage key of the cached profile of the signed-in user.
pub const USER_INFO_KEY: &str = "userInfo";
/// Event bus channel carrying [`AlertMessage`](super::alert::AlertMessage)s.
pub const ALERT_MESSAGE_KEY: &str = "AlertMessage";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub backend_address: String,
    pub websocket_address: String,
    pub is_simplified_translation_enabled: bool,
    pub storage_path: Option<PathBuf>,
}

impl Config {
    /// Build the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConsoleError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConsoleError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let backend_address = lookup(API_ADDRESS_VAR)
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ConsoleError::Config(format!("{} is not set", API_ADDRESS_VAR)))?;

        let websocket_address = match lookup(WEBSOCKET_ADDRESS_VAR) {
            Some(v) if !v.trim().is_empty() => v.trim().trim_end_matches('/').to_string(),
            _ => derive_websocket_address(&backend_address),
        };

        let is_simplified_translation_enabled = lookup(SIMPLIFIED_TRANSLATION_VAR)
            .map(|v| parse_flag(&v))
            .unwrap_or(false);

        let storage_path = lookup(STORAGE_PATH_VAR)
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            backend_address,
            websocket_address,
            is_simplified_translation_enabled,
            storage_path,
        })
    }

    /// Absolute URL of a backend endpoint, e.g. `api_url("/users/me/")`.
    pub fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.backend_address, path)
    }

    pub fn websocket_url(&self, path: &str) -> String {
        format!("{}{}", self.websocket_address, path)
    }
}

fn derive_websocket_address(backend: &str) -> String {
    if let Some(rest) = backend.strip_prefix("https://") {
        format!("wss://{}", rest)
    } else if let Some(rest) = backend.strip_prefix("http://") {
        format!("ws://{}", rest)
    } else {
        backend.to_string()
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
