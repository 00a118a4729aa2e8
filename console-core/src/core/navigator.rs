//! Client-side navigation surface.

use std::sync::{Mutex, PoisonError};

pub const ROOT_PATH: &str = "/";

pub trait Navigator: Send + Sync {
    /// Move to `path`, replacing the current location.
    fn navigate(&self, path: &str);
    fn current_path(&self) -> String;
}

/// Navigator that keeps every visited path, most recent last.
#[derive(Debug)]
pub struct HistoryNavigator {
    history: Mutex<Vec<String>>,
}

impl HistoryNavigator {
    pub fn new() -> Self {
        Self::starting_at(ROOT_PATH)
    }

    pub fn starting_at(path: &str) -> Self {
        Self {
            history: Mutex::new(vec![path.to_string()]),
        }
    }

    pub fn history(&self) -> Vec<String> {
        self.history.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl Default for HistoryNavigator {
    fn default() -> Self {
        Self::new()
    }
}

impl Navigator for HistoryNavigator {
    fn navigate(&self, path: &str) {
        log::debug!("[Navigator] -> {}", path);
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(path.to_string());
    }

    fn current_path(&self) -> String {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
            .unwrap_or_else(|| ROOT_PATH.to_string())
    }
}
