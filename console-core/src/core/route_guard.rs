//! Role-based navigation guard.
//!
//! Runs before every navigation and decides, from the cached profile alone,
//! whether the requested path may be shown. Public pages are always
//! reachable; everything else needs a cached profile, and the three known
//! staff/user roles are restricted to their path prefixes.

use std::sync::Arc;

use regex::Regex;
use serde_json::Value;

use super::config::USER_INFO_KEY;
use super::error::ConsoleError;
use super::models::Role;
use super::navigator::{Navigator, ROOT_PATH};
use super::storage::KeyValueStorage;

pub const LANDING_PATH: &str = "/landing";
pub const ERROR_PATH: &str = "/error";

const PUBLIC_PATHS: &[&str] = &[
    ROOT_PATH,
    LANDING_PATH,
    ERROR_PATH,
    "/change-password",
    "/confirm-email",
];
const OAUTH_CALLBACK_MARKER: &str = "oauth-callback";

const USER_PREFIXES: &[&str] = &[
    "/articles",
    "/configs",
    "/reports",
    "/sessions",
    "/me",
    "/personal",
    "/market",
];
const MODERATOR_PREFIXES: &[&str] = &["/reports", "/sessions", "/me", "/personal"];
const ADMIN_PREFIXES: &[&str] = &[
    "/users",
    "/prompts",
    "/models",
    "/analytics",
    "/sessions",
    "/me",
    "/personal",
];

const ARTICLE_REPORT_PATTERN: &str = r"(?i)^/articles/([0-9a-f-]+)/report/$";
const ARTICLE_ID_PATTERN: &str =
    r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[1-5][0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}$";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect(String),
}

pub struct RouteGuard {
    storage: Arc<dyn KeyValueStorage>,
    article_report: Regex,
    article_id: Regex,
}

impl RouteGuard {
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Result<Self, ConsoleError> {
        Ok(Self {
            storage,
            article_report: Regex::new(ARTICLE_REPORT_PATTERN)?,
            article_id: Regex::new(ARTICLE_ID_PATTERN)?,
        })
    }

    /// Decide whether `path` may be shown to the current session.
    pub fn check(&self, path: &str) -> GuardDecision {
        if is_public_path(path) {
            return GuardDecision::Allow;
        }

        let Some(cached) = self.storage.get_item(USER_INFO_KEY) else {
            log::error!("[RouteGuard] no cached user info, redirecting {} to root", path);
            return GuardDecision::Redirect(ROOT_PATH.to_string());
        };
        let user: Value = match serde_json::from_str(&cached) {
            Ok(user @ Value::Object(_)) => user,
            Ok(other) => {
                log::error!("[RouteGuard] cached user info is not an object: {}", other);
                return GuardDecision::Redirect(ROOT_PATH.to_string());
            }
            Err(e) => {
                log::error!("[RouteGuard] unreadable cached user info: {}", e);
                return GuardDecision::Redirect(ROOT_PATH.to_string());
            }
        };

        // Roles outside the known set are not restricted here.
        let role = user
            .get("role")
            .and_then(Value::as_str)
            .and_then(Role::from_label);
        match role {
            Some(role) if !self.role_allows(role, path) => {
                log::error!("[RouteGuard] Forbidden: {} {}", role.label(), path);
                GuardDecision::Redirect(ERROR_PATH.to_string())
            }
            _ => GuardDecision::Allow,
        }
    }

    /// Check `path` and move `navigator` to it, or to the redirect target.
    pub fn navigate(&self, navigator: &dyn Navigator, path: &str) -> GuardDecision {
        let decision = self.check(path);
        match &decision {
            GuardDecision::Allow => navigator.navigate(path),
            GuardDecision::Redirect(target) => navigator.navigate(target),
        }
        decision
    }

    pub fn role_allows(&self, role: Role, path: &str) -> bool {
        match role {
            Role::User => starts_with_any(path, USER_PREFIXES),
            Role::Moderator => {
                starts_with_any(path, MODERATOR_PREFIXES) || self.is_article_report(path)
            }
            Role::Admin => starts_with_any(path, ADMIN_PREFIXES),
            Role::Guest => true,
        }
    }

    fn is_article_report(&self, path: &str) -> bool {
        self.article_report
            .captures(path)
            .and_then(|caps| caps.get(1))
            .is_some_and(|id| self.article_id.is_match(id.as_str()))
    }
}

fn is_public_path(path: &str) -> bool {
    PUBLIC_PATHS.contains(&path) || path.contains(OAUTH_CALLBACK_MARKER)
}

fn starts_with_any(path: &str, prefixes: &[&str]) -> bool {
    prefixes.iter().any(|prefix| path.starts_with(prefix))
}
