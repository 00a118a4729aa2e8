//! Data types exchanged with the translation platform backend.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Permission tier of a console session.
///
/// The backend serializes roles by their localized labels, so the cached
/// profile carries e.g. `"role": "Модератор"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Guest,
    User,
    Moderator,
    Admin,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Guest, Role::User, Role::Moderator, Role::Admin];

    pub fn label(self) -> &'static str {
        match self {
            Role::Guest => "Гость",
            Role::User => "Пользователь",
            Role::Moderator => "Модератор",
            Role::Admin => "Администратор",
        }
    }

    pub fn from_label(label: &str) -> Option<Role> {
        Self::ALL.into_iter().find(|role| role.label() == label)
    }
}

/// Typed view of the cached profile. Missing fields fall back to defaults so
/// partial payloads still deserialize.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    #[serde(default)]
    pub id: Option<Uuid>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub email_verified: bool,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub balance: i64,
}

impl UserInfo {
    pub fn role(&self) -> Option<Role> {
        self.role.as_deref().and_then(Role::from_label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub iso_code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    pub id: i64,
    pub show_name: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub provider: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prompt {
    pub id: i64,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportReason {
    pub id: i64,
    pub text: String,
}
