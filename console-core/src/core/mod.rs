pub mod alert;
pub mod config;
pub mod error;
pub mod event_bus;
pub mod http_client;
pub mod models;
pub mod navigator;
pub mod reference_store;
pub mod retry;
pub mod route_guard;
pub mod storage;
pub mod websocket;

#[cfg(test)]
pub(crate) mod test_support;

pub use alert::{AlertMessage, AlertSeverity};
pub use config::{Config, ALERT_MESSAGE_KEY, USER_INFO_KEY};
pub use error::ConsoleError;
pub use event_bus::{BusEvent, EventBus};
pub use http_client::{ApiClient, FetchOptions};
pub use models::{Language, Model, Prompt, ReportReason, Role, UserInfo};
pub use navigator::{HistoryNavigator, Navigator};
pub use reference_store::{ReferenceStore, ReferenceTables};
pub use retry::Reauthenticator;
pub use route_guard::{GuardDecision, RouteGuard};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage};
pub use websocket::{WebSocketConnector, WsStream};
