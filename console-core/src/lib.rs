//! Client core of the translation platform admin console.
//!
//! [`core`] holds the infrastructure (configuration, event bus, storage,
//! navigation, the authenticated REST wrapper, the WebSocket connector and
//! the route guard); [`commands`] holds the console operations built on it.

pub mod commands;
pub mod core;

pub use crate::core::{
    AlertMessage, AlertSeverity, ApiClient, Config, ConsoleError, EventBus, FetchOptions,
    FileStorage, GuardDecision, HistoryNavigator, KeyValueStorage, MemoryStorage, Navigator,
    ReferenceStore, RouteGuard, ALERT_MESSAGE_KEY, USER_INFO_KEY,
};
