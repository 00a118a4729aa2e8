//! Named-channel publish/subscribe registry for console notifications.
//!
//! Handlers registered with [`EventBus::on`] run synchronously inside
//! [`EventBus::emit`], in registration order. Async consumers can also
//! [`EventBus::subscribe`] to a broadcast channel that receives every
//! emitted event regardless of its name.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::broadcast;

use super::alert::AlertMessage;

type Handler<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// A single event carried through the bus.
#[derive(Clone, Debug)]
pub struct BusEvent<T> {
    pub event: String,
    pub payload: T,
}

/// Registry of handlers keyed by event name, plus a broadcast fan-out.
pub struct EventBus<T: Clone = AlertMessage> {
    handlers: RwLock<HashMap<String, Vec<Handler<T>>>>,
    sender: broadcast::Sender<BusEvent<T>>,
}

impl<T: Clone> EventBus<T> {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(1024);
        Self {
            handlers: RwLock::new(HashMap::new()),
            sender,
        }
    }

    /// Register `handler` for every future `emit` of `event`.
    pub fn on<F>(&self, event: &str, handler: F)
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let mut handlers = self.handlers.write().unwrap_or_else(PoisonError::into_inner);
        handlers
            .entry(event.to_string())
            .or_default()
            .push(Arc::new(handler));
    }

    /// Invoke the handlers registered for `event`, then forward the event to
    /// broadcast subscribers. A name nobody registered is a no-op.
    pub fn emit(&self, event: &str, payload: &T) {
        // Snapshot so a handler may call `on` without deadlocking.
        let snapshot: Vec<Handler<T>> = {
            let handlers = self.handlers.read().unwrap_or_else(PoisonError::into_inner);
            handlers.get(event).cloned().unwrap_or_default()
        };
        for handler in &snapshot {
            handler(payload);
        }
        let _ = self.sender.send(BusEvent {
            event: event.to_string(),
            payload: payload.clone(),
        });
    }

    /// Create a new receiver that will get all future events.
    pub fn subscribe(&self) -> broadcast::Receiver<BusEvent<T>> {
        self.sender.subscribe()
    }

    pub fn handler_count(&self, event: &str) -> usize {
        let handlers = self.handlers.read().unwrap_or_else(PoisonError::into_inner);
        handlers.get(event).map_or(0, Vec::len)
    }
}

impl<T: Clone> Default for EventBus<T> {
    fn default() -> Self {
        Self::new()
    }
}
