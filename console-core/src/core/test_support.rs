//! In-process mock backend and client harness shared by the unit tests.

use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::body::Bytes;
use axum::extract::ws::{Message, WebSocketUpgrade};
use axum::extract::State;
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

use super::alert::AlertMessage;
use super::config::{Config, ALERT_MESSAGE_KEY, API_ADDRESS_VAR};
use super::event_bus::EventBus;
use super::http_client::ApiClient;
use super::navigator::HistoryNavigator;
use super::retry::REFRESH_PATH;
use super::storage::MemoryStorage;

pub const WS_PATH: &str = "/ws/";
pub const REFRESHED_COOKIE: &str = "access_token=fresh";

#[derive(Default)]
struct MockState {
    responses: Mutex<HashMap<String, VecDeque<(u16, Value)>>>,
    hits: Mutex<HashMap<String, usize>>,
    cookies: Mutex<HashMap<String, String>>,
    bodies: Mutex<HashMap<String, String>>,
    content_types: Mutex<HashMap<String, String>>,
    ws_rejections: AtomicUsize,
}

impl MockState {
    fn record(&self, path: &str, headers: &HeaderMap, body: &Bytes) {
        *self.hits.lock().unwrap().entry(path.to_string()).or_default() += 1;
        if let Some(cookie) = headers.get(COOKIE).and_then(|v| v.to_str().ok()) {
            self.cookies
                .lock()
                .unwrap()
                .insert(path.to_string(), cookie.to_string());
        }
        if let Some(ct) = headers
            .get(axum::http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
        {
            self.content_types
                .lock()
                .unwrap()
                .insert(path.to_string(), ct.to_string());
        }
        if !body.is_empty() {
            self.bodies.lock().unwrap().insert(
                path.to_string(),
                String::from_utf8_lossy(body).into_owned(),
            );
        }
    }
}

/// Scripted HTTP + WebSocket backend bound to an ephemeral local port.
///
/// Each path answers with the queued responses in order, then falls back to
/// a default: 200 for the refresh and logout endpoints, 404 otherwise.
pub struct MockBackend {
    addr: SocketAddr,
    state: Arc<MockState>,
}

impl MockBackend {
    pub async fn spawn() -> Self {
        let state = Arc::new(MockState::default());
        let app = Router::new()
            .route(WS_PATH, get(ws_handler))
            .fallback(handle)
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    /// An address nothing listens on.
    pub async fn closed_addr() -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    }

    pub fn base(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base(), path)
    }

    pub fn ws_url(&self, path: &str) -> String {
        format!("ws://{}{}", self.addr, path)
    }

    pub fn respond(&self, path: &str, status: u16, body: Value) {
        self.state
            .responses
            .lock()
            .unwrap()
            .entry(path.to_string())
            .or_default()
            .push_back((status, body));
    }

    pub fn hits(&self, path: &str) -> usize {
        self.state.hits.lock().unwrap().get(path).copied().unwrap_or(0)
    }

    pub fn last_cookie(&self, path: &str) -> Option<String> {
        self.state.cookies.lock().unwrap().get(path).cloned()
    }

    pub fn last_body(&self, path: &str) -> Option<Value> {
        let bodies = self.state.bodies.lock().unwrap();
        bodies.get(path).map(|raw| serde_json::from_str(raw).unwrap())
    }

    pub fn last_content_type(&self, path: &str) -> Option<String> {
        self.state.content_types.lock().unwrap().get(path).cloned()
    }

    /// Refuse the next `times` WebSocket handshakes with 401.
    pub fn reject_websocket(&self, times: usize) {
        self.state.ws_rejections.store(times, Ordering::SeqCst);
    }

    pub fn config(&self) -> Config {
        let base = self.base();
        Config::from_lookup(move |key: &str| (key == API_ADDRESS_VAR).then(|| base.clone())).unwrap()
    }
}

fn default_response(path: &str) -> (u16, Value) {
    match path {
        REFRESH_PATH | "/auth/logout/" => (200, json!({"success": true, "message": "OK"})),
        _ => (404, json!({"success": false, "message": "Not Found"})),
    }
}

async fn handle(
    State(state): State<Arc<MockState>>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri.path().to_string();
    state.record(&path, &headers, &body);

    let queued = state
        .responses
        .lock()
        .unwrap()
        .get_mut(&path)
        .and_then(VecDeque::pop_front);
    let (status, payload) = queued.unwrap_or_else(|| default_response(&path));

    let mut response = (StatusCode::from_u16(status).unwrap(), Json(payload)).into_response();
    if path == REFRESH_PATH {
        response.headers_mut().insert(
            SET_COOKIE,
            HeaderValue::from_static("access_token=fresh; Path=/"),
        );
    }
    response
}

async fn ws_handler(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> Response {
    state.record(WS_PATH, &headers, &Bytes::new());
    let remaining = state.ws_rejections.load(Ordering::SeqCst);
    if remaining > 0 {
        state.ws_rejections.store(remaining - 1, Ordering::SeqCst);
        return StatusCode::UNAUTHORIZED.into_response();
    }
    ws.on_upgrade(|mut socket| async move {
        let _ = socket.send(Message::Text("welcome".into())).await;
    })
}

/// A client wired to a [`MockBackend`], with every alert captured.
pub struct Harness {
    pub client: ApiClient,
    pub bus: Arc<EventBus>,
    pub storage: Arc<MemoryStorage>,
    pub navigator: Arc<HistoryNavigator>,
    alerts: Arc<Mutex<Vec<AlertMessage>>>,
}

impl Harness {
    pub fn new(backend: &MockBackend) -> Self {
        let bus = Arc::new(EventBus::new());
        let alerts = Arc::new(Mutex::new(Vec::new()));
        let sink = alerts.clone();
        bus.on(ALERT_MESSAGE_KEY, move |alert: &AlertMessage| {
            sink.lock().unwrap().push(alert.clone());
        });

        let storage = Arc::new(MemoryStorage::new());
        let navigator = Arc::new(HistoryNavigator::starting_at("/sessions"));
        let client = ApiClient::new(
            Arc::new(backend.config()),
            bus.clone(),
            storage.clone(),
            navigator.clone(),
        )
        .unwrap();

        Self {
            client,
            bus,
            storage,
            navigator,
            alerts,
        }
    }

    pub fn alerts(&self) -> Vec<AlertMessage> {
        self.alerts.lock().unwrap().clone()
    }
}
