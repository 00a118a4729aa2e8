//! Best-effort WebSocket connector.
//!
//! A failed handshake is retried once after a session refresh; a second
//! failure is reported as a warning alert. There is no reconnection,
//! backoff, or keep-alive.

use std::sync::Arc;

use reqwest::cookie::{CookieStore, Jar};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::COOKIE;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use super::alert::AlertMessage;
use super::config::ALERT_MESSAGE_KEY;
use super::error::ConsoleError;
use super::event_bus::EventBus;
use super::retry::Reauthenticator;

pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

pub const SERVER_UNREACHABLE_TITLE: &str = "WebSocket сервер недоступен";

#[derive(Clone)]
pub struct WebSocketConnector {
    cookies: Arc<Jar>,
    reauth: Reauthenticator,
    bus: Arc<EventBus>,
}

impl WebSocketConnector {
    pub fn new(cookies: Arc<Jar>, reauth: Reauthenticator, bus: Arc<EventBus>) -> Self {
        Self {
            cookies,
            reauth,
            bus,
        }
    }

    /// Open a socket at `url`, refreshing the session and trying once more
    /// if the first handshake fails. Returns `None` (after a warning alert)
    /// when both attempts fail.
    pub async fn get_websocket(&self, url: &str) -> Option<WsStream> {
        let outcome = self
            .reauth
            .retry_once(
                move || self.connect(url),
                |outcome: &Result<WsStream, ConsoleError>| outcome.is_err(),
            )
            .await;

        match outcome {
            Ok(stream) => Some(stream),
            Err(e) => {
                log::error!("[WebSocket] {} unreachable after refresh: {}", url, e);
                self.bus.emit(
                    ALERT_MESSAGE_KEY,
                    &AlertMessage::warning(SERVER_UNREACHABLE_TITLE),
                );
                None
            }
        }
    }

    async fn connect(&self, url: &str) -> Result<WsStream, ConsoleError> {
        let mut request = url
            .into_client_request()
            .map_err(|e| ConsoleError::WebSocket(e.to_string()))?;
        if let Some(cookie) = self.session_cookie(url) {
            request.headers_mut().insert(COOKIE, cookie);
        }

        match connect_async(request).await {
            Ok((stream, _response)) => {
                log::info!("[WebSocket] connected to {}", url);
                Ok(stream)
            }
            Err(e) => {
                log::warn!("[WebSocket] connection to {} failed: {}", url, e);
                Err(ConsoleError::WebSocket(e.to_string()))
            }
        }
    }

    /// Cookies the HTTP client holds for the equivalent http(s) origin.
    fn session_cookie(&self, url: &str) -> Option<HeaderValue> {
        let http_url = if let Some(rest) = url.strip_prefix("wss://") {
            format!("https://{}", rest)
        } else if let Some(rest) = url.strip_prefix("ws://") {
            format!("http://{}", rest)
        } else {
            url.to_string()
        };
        let parsed = reqwest::Url::parse(&http_url).ok()?;
        self.cookies.cookies(&parsed)
    }
}
