//! Authenticated REST wrapper for the translation platform backend.
//!
//! Every console request goes through [`ApiClient::fetch_data`], which
//! owns the session-expiry policy (one refresh, one retry, then forced
//! logout) and turns failed responses into alerts, errors, or an empty
//! result depending on the caller's [`FetchOptions`].

use std::sync::Arc;

use reqwest::cookie::Jar;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde_json::Value;

use super::alert::AlertMessage;
use super::config::{Config, ALERT_MESSAGE_KEY, USER_INFO_KEY};
use super::error::ConsoleError;
use super::event_bus::EventBus;
use super::navigator::{Navigator, ROOT_PATH};
use super::retry::{Reauthenticator, REFRESH_PATH};
use super::storage::KeyValueStorage;
use super::websocket::WebSocketConnector;

pub const VALIDATION_ERROR_PREFIX: &str = "Ошибка валидации";
pub const PAYLOAD_TOO_LARGE_TEXT: &str = "Превышен максимально допустимый размер";

/// How a failed request is reported back to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOptions {
    /// Publish an error alert on the event bus.
    pub alert_on_error: bool,
    /// Return `ConsoleError::Api` instead of an empty result.
    pub throw_on_error: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            alert_on_error: true,
            throw_on_error: false,
        }
    }
}

impl FetchOptions {
    pub fn silent() -> Self {
        Self {
            alert_on_error: false,
            throw_on_error: false,
        }
    }

    pub fn throwing() -> Self {
        Self {
            alert_on_error: true,
            throw_on_error: true,
        }
    }
}

/// Error payload returned by the backend on non-2xx responses.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    errors: Vec<ValidationIssue>,
}

#[derive(Debug, Deserialize)]
struct ValidationIssue {
    #[serde(default)]
    loc: Vec<Value>,
    #[serde(default)]
    msg: String,
}

impl ValidationIssue {
    fn location(&self) -> String {
        self.loc
            .iter()
            .map(|part| match part {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

pub struct ApiClient {
    http: reqwest::Client,
    cookies: Arc<Jar>,
    config: Arc<Config>,
    bus: Arc<EventBus>,
    storage: Arc<dyn KeyValueStorage>,
    navigator: Arc<dyn Navigator>,
    reauth: Reauthenticator,
}

impl ApiClient {
    pub fn new(
        config: Arc<Config>,
        bus: Arc<EventBus>,
        storage: Arc<dyn KeyValueStorage>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, ConsoleError> {
        let cookies = Arc::new(Jar::default());
        let http = reqwest::Client::builder()
            .cookie_provider(cookies.clone())
            .build()?;
        let reauth = Reauthenticator::new(http.clone(), config.api_url(REFRESH_PATH));

        Ok(Self {
            http,
            cookies,
            config,
            bus,
            storage,
            navigator,
            reauth,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    pub fn storage(&self) -> &dyn KeyValueStorage {
        self.storage.as_ref()
    }

    pub fn navigator(&self) -> &dyn Navigator {
        self.navigator.as_ref()
    }

    /// Connector sharing this client's session cookies and refresh policy.
    pub fn websocket_connector(&self) -> WebSocketConnector {
        WebSocketConnector::new(self.cookies.clone(), self.reauth.clone(), self.bus.clone())
    }

    /// GET `address` with default options.
    pub async fn get(&self, address: &str) -> Result<Option<Value>, ConsoleError> {
        self.fetch_data(address, Method::GET, None, FetchOptions::default())
            .await
    }

    /// Perform a JSON request against `address`.
    ///
    /// Returns the parsed body on success (`Value::Null` when the body is
    /// empty) and `Ok(None)` when the request failed without
    /// `throw_on_error`, or when the session could not be refreshed.
    /// Transport failures are returned as [`ConsoleError::Http`].
    pub async fn fetch_data(
        &self,
        address: &str,
        method: Method,
        body: Option<&Value>,
        options: FetchOptions,
    ) -> Result<Option<Value>, ConsoleError> {
        let verb = method.clone();
        let response = self
            .reauth
            .retry_once(
                move || self.send(address, method.clone(), body),
                |outcome: &Result<reqwest::Response, reqwest::Error>| {
                    matches!(outcome, Ok(resp) if resp.status() == StatusCode::UNAUTHORIZED)
                },
            )
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            log::warn!(
                "[ApiClient] {} {} still unauthorized after refresh, ending session",
                verb,
                address
            );
            self.end_session()?;
            return Ok(None);
        }

        if !status.is_success() {
            let raw = response.text().await.unwrap_or_default();
            let error: ErrorBody = serde_json::from_str(&raw).unwrap_or_default();
            let message = error
                .message
                .clone()
                .unwrap_or_else(|| reason_phrase(status).to_string());
            log::warn!(
                "[ApiClient] {} {} failed: HTTP {} - {}",
                verb,
                address,
                status.as_u16(),
                message
            );

            if options.alert_on_error {
                self.bus
                    .emit(ALERT_MESSAGE_KEY, &error_alert(status, &error, &message));
            }
            if options.throw_on_error {
                return Err(ConsoleError::Api(message));
            }
            return Ok(None);
        }

        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(Some(Value::Null));
        }
        Ok(Some(serde_json::from_str(&text)?))
    }

    /// Drop the cached profile and return to the root page.
    pub fn end_session(&self) -> Result<(), ConsoleError> {
        self.storage.remove_item(USER_INFO_KEY)?;
        self.navigator.navigate(ROOT_PATH);
        Ok(())
    }

    async fn send(
        &self,
        address: &str,
        method: Method,
        body: Option<&Value>,
    ) -> Result<reqwest::Response, reqwest::Error> {
        let mut request = self
            .http
            .request(method, address)
            .header(CONTENT_TYPE, "application/json");
        if let Some(body) = body {
            request = request.body(body.to_string());
        }
        request.send().await
    }
}

fn reason_phrase(status: StatusCode) -> &'static str {
    status.canonical_reason().unwrap_or("")
}

fn error_alert(status: StatusCode, error: &ErrorBody, message: &str) -> AlertMessage {
    let title = format!("{} {}", status.as_u16(), reason_phrase(status))
        .trim_end()
        .to_string();
    let text = match status {
        StatusCode::UNPROCESSABLE_ENTITY => match error.errors.first() {
            Some(issue) => format!(
                "{}: {}. {}",
                VALIDATION_ERROR_PREFIX,
                issue.location(),
                issue.msg
            ),
            None => message.to_string(),
        },
        StatusCode::PAYLOAD_TOO_LARGE => PAYLOAD_TOO_LARGE_TEXT.to_string(),
        _ => message.to_string(),
    };
    AlertMessage::error(title, text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::alert::AlertSeverity;
    use crate::core::navigator::HistoryNavigator;
    use crate::core::storage::MemoryStorage;
    use crate::core::test_support::{Harness, MockBackend, REFRESHED_COOKIE};
    use serde_json::json;

    #[tokio::test]
    async fn success_returns_parsed_body() {
        let backend = MockBackend::spawn().await;
        backend.respond("/articles/", 200, json!({"data": {"items": [1, 2]}}));
        let h = Harness::new(&backend);

        let body = h.client.get(&backend.url("/articles/")).await.unwrap();

        assert_eq!(body, Some(json!({"data": {"items": [1, 2]}})));
        assert_eq!(backend.hits("/articles/"), 1);
        assert_eq!(backend.hits(REFRESH_PATH), 0);
        assert!(h.alerts().is_empty());
    }

    #[tokio::test]
    async fn sends_json_body_with_content_type() {
        let backend = MockBackend::spawn().await;
        backend.respond("/configs/", 201, json!({"data": {"config": {"id": 9}}}));
        let h = Harness::new(&backend);
        let payload = json!({"name": "default", "language_id": 2});

        let body = h
            .client
            .fetch_data(
                &backend.url("/configs/"),
                Method::POST,
                Some(&payload),
                FetchOptions::default(),
            )
            .await
            .unwrap();

        assert_eq!(body.unwrap()["data"]["config"]["id"], 9);
        assert_eq!(backend.last_body("/configs/"), Some(payload));
        assert_eq!(
            backend.last_content_type("/configs/").as_deref(),
            Some("application/json")
        );
    }

    #[tokio::test]
    async fn unauthorized_then_ok_refreshes_once_and_returns_retry_body() {
        let backend = MockBackend::spawn().await;
        backend.respond("/users/", 401, json!({"message": "expired"}));
        backend.respond("/users/", 200, json!({"data": {"items": ["second"]}}));
        let h = Harness::new(&backend);

        let body = h.client.get(&backend.url("/users/")).await.unwrap();

        assert_eq!(body, Some(json!({"data": {"items": ["second"]}})));
        assert_eq!(backend.hits(REFRESH_PATH), 1);
        assert_eq!(backend.hits("/users/"), 2);
        assert_eq!(
            backend.last_cookie("/users/").as_deref(),
            Some(REFRESHED_COOKIE)
        );
        assert!(h.alerts().is_empty());
    }

    #[tokio::test]
    async fn unauthorized_twice_ends_session() {
        let backend = MockBackend::spawn().await;
        backend.respond("/users/", 401, json!({"message": "expired"}));
        backend.respond("/users/", 401, json!({"message": "expired"}));
        let h = Harness::new(&backend);
        h.storage
            .set_item(USER_INFO_KEY, r#"{"role":"Администратор"}"#)
            .unwrap();

        let body = h.client.get(&backend.url("/users/")).await.unwrap();

        assert_eq!(body, None);
        assert_eq!(backend.hits(REFRESH_PATH), 1);
        assert_eq!(backend.hits("/users/"), 2);
        assert_eq!(h.storage.get_item(USER_INFO_KEY), None);
        assert_eq!(h.navigator.current_path(), "/");
        assert!(h.alerts().is_empty());
    }

    #[tokio::test]
    async fn validation_error_alert_names_location_and_message() {
        let backend = MockBackend::spawn().await;
        backend.respond(
            "/auth/register/",
            422,
            json!({"errors": [{"loc": ["body", "email"], "msg": "invalid"}]}),
        );
        let h = Harness::new(&backend);

        let body = h
            .client
            .fetch_data(
                &backend.url("/auth/register/"),
                Method::POST,
                Some(&json!({"email": "nope"})),
                FetchOptions::default(),
            )
            .await
            .unwrap();

        assert_eq!(body, None);
        let alerts = h.alerts();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].severity, AlertSeverity::Error);
        assert_eq!(alerts[0].title.as_deref(), Some("422 Unprocessable Entity"));
        assert_eq!(
            alerts[0].text.as_deref(),
            Some("Ошибка валидации: body, email. invalid")
        );
    }

    #[tokio::test]
    async fn numeric_locations_are_joined_too() {
        let backend = MockBackend::spawn().await;
        backend.respond(
            "/prompts/",
            422,
            json!({"errors": [{"loc": ["body", "items", 0], "msg": "required"}]}),
        );
        let h = Harness::new(&backend);

        h.client.get(&backend.url("/prompts/")).await.unwrap();

        assert_eq!(
            h.alerts()[0].text.as_deref(),
            Some("Ошибка валидации: body, items, 0. required")
        );
    }

    #[tokio::test]
    async fn payload_too_large_uses_fixed_text() {
        let backend = MockBackend::spawn().await;
        backend.respond("/articles/upload/", 413, json!({"message": "whatever the server says"}));
        let h = Harness::new(&backend);

        h.client.get(&backend.url("/articles/upload/")).await.unwrap();

        let alerts = h.alerts();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].text.as_deref(), Some(PAYLOAD_TOO_LARGE_TEXT));
        assert_eq!(alerts[0].severity, AlertSeverity::Error);
    }

    #[tokio::test]
    async fn generic_failure_alerts_server_message() {
        let backend = MockBackend::spawn().await;
        backend.respond("/models/", 400, json!({"message": "Модель уже существует"}));
        let h = Harness::new(&backend);

        let body = h.client.get(&backend.url("/models/")).await.unwrap();

        assert_eq!(body, None);
        let alerts = h.alerts();
        assert_eq!(alerts[0].title.as_deref(), Some("400 Bad Request"));
        assert_eq!(alerts[0].text.as_deref(), Some("Модель уже существует"));
    }

    #[tokio::test]
    async fn throw_on_error_returns_server_message() {
        let backend = MockBackend::spawn().await;
        backend.respond("/models/", 409, json!({"message": "conflict here"}));
        let h = Harness::new(&backend);

        let err = h
            .client
            .fetch_data(
                &backend.url("/models/"),
                Method::DELETE,
                None,
                FetchOptions::throwing(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ConsoleError::Api(ref m) if m == "conflict here"));
        assert_eq!(h.alerts().len(), 1);
    }

    #[tokio::test]
    async fn silent_failure_publishes_nothing() {
        let backend = MockBackend::spawn().await;
        backend.respond("/users/me/", 500, json!({"message": "boom"}));
        let h = Harness::new(&backend);

        let body = h
            .client
            .fetch_data(
                &backend.url("/users/me/"),
                Method::GET,
                None,
                FetchOptions::silent(),
            )
            .await
            .unwrap();

        assert_eq!(body, None);
        assert!(h.alerts().is_empty());
    }

    #[tokio::test]
    async fn non_json_error_body_falls_back_to_reason() {
        let backend = MockBackend::spawn().await;
        backend.respond("/analytics/", 503, Value::String("down".into()));
        let h = Harness::new(&backend);

        h.client.get(&backend.url("/analytics/")).await.unwrap();

        let alerts = h.alerts();
        assert_eq!(alerts[0].title.as_deref(), Some("503 Service Unavailable"));
        assert_eq!(alerts[0].text.as_deref(), Some("Service Unavailable"));
    }

    #[tokio::test]
    async fn transport_failure_is_an_http_error() {
        let addr = MockBackend::closed_addr().await;
        let config = Config::from_lookup(|key| {
            (key == crate::core::config::API_ADDRESS_VAR).then(|| format!("http://{}", addr))
        })
        .unwrap();
        let client = ApiClient::new(
            Arc::new(config),
            Arc::new(EventBus::new()),
            Arc::new(MemoryStorage::new()),
            Arc::new(HistoryNavigator::new()),
        )
        .unwrap();

        let err = client
            .get(&format!("http://{}/users/me/", addr))
            .await
            .unwrap_err();

        assert!(matches!(err, ConsoleError::Http(_)));
    }
}
