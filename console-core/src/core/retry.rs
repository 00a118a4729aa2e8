//! One-shot reauthenticate-and-retry policy.
//!
//! Shared by the REST wrapper (retry on HTTP 401) and the WebSocket
//! connector (retry on a failed handshake). An attempt is repeated at most
//! once, after a single call to the session refresh endpoint.

use std::future::Future;

pub const REFRESH_PATH: &str = "/auth/refresh/";

#[derive(Clone)]
pub struct Reauthenticator {
    client: reqwest::Client,
    refresh_url: String,
}

impl Reauthenticator {
    pub fn new(client: reqwest::Client, refresh_url: String) -> Self {
        Self {
            client,
            refresh_url,
        }
    }

    pub fn refresh_url(&self) -> &str {
        &self.refresh_url
    }

    /// Ask the backend for fresh session cookies. The outcome is only
    /// logged: whether the refresh worked shows in the retried attempt.
    pub async fn refresh(&self) {
        match self.client.post(&self.refresh_url).send().await {
            Ok(resp) if resp.status().is_success() => {
                log::info!("[Reauthenticator] session refreshed");
            }
            Ok(resp) => {
                log::warn!(
                    "[Reauthenticator] refresh rejected: HTTP {}",
                    resp.status().as_u16()
                );
            }
            Err(e) => {
                log::error!("[Reauthenticator] refresh request failed: {}", e);
            }
        }
    }

    /// Run `attempt`; if `should_retry` accepts its outcome, refresh the
    /// session and return the outcome of exactly one more attempt.
    pub async fn retry_once<T, F, Fut, P>(&self, mut attempt: F, should_retry: P) -> T
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = T>,
        P: Fn(&T) -> bool,
    {
        let first = attempt().await;
        if !should_retry(&first) {
            return first;
        }
        self.refresh().await;
        attempt().await
    }
}
