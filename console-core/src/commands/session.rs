//! Sign-in, sign-out and profile caching.

use reqwest::Method;
use serde_json::json;

use crate::core::config::USER_INFO_KEY;
use crate::core::error::ConsoleError;
use crate::core::http_client::{ApiClient, FetchOptions};
use crate::core::models::UserInfo;
use crate::core::storage::KeyValueStorage;

pub const LOGIN_PATH: &str = "/auth/login/";
pub const LOGOUT_PATH: &str = "/auth/logout/";
pub const PERSONAL_INFO_PATH: &str = "/users/me/";

/// End the session on the server, then locally.
///
/// The local part (dropping the cached profile and returning to the root
/// page) happens whatever the logout request returned.
pub async fn logout(client: &ApiClient) -> Result<(), ConsoleError> {
    let url = client.config().api_url(LOGOUT_PATH);
    if let Err(e) = client.get(&url).await {
        log::warn!("[Session] logout request failed: {}", e);
    }
    client.end_session()?;
    log::info!("[Session] logged out");
    Ok(())
}

/// Fetch the signed-in user's profile and cache it.
///
/// Returns `false` when the profile could not be fetched, after logging out
/// if `auto_logout` is set.
pub async fn fetch_personal_info(
    client: &ApiClient,
    auto_logout: bool,
) -> Result<bool, ConsoleError> {
    let url = client.config().api_url(PERSONAL_INFO_PATH);
    let user = match client
        .fetch_data(&url, Method::GET, None, FetchOptions::silent())
        .await
    {
        Ok(Some(body)) => body
            .get("data")
            .and_then(|data| data.get("user"))
            .filter(|user| user.is_object())
            .cloned(),
        Ok(None) => None,
        Err(e) => {
            log::warn!("[Session] profile request failed: {}", e);
            None
        }
    };

    let Some(user) = user else {
        if auto_logout {
            logout(client).await?;
        }
        return Ok(false);
    };

    client
        .storage()
        .set_item(USER_INFO_KEY, &serde_json::to_string(&user)?)?;
    Ok(true)
}

/// Sign in with email and password, then cache the profile.
pub async fn login(client: &ApiClient, email: &str, password: &str) -> Result<bool, ConsoleError> {
    let url = client.config().api_url(LOGIN_PATH);
    let credentials = json!({ "email": email, "password": password });
    let response = client
        .fetch_data(&url, Method::POST, Some(&credentials), FetchOptions::default())
        .await?;
    if response.is_none() {
        return Ok(false);
    }
    fetch_personal_info(client, false).await
}

/// Typed view of the cached profile, if any.
pub fn cached_user_info(storage: &dyn KeyValueStorage) -> Option<UserInfo> {
    let raw = storage.get_item(USER_INFO_KEY)?;
    match serde_json::from_str(&raw) {
        Ok(info) => Some(info),
        Err(e) => {
            log::warn!("[Session] cached user info is unreadable: {}", e);
            None
        }
    }
}
