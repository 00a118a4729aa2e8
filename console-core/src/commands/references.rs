//! Loading of the reference lookup tables.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::commands::session::cached_user_info;
use crate::core::error::ConsoleError;
use crate::core::http_client::ApiClient;
use crate::core::reference_store::ReferenceStore;

pub const LANGUAGES_PATH: &str = "/languages/";
pub const MODELS_PATH: &str = "/models/";
pub const PROMPTS_PATH: &str = "/prompts/public/";
pub const REPORT_REASONS_PATH: &str = "/report-reasons/";

/// Fetch every reference table and replace the ones that loaded.
///
/// A table whose request fails, or whose rows cannot be decoded, keeps its
/// previous contents. The cached profile's balance is copied into the store.
/// Returns how many tables were replaced.
pub async fn load_reference_tables(
    client: &ApiClient,
    store: &ReferenceStore,
) -> Result<usize, ConsoleError> {
    let mut loaded = 0;

    if let Some(items) = fetch_list(client, LANGUAGES_PATH).await? {
        store.replace_languages(items).await;
        loaded += 1;
    }
    if let Some(items) = fetch_list(client, MODELS_PATH).await? {
        store.replace_models(items).await;
        loaded += 1;
    }
    if let Some(items) = fetch_list(client, PROMPTS_PATH).await? {
        store.replace_prompts(items).await;
        loaded += 1;
    }
    if let Some(items) = fetch_list(client, REPORT_REASONS_PATH).await? {
        store.replace_report_reasons(items).await;
        loaded += 1;
    }

    if let Some(info) = cached_user_info(client.storage()) {
        store.set_balance(info.balance).await;
    }

    log::info!("[References] loaded {} of 4 tables", loaded);
    Ok(loaded)
}

async fn fetch_list<T: DeserializeOwned>(
    client: &ApiClient,
    path: &str,
) -> Result<Option<Vec<T>>, ConsoleError> {
    let url = client.config().api_url(path);
    let Some(body) = client.get(&url).await? else {
        return Ok(None);
    };
    match list_payload(&body) {
        Some(items) => match serde_json::from_value(items.clone()) {
            Ok(rows) => Ok(Some(rows)),
            Err(e) => {
                log::warn!("[References] {} payload unreadable: {}", path, e);
                Ok(None)
            }
        },
        None => {
            log::warn!("[References] {} returned no list payload", path);
            Ok(None)
        }
    }
}

/// List responses carry their rows at `data.items`; a bare `data` array is
/// accepted as well.
fn list_payload(body: &Value) -> Option<&Value> {
    let data = body.get("data")?;
    match data.get("items") {
        Some(items) if items.is_array() => Some(items),
        _ if data.is_array() => Some(data),
        _ => None,
    }
}
