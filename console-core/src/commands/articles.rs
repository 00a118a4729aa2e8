//! Article lookups.

use serde_json::Value;

use crate::core::error::ConsoleError;
use crate::core::http_client::ApiClient;

/// Fetch one article; `None` when the request failed (an alert has already
/// been published) or the payload carries no article.
pub async fn get_article(client: &ApiClient, article_id: &str) -> Result<Option<Value>, ConsoleError> {
    let url = client
        .config()
        .api_url(&format!("/articles/{}/", article_id));
    let response = client.get(&url).await?;
    Ok(response.and_then(|body| body.get("data")?.get("article").cloned()))
}
