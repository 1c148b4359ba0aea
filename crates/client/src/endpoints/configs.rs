//! Configuration entry endpoints.

use reqwest::Client;
use reqwest::header::AUTHORIZATION;
use tracing::debug;

use crate::endpoints::send_request;
use crate::error::{ClientError, Result};
use crate::models::ConfigEntry;

/// Fetch the ordered configuration entries.
///
/// `environment` selects `/configs/{environment}`; without it the shared
/// `/configs` collection is fetched. `authorization` is the full header value.
pub async fn fetch_configs(
    client: &Client,
    base_url: &str,
    environment: Option<&str>,
    authorization: &str,
) -> Result<Vec<ConfigEntry>> {
    let url = match environment {
        Some(env) => format!("{}/configs/{}", base_url, env),
        None => format!("{}/configs", base_url),
    };
    debug!(url = %url, "Fetching configuration entries");

    let builder = client.get(&url).header(AUTHORIZATION, authorization);
    let response = send_request(builder).await?;

    let entries: Vec<ConfigEntry> = response
        .json()
        .await
        .map_err(|e| ClientError::InvalidResponse(format!("config entries: {e}")))?;

    debug!(entries = entries.len(), "Fetched configuration entries");
    Ok(entries)
}
