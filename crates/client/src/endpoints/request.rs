//! Request helper shared by every endpoint.
//!
//! Sends a single request and turns non-2xx responses into
//! [`ClientError::ApiError`]. Retrying is left to the caller.

use reqwest::{RequestBuilder, Response};
use tracing::debug;

use crate::error::{ClientError, Result};

/// Upper bound on how much of an error body is kept in the error message.
const MAX_ERROR_BODY_CHARS: usize = 512;

/// Sends an HTTP request and checks its status.
///
/// # Errors
///
/// Returns `ClientError::HttpError` for transport failures and
/// `ClientError::ApiError` for any non-2xx status.
pub async fn send_request(builder: RequestBuilder) -> Result<Response> {
    let response = builder.send().await?;

    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status().as_u16();
    let url = response.url().to_string();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Could not read error response body".to_string());
    debug!(status, url = %url, "Config authority returned an error status");

    let message = match serde_json::from_str::<serde_json::Value>(&body) {
        Ok(json) => json
            .get("message")
            .and_then(|m| m.as_str())
            .map(str::to_string)
            .unwrap_or(body),
        Err(_) => body,
    };

    Err(ClientError::ApiError {
        status,
        url,
        message: message.chars().take(MAX_ERROR_BODY_CHARS).collect(),
    })
}
