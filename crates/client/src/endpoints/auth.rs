//! Authentication endpoints.

use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::auth::AuthoritySession;
use crate::endpoints::send_request;
use crate::error::{ClientError, Result};
use crate::models::{ClientLoginRequest, ClientLoginResponse};

/// Exchange client credentials for a session.
///
/// # Errors
///
/// Returns `ClientError::AuthFailed` when the authority rejects the
/// credentials, and `ClientError::InvalidResponse` when the response has no
/// usable token.
pub async fn client_login(
    client: &Client,
    base_url: &str,
    client_id: &str,
    client_secret: &SecretString,
) -> Result<AuthoritySession> {
    debug!(client_id, "Logging in to config authority");

    let url = format!("{}/auth/client-login", base_url);
    let builder = client.post(&url).json(&ClientLoginRequest {
        client_id,
        client_secret: client_secret.expose_secret(),
    });

    let response = send_request(builder).await.map_err(|e| match e {
        ClientError::ApiError {
            status, message, ..
        } => ClientError::AuthFailed(format!("client login returned {status}: {message}")),
        other => other,
    })?;

    let body: ClientLoginResponse = response
        .json()
        .await
        .map_err(|e| ClientError::InvalidResponse(format!("client login response: {e}")))?;

    if body.access_token.trim().is_empty() || body.token_type.trim().is_empty() {
        return Err(ClientError::InvalidResponse(
            "client login response has an empty token".to_string(),
        ));
    }

    Ok(AuthoritySession::new(
        body.token_type,
        SecretString::new(body.access_token.into()),
    ))
}
