//! Config authority client.
//!
//! This module provides the [`ConfigAuthorityClient`] used to fetch the
//! ordered configuration entries of a service.
//!
//! # Submodules
//! - [`builder`]: Client construction and configuration
//!
//! # What this module does NOT handle:
//! - Direct HTTP request implementation (delegated to [`crate::endpoints`])
//! - Retrying failed fetches (the sync orchestrator owns the retry policy)
//! - Decrypting entry values (see `confsync_config::CredentialStore`)
//!
//! # Invariants
//! - Client-credential sessions are created per fetch cycle and never cached
//! - The client holds no state between calls apart from its connection pool

pub mod builder;

use std::time::Duration;

use tracing::debug;

use crate::auth::{AuthStrategy, bearer_header};
use crate::endpoints;
use crate::error::Result;
use crate::models::ConfigEntry;

/// Config authority REST client.
///
/// # Creating a Client
///
/// ```rust,ignore
/// use confsync_client::{AuthStrategy, ConfigAuthorityClient};
/// use secrecy::SecretString;
///
/// let client = ConfigAuthorityClient::builder()
///     .base_url("https://config.example.com".to_string())
///     .auth_strategy(AuthStrategy::SharedSecret {
///         key: SecretString::new("shared-secret".to_string().into()),
///     })
///     .build()?;
/// let entries = client.fetch_entries().await?;
/// ```
#[derive(Debug)]
pub struct ConfigAuthorityClient {
    pub(crate) http: reqwest::Client,
    pub(crate) base_url: String,
    pub(crate) auth: AuthStrategy,
    pub(crate) timeout: Duration,
}

impl ConfigAuthorityClient {
    /// Create a new client builder.
    pub fn builder() -> builder::ConfigAuthorityClientBuilder {
        builder::ConfigAuthorityClientBuilder::new()
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the authentication strategy.
    pub fn auth_strategy(&self) -> &AuthStrategy {
        &self.auth
    }

    /// Authenticate (when needed) and fetch the configuration entries.
    ///
    /// # Errors
    ///
    /// Returns a [`crate::ClientError`] for login failures, transport
    /// failures, non-2xx responses, and unparseable bodies. A request that
    /// exceeds the client timeout is reported as [`crate::ClientError::Timeout`].
    pub async fn fetch_entries(&self) -> Result<Vec<ConfigEntry>> {
        self.fetch_once()
            .await
            .map_err(|e| e.timed_out_after(self.timeout))
    }

    async fn fetch_once(&self) -> Result<Vec<ConfigEntry>> {
        match &self.auth {
            AuthStrategy::SharedSecret { key } => {
                endpoints::fetch_configs(&self.http, &self.base_url, None, &bearer_header(key))
                    .await
            }
            AuthStrategy::ClientCredentials {
                client_id,
                client_secret,
                environment,
            } => {
                let session =
                    endpoints::client_login(&self.http, &self.base_url, client_id, client_secret)
                        .await?;
                debug!(
                    token_type = session.token_type(),
                    environment = %environment,
                    "Config authority session established"
                );
                endpoints::fetch_configs(
                    &self.http,
                    &self.base_url,
                    Some(environment.as_str()),
                    &session.authorization_header(),
                )
                .await
            }
        }
    }
}
