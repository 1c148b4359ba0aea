//! Resolved synchronization settings.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use super::auth::AuthStrategy;
use super::broker::BrokerSettings;
use crate::encryption::CredentialStore;

/// Outcome of configuration loading.
#[derive(Debug, Clone)]
pub enum SyncMode {
    /// No recognized variable was set; the instance runs with its local configuration.
    Disabled,
    /// Every required variable was present and valid.
    Enabled(Box<SyncSettings>),
}

impl SyncMode {
    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::Enabled(_))
    }
}

/// Everything an enabled instance needs to synchronize its configuration.
#[derive(Debug, Clone)]
pub struct SyncSettings {
    /// Config authority base URL, without trailing slashes.
    pub base_url: String,
    pub auth: AuthStrategy,
    /// Parsed private key for encrypted values.
    pub credentials: Arc<CredentialStore>,
    /// Pub/sub topic shared by every instance of the service.
    pub service_id: String,
    /// Consumer group of this instance.
    pub group_id: String,
    pub broker: BrokerSettings,
    /// File the materialized environment is written to.
    pub env_file: PathBuf,
    pub timeout: Duration,
    pub max_retries: usize,
    pub retry_backoff: Duration,
    pub publish_timeout: Duration,
}
