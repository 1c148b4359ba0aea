//! Synchronization state machine.
//!
//! Responsibilities:
//! - Bootstrap: fetch once from the config authority and persist.
//! - Refresh: persist supplied entries, broadcast to peers, schedule a restart.
//! - Pull: on a peer notification, re-fetch with bounded retry, persist, restart.
//!
//! Does NOT handle:
//! - Deciding whether sync is enabled (see `service::bootstrap`).
//! - Running the host process (see [`crate::supervisor`]).
//!
//! Invariants:
//! - Nothing is broadcast and no restart is scheduled unless persistence succeeded.
//! - A failed broadcast is downgraded to a warning; the restart still happens.
//! - Refresh never returns an error; failures become a [`RefreshOutcome`].

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use confsync_client::{ClientError, ConfigAuthorityClient, ConfigEntry};
use confsync_config::SyncSettings;

use crate::broker::Broker;
use crate::coordinator::{NotificationOutcome, RefreshCoordinator, RefreshState};
use crate::error::SyncError;
use crate::materializer::ConfigMaterializer;
use crate::supervisor::RestartGate;

pub const REFRESH_SUCCEEDED: &str = "Successfully refreshed application config";
pub const PERSIST_FAILED: &str = "Error occurred while persisting application config";
pub const REFRESH_FAILED: &str =
    "An error occurred while refreshing application config. Check application logs.";
pub const SYNC_DISABLED: &str = "Config sync is not enabled for this service";
pub const INVALID_REQUEST: &str =
    "Refresh body must be a JSON array of configKey/configValue/encrypted entries";

/// Stage at which a refresh failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshStage {
    Decrypt,
    Persist,
    Disabled,
    /// The request body was not a list of config entries.
    InvalidRequest,
}

/// Result of a refresh request, as returned to the caller of `POST /refresh`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefreshOutcome {
    pub message: String,
    pub success: bool,
    #[serde(skip)]
    pub failed_stage: Option<RefreshStage>,
}

impl RefreshOutcome {
    pub fn succeeded() -> Self {
        Self {
            message: REFRESH_SUCCEEDED.to_string(),
            success: true,
            failed_stage: None,
        }
    }

    pub fn failed(stage: RefreshStage) -> Self {
        let message = match stage {
            RefreshStage::Persist => PERSIST_FAILED,
            RefreshStage::Decrypt => REFRESH_FAILED,
            RefreshStage::Disabled => SYNC_DISABLED,
            RefreshStage::InvalidRequest => INVALID_REQUEST,
        };
        Self {
            message: message.to_string(),
            success: false,
            failed_stage: Some(stage),
        }
    }

    pub fn disabled() -> Self {
        Self::failed(RefreshStage::Disabled)
    }
}

/// Retry policy for authority fetches.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: usize,
    pub base_backoff: Duration,
}

impl RetryPolicy {
    /// Backoff before retry number `attempt` (0-based), doubling each time.
    pub fn backoff(&self, attempt: usize) -> Duration {
        let factor = 2u32.saturating_pow(u32::try_from(attempt).unwrap_or(u32::MAX));
        self.base_backoff.saturating_mul(factor)
    }
}

/// Drives bootstrap, refresh, and peer-notified pulls for one instance.
pub struct SyncOrchestrator {
    client: ConfigAuthorityClient,
    materializer: ConfigMaterializer,
    coordinator: RefreshCoordinator,
    restart: Arc<RestartGate>,
    retry: RetryPolicy,
}

impl SyncOrchestrator {
    /// Wire an orchestrator from resolved settings.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Fetch`] if the authority client cannot be built.
    pub fn new(
        settings: &SyncSettings,
        broker: Arc<dyn Broker>,
        restart: Arc<RestartGate>,
    ) -> Result<Self, SyncError> {
        let client = ConfigAuthorityClient::builder()
            .from_settings(settings)
            .build()?;
        let materializer =
            ConfigMaterializer::new(Arc::clone(&settings.credentials), settings.env_file.clone());
        let coordinator = RefreshCoordinator::new(
            broker,
            RefreshState::new(),
            settings.service_id.clone(),
            settings.group_id.clone(),
            settings.publish_timeout,
        );

        Ok(Self {
            client,
            materializer,
            coordinator,
            restart,
            retry: RetryPolicy {
                max_retries: settings.max_retries,
                base_backoff: settings.retry_backoff,
            },
        })
    }

    pub fn coordinator(&self) -> &RefreshCoordinator {
        &self.coordinator
    }

    pub fn materializer(&self) -> &ConfigMaterializer {
        &self.materializer
    }

    pub fn restart_gate(&self) -> &Arc<RestartGate> {
        &self.restart
    }

    /// Fetch from the authority and persist, without restarting.
    ///
    /// Returns the number of entries written.
    pub async fn bootstrap_fetch(&self) -> Result<usize, SyncError> {
        tracing::info!(base_url = %self.client.base_url(), "Fetching initial application config");
        let entries = self.fetch_with_retry().await?;
        self.materializer.persist(&entries)?;
        Ok(entries.len())
    }

    /// Apply entries pushed to this instance and propagate them to its peers.
    pub async fn refresh(&self, entries: Vec<ConfigEntry>) -> RefreshOutcome {
        tracing::info!(entries = entries.len(), "Refreshing application config");

        if let Err(e) = self.materializer.persist(&entries) {
            tracing::error!(error = %e, "Failed to persist refreshed application config");
            return match e {
                SyncError::Persist(_) => RefreshOutcome::failed(RefreshStage::Persist),
                _ => RefreshOutcome::failed(RefreshStage::Decrypt),
            };
        }

        if let Err(e) = self.coordinator.broadcast_refresh().await {
            tracing::warn!(
                error = %e,
                "Peers were not notified; restarting this instance only"
            );
        }

        self.restart.schedule();
        RefreshOutcome::succeeded()
    }

    /// Re-fetch from the authority, persist, and schedule a restart.
    ///
    /// # Errors
    ///
    /// Returns the fetch or persist error; no restart is scheduled then.
    pub async fn pull(&self) -> Result<usize, SyncError> {
        let entries = self.fetch_with_retry().await?;
        self.materializer.persist(&entries)?;
        self.restart.schedule();
        Ok(entries.len())
    }

    /// Handle one inbound refresh notification.
    pub async fn handle_notification(&self, payload: &str) -> NotificationOutcome {
        self.coordinator
            .on_notification_received(payload, || async {
                match self.pull().await {
                    Ok(count) => tracing::info!(entries = count, "Pulled refreshed application config"),
                    Err(e) => tracing::error!(error = %e, "Failed to pull refreshed application config"),
                }
            })
            .await
    }

    /// Consume notifications until the subscription closes.
    pub fn spawn_listener(self: Arc<Self>, mut notifications: mpsc::Receiver<String>) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(payload) = notifications.recv().await {
                self.handle_notification(&payload).await;
            }
            tracing::warn!(
                topic = %self.coordinator.topic(),
                "Refresh subscription closed, no longer listening for peer refreshes"
            );
        })
    }

    async fn fetch_with_retry(&self) -> Result<Vec<ConfigEntry>, ClientError> {
        let mut attempt = 0;
        loop {
            match self.client.fetch_entries().await {
                Ok(entries) => return Ok(entries),
                Err(e) if e.is_retryable() && attempt < self.retry.max_retries => {
                    let backoff = self.retry.backoff(attempt);
                    attempt += 1;
                    tracing::warn!(
                        attempt,
                        max_retries = self.retry.max_retries,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %e,
                        "Config fetch failed, retrying"
                    );
                    tokio::time::sleep(backoff).await;
                }
                Err(e) if e.is_auth_error() => {
                    tracing::error!(
                        error = %e,
                        "Config authority rejected this instance's credentials"
                    );
                    return Err(e);
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles() {
        let policy = RetryPolicy {
            max_retries: 3,
            base_backoff: Duration::from_millis(500),
        };
        assert_eq!(policy.backoff(0), Duration::from_millis(500));
        assert_eq!(policy.backoff(1), Duration::from_millis(1000));
        assert_eq!(policy.backoff(2), Duration::from_millis(2000));
    }

    #[test]
    fn test_backoff_saturates() {
        let policy = RetryPolicy {
            max_retries: 10,
            base_backoff: Duration::from_secs(u64::MAX / 2),
        };
        assert_eq!(policy.backoff(64), Duration::MAX);
    }

    #[test]
    fn test_outcome_messages() {
        assert_eq!(RefreshOutcome::succeeded().message, REFRESH_SUCCEEDED);
        assert_eq!(
            RefreshOutcome::failed(RefreshStage::Persist).message,
            PERSIST_FAILED
        );
        let disabled = RefreshOutcome::disabled();
        assert!(!disabled.success);
        assert_eq!(disabled.message, SYNC_DISABLED);
    }

    #[test]
    fn test_outcome_serializes_message_and_success_only() {
        let json = serde_json::to_value(RefreshOutcome::failed(RefreshStage::Decrypt)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"message": REFRESH_FAILED, "success": false})
        );
    }
}
