//! Composition root for configuration synchronization.
//!
//! Responsibilities:
//! - Define the [`ConfigSync`] seam the HTTP surface talks to.
//! - Turn a resolved [`SyncMode`] into either a live orchestrator or [`DisabledSync`].
//!
//! Invariants:
//! - Disabled mode performs no network calls and never touches the broker.
//! - Enabled mode fetches and persists once before returning, then subscribes
//!   to peer notifications.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::task::JoinHandle;

use confsync_client::ConfigEntry;
use confsync_config::{SyncMode, SyncSettings};

use crate::broker::Broker;
use crate::error::{BrokerError, SyncError};
use crate::orchestrator::{RefreshOutcome, SyncOrchestrator};
use crate::supervisor::RestartGate;

/// Entry point for refresh requests.
#[async_trait]
pub trait ConfigSync: Send + Sync {
    fn is_enabled(&self) -> bool;

    async fn refresh(&self, entries: Vec<ConfigEntry>) -> RefreshOutcome;
}

/// Stand-in used when no config authority settings are present.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledSync;

#[async_trait]
impl ConfigSync for DisabledSync {
    fn is_enabled(&self) -> bool {
        false
    }

    async fn refresh(&self, _entries: Vec<ConfigEntry>) -> RefreshOutcome {
        RefreshOutcome::disabled()
    }
}

#[async_trait]
impl ConfigSync for SyncOrchestrator {
    fn is_enabled(&self) -> bool {
        true
    }

    async fn refresh(&self, entries: Vec<ConfigEntry>) -> RefreshOutcome {
        SyncOrchestrator::refresh(self, entries).await
    }
}

/// Result of [`bootstrap`].
pub struct SyncHandle {
    pub sync: Arc<dyn ConfigSync>,
    /// Peer notification listener, present when sync is enabled.
    pub listener: Option<JoinHandle<()>>,
    /// The orchestrator, present when sync is enabled.
    pub orchestrator: Option<Arc<SyncOrchestrator>>,
}

impl SyncHandle {
    pub fn is_enabled(&self) -> bool {
        self.sync.is_enabled()
    }
}

/// Build the synchronization service for `mode`.
///
/// When enabled: connects the broker through `connect_broker`, fetches and
/// persists the initial configuration, then subscribes to the service topic
/// as this instance's consumer group.
///
/// # Errors
///
/// Returns [`SyncError`] if the broker cannot be reached, the initial fetch
/// fails, or the fetched configuration cannot be decrypted or persisted.
pub async fn bootstrap<F, Fut>(
    mode: SyncMode,
    connect_broker: F,
    restart: Arc<RestartGate>,
) -> Result<SyncHandle, SyncError>
where
    F: FnOnce(&SyncSettings) -> Fut,
    Fut: Future<Output = Result<Arc<dyn Broker>, BrokerError>>,
{
    let settings = match mode {
        SyncMode::Disabled => {
            tracing::info!("Config sync disabled; serving local configuration");
            return Ok(SyncHandle {
                sync: Arc::new(DisabledSync),
                listener: None,
                orchestrator: None,
            });
        }
        SyncMode::Enabled(settings) => *settings,
    };

    let broker = connect_broker(&settings).await?;
    let orchestrator = Arc::new(SyncOrchestrator::new(
        &settings,
        Arc::clone(&broker),
        restart,
    )?);

    let count = orchestrator.bootstrap_fetch().await?;
    tracing::info!(entries = count, "Initial application config loaded");

    let notifications = broker
        .subscribe(&settings.service_id, &settings.group_id)
        .await?;
    let listener = Arc::clone(&orchestrator).spawn_listener(notifications);
    tracing::info!(
        topic = %settings.service_id,
        group_id = %settings.group_id,
        "Listening for config refresh events"
    );

    Ok(SyncHandle {
        sync: orchestrator.clone(),
        listener: Some(listener),
        orchestrator: Some(orchestrator),
    })
}
