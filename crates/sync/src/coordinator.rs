//! Refresh broadcast and echo suppression.
//!
//! Responsibilities:
//! - Publish a refresh notification to every instance of the service.
//! - Remember that this instance originated the last broadcast.
//! - Decide whether an inbound notification needs a pull or is our own echo.
//!
//! Invariants:
//! - The originator flag is a best-effort anti-echo signal, not a counter.
//! - The flag is armed only once the broker acknowledges the publish; a failed
//!   or timed-out publish leaves it unset.
//! - While a publish is in flight, only a notification carrying this
//!   instance's own group id is taken as the echo. Peer notifications in that
//!   window still pull.
//! - Every inbound notification leaves the flag cleared.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

use crate::broker::Broker;
use crate::error::BroadcastError;

const IDLE: u8 = 0;
const PUBLISHING: u8 = 1;
const PUBLISHING_ECHOED: u8 = 2;
const ARMED: u8 = 3;

/// Shared "this instance originated the last broadcast" flag.
///
/// Besides the flag itself this tracks whether a publish is in flight and
/// whether its echo already arrived before the acknowledgement.
#[derive(Debug, Default)]
pub struct RefreshState {
    phase: AtomicU8,
}

impl RefreshState {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn is_originator(&self) -> bool {
        self.phase.load(Ordering::SeqCst) == ARMED
    }

    fn transition(&self, from: u8, to: u8) -> bool {
        self.phase
            .compare_exchange(from, to, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    fn begin_publish(&self) {
        self.phase.store(PUBLISHING, Ordering::SeqCst);
    }

    /// Arm the flag after an acknowledged publish, unless its echo was
    /// already consumed.
    fn finish_publish(&self, acknowledged: bool) {
        if acknowledged && self.transition(PUBLISHING, ARMED) {
            return;
        }
        self.phase.store(IDLE, Ordering::SeqCst);
    }

    /// Consume a notification carrying our own group id while the publish
    /// is still waiting for its acknowledgement.
    fn take_early_echo(&self) -> bool {
        self.transition(PUBLISHING, PUBLISHING_ECHOED)
    }

    /// Read and clear the flag.
    fn take(&self) -> bool {
        self.transition(ARMED, IDLE)
    }
}

/// What happened to an inbound notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationOutcome {
    /// Our own broadcast came back; nothing was done.
    Suppressed,
    /// A peer broadcast triggered the pull path.
    Pulled,
}

/// Publishes refresh notifications and filters their echoes.
pub struct RefreshCoordinator {
    broker: Arc<dyn Broker>,
    state: Arc<RefreshState>,
    topic: String,
    group_id: String,
    publish_timeout: Duration,
}

impl RefreshCoordinator {
    pub fn new(
        broker: Arc<dyn Broker>,
        state: Arc<RefreshState>,
        topic: impl Into<String>,
        group_id: impl Into<String>,
        publish_timeout: Duration,
    ) -> Self {
        Self {
            broker,
            state,
            topic: topic.into(),
            group_id: group_id.into(),
            publish_timeout,
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    pub fn broker(&self) -> &Arc<dyn Broker> {
        &self.broker
    }

    pub fn state(&self) -> &Arc<RefreshState> {
        &self.state
    }

    /// Tell every instance of the service to refresh.
    ///
    /// The payload is this instance's group id, used by receivers for logging.
    ///
    /// # Errors
    ///
    /// Returns [`BroadcastError`] if the publish fails or is not acknowledged
    /// within the publish timeout. The originator flag is left unset.
    pub async fn broadcast_refresh(&self) -> Result<(), BroadcastError> {
        self.state.begin_publish();

        let publish = self.broker.publish(&self.topic, &self.group_id);
        let result = match tokio::time::timeout(self.publish_timeout, publish).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(source)) => Err(BroadcastError::Publish {
                topic: self.topic.clone(),
                source,
            }),
            Err(_) => Err(BroadcastError::Timeout {
                topic: self.topic.clone(),
                timeout: self.publish_timeout,
            }),
        };
        self.state.finish_publish(result.is_ok());

        match &result {
            Ok(()) => tracing::info!(
                topic = %self.topic,
                group_id = %self.group_id,
                "Config refresh broadcast sent"
            ),
            Err(e) => {
                tracing::warn!(topic = %self.topic, error = %e, "Unable to broadcast config refresh");
            }
        }
        result
    }

    /// Handle an inbound refresh notification.
    ///
    /// If this instance originated the last broadcast the notification is its
    /// own echo and is suppressed. A notification carrying our own group id
    /// that overtakes the publish acknowledgement is suppressed too.
    /// Otherwise `pull` runs. The originator flag is cleared either way.
    pub async fn on_notification_received<F, Fut>(
        &self,
        payload: &str,
        pull: F,
    ) -> NotificationOutcome
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ()>,
    {
        let early_echo = payload == self.group_id && self.state.take_early_echo();
        if early_echo || self.state.take() {
            tracing::debug!(origin = payload, "Ignoring echo of own config refresh broadcast");
            return NotificationOutcome::Suppressed;
        }

        tracing::info!(origin = payload, "Service config refresh event received");
        pull().await;
        self.state.take();
        NotificationOutcome::Pulled
    }
}
