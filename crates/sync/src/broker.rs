//! Pub/sub broker abstraction.
//!
//! Responsibilities:
//! - Define the [`Broker`] seam used to publish refresh notifications and
//!   receive those of peer instances.
//! - Provide [`InMemoryBroker`], an in-process implementation with consumer-group
//!   semantics, used by tests and by single-host deployments.
//!
//! Invariants:
//! - Every consumer group subscribed to a topic receives every message
//!   published to it, including messages published by its own instance.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::BrokerError;

/// Buffered notifications per subscription before publishers wait.
pub const SUBSCRIPTION_BUFFER: usize = 16;

/// Publish/subscribe transport for refresh notifications.
#[async_trait]
pub trait Broker: Send + Sync {
    /// Publish `payload` on `topic`, returning once the broker acknowledged it.
    async fn publish(&self, topic: &str, payload: &str) -> Result<(), BrokerError>;

    /// Subscribe to `topic` as consumer group `group_id`.
    ///
    /// The returned channel yields message payloads until the broker shuts down.
    async fn subscribe(
        &self,
        topic: &str,
        group_id: &str,
    ) -> Result<mpsc::Receiver<String>, BrokerError>;
}

#[derive(Debug)]
struct Subscription {
    group_id: String,
    sender: mpsc::Sender<String>,
}

/// In-process broker with one delivery per consumer group.
#[derive(Debug, Default)]
pub struct InMemoryBroker {
    topics: Mutex<HashMap<String, Vec<Subscription>>>,
    published: Mutex<Vec<(String, String)>>,
    fail_publishes: AtomicBool,
}

impl InMemoryBroker {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make subsequent publishes fail (or succeed again).
    pub fn set_fail_publishes(&self, fail: bool) {
        self.fail_publishes.store(fail, Ordering::SeqCst);
    }

    /// Every `(topic, payload)` accepted so far.
    pub fn published(&self) -> Vec<(String, String)> {
        self.published
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }

    fn senders(&self, topic: &str) -> Result<Vec<mpsc::Sender<String>>, BrokerError> {
        let mut topics = self
            .topics
            .lock()
            .map_err(|_| BrokerError("subscription registry poisoned".to_string()))?;
        let Some(subscriptions) = topics.get_mut(topic) else {
            return Ok(Vec::new());
        };
        subscriptions.retain(|s| !s.sender.is_closed());
        Ok(subscriptions.iter().map(|s| s.sender.clone()).collect())
    }
}

#[async_trait]
impl Broker for InMemoryBroker {
    async fn publish(&self, topic: &str, payload: &str) -> Result<(), BrokerError> {
        if self.fail_publishes.load(Ordering::SeqCst) {
            return Err(BrokerError(format!("publish to '{topic}' rejected")));
        }

        for sender in self.senders(topic)? {
            // A receiver dropped between lookup and send is pruned on the next publish.
            let _ = sender.send(payload.to_string()).await;
        }

        if let Ok(mut published) = self.published.lock() {
            published.push((topic.to_string(), payload.to_string()));
        }
        Ok(())
    }

    async fn subscribe(
        &self,
        topic: &str,
        group_id: &str,
    ) -> Result<mpsc::Receiver<String>, BrokerError> {
        let (sender, receiver) = mpsc::channel(SUBSCRIPTION_BUFFER);
        let mut topics = self
            .topics
            .lock()
            .map_err(|_| BrokerError("subscription registry poisoned".to_string()))?;
        let subscriptions = topics.entry(topic.to_string()).or_default();
        // A group has a single active consumer; a new subscription replaces the old one.
        subscriptions.retain(|s| s.group_id != group_id);
        subscriptions.push(Subscription {
            group_id: group_id.to_string(),
            sender,
        });
        tracing::debug!(topic, group_id, "Subscribed to refresh topic");
        Ok(receiver)
    }
}
