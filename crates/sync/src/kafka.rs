//! Kafka transport for refresh notifications.
//!
//! Responsibilities:
//! - Build producer, consumer, and admin clients from [`BrokerSettings`].
//! - Create the service topic with a single partition, ignoring "already exists".
//! - Bridge a consumer-group subscription onto an mpsc channel.
//!
//! Invariants:
//! - Each instance consumes with its own group id, so every instance sees every message.
//! - Consumers start from the latest offset; notifications sent while an
//!   instance was down are not replayed.

use std::time::Duration;

use async_trait::async_trait;
use rdkafka::admin::{AdminClient, AdminOptions, NewTopic, TopicReplication};
use rdkafka::client::DefaultClientContext;
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::message::Message;
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::types::RDKafkaErrorCode;
use tokio::sync::mpsc;

use confsync_config::BrokerSettings;

use crate::broker::{Broker, SUBSCRIPTION_BUFFER};
use crate::error::BrokerError;

/// Replication factor `-1` lets the cluster apply its default.
const BROKER_DEFAULT_REPLICATION: i32 = -1;

/// Kafka-backed [`Broker`].
pub struct KafkaBroker {
    settings: BrokerSettings,
    producer: FutureProducer,
}

impl KafkaBroker {
    /// Connect a producer and make sure `topic` exists.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError`] if a client cannot be created or topic creation
    /// fails for a reason other than the topic already existing.
    pub async fn connect(settings: &BrokerSettings, topic: &str) -> Result<Self, BrokerError> {
        let producer: FutureProducer = client_config(settings, None)
            .create()
            .map_err(|e| BrokerError(format!("failed to create producer: {e}")))?;

        ensure_topic(settings, topic).await?;

        Ok(Self {
            settings: settings.clone(),
            producer,
        })
    }
}

fn client_config(settings: &BrokerSettings, group_id: Option<&str>) -> ClientConfig {
    let mut config = ClientConfig::new();
    for (key, value) in settings.client_properties(group_id) {
        if key == "sasl.jaas.config" {
            // librdkafka takes the credentials as separate properties.
            if let Some(username) = jaas_option(&value, "username") {
                config.set("sasl.username", username);
            }
            if let Some(password) = jaas_option(&value, "password") {
                config.set("sasl.password", password);
            }
            continue;
        }
        config.set(key, value);
    }
    config
}

/// Extract `name="value"` from a JAAS login module line.
fn jaas_option<'a>(jaas: &'a str, name: &str) -> Option<&'a str> {
    let needle = format!("{name}=\"");
    let start = jaas
        .match_indices(&needle)
        .map(|(i, _)| i)
        .find(|&i| i == 0 || jaas.as_bytes()[i - 1].is_ascii_whitespace())?
        + needle.len();
    let len = jaas[start..].find('"')?;
    Some(&jaas[start..start + len])
}

async fn ensure_topic(settings: &BrokerSettings, topic: &str) -> Result<(), BrokerError> {
    let admin: AdminClient<DefaultClientContext> = client_config(settings, None)
        .create()
        .map_err(|e| BrokerError(format!("failed to create admin client: {e}")))?;

    let new_topic = NewTopic::new(topic, 1, TopicReplication::Fixed(BROKER_DEFAULT_REPLICATION));
    let options = AdminOptions::new().operation_timeout(Some(Duration::from_secs(30)));
    let results = admin
        .create_topics(&[new_topic], &options)
        .await
        .map_err(|e| BrokerError(format!("failed to create topic '{topic}': {e}")))?;

    for result in results {
        match result {
            Ok(name) => tracing::info!(topic = %name, "Created refresh topic"),
            Err((name, RDKafkaErrorCode::TopicAlreadyExists)) => {
                tracing::debug!(topic = %name, "Refresh topic already exists");
            }
            Err((name, code)) => {
                return Err(BrokerError(format!("failed to create topic '{name}': {code}")));
            }
        }
    }
    Ok(())
}

#[async_trait]
impl Broker for KafkaBroker {
    async fn publish(&self, topic: &str, payload: &str) -> Result<(), BrokerError> {
        let record = FutureRecord::<(), str>::to(topic).payload(payload);
        match self.producer.send(record, Duration::from_secs(0)).await {
            Ok((partition, offset)) => {
                tracing::debug!(topic, partition, offset, "Refresh message acknowledged");
                Ok(())
            }
            Err((e, _)) => Err(BrokerError(e.to_string())),
        }
    }

    async fn subscribe(
        &self,
        topic: &str,
        group_id: &str,
    ) -> Result<mpsc::Receiver<String>, BrokerError> {
        let mut config = client_config(&self.settings, Some(group_id));
        config.set("auto.offset.reset", "latest");
        let consumer: StreamConsumer = config
            .create()
            .map_err(|e| BrokerError(format!("failed to create consumer: {e}")))?;
        consumer
            .subscribe(&[topic])
            .map_err(|e| BrokerError(format!("failed to subscribe to '{topic}': {e}")))?;

        let (sender, receiver) = mpsc::channel(SUBSCRIPTION_BUFFER);
        let topic = topic.to_string();
        tokio::spawn(async move {
            loop {
                let payload = match consumer.recv().await {
                    Ok(message) => match message.payload_view::<str>() {
                        Some(Ok(text)) => text.to_string(),
                        Some(Err(_)) | None => {
                            tracing::warn!(topic = %topic, "Ignoring refresh message without UTF-8 payload");
                            continue;
                        }
                    },
                    Err(e) => {
                        tracing::warn!(topic = %topic, error = %e, "Kafka consumer error");
                        continue;
                    }
                };
                if sender.send(payload).await.is_err() {
                    break;
                }
            }
        });

        Ok(receiver)
    }
}
