//! Broker selection for the agent.

use std::sync::Arc;

use confsync_config::BrokerSettings;
use confsync_sync::{Broker, BrokerError};

/// Connect to the configured Kafka cluster and provision the service topic.
#[cfg(feature = "kafka")]
pub async fn connect(settings: BrokerSettings, topic: String) -> Result<Arc<dyn Broker>, BrokerError> {
    let broker = confsync_sync::kafka::KafkaBroker::connect(&settings, &topic).await?;
    Ok(Arc::new(broker))
}

/// Without Kafka support only subscribers inside this process see broadcasts.
#[cfg(not(feature = "kafka"))]
pub async fn connect(settings: BrokerSettings, topic: String) -> Result<Arc<dyn Broker>, BrokerError> {
    tracing::warn!(
        bootstrap_servers = %settings.bootstrap_servers,
        topic = %topic,
        "Built without the kafka feature; refreshes will not reach other instances"
    );
    Ok(confsync_sync::InMemoryBroker::new())
}
