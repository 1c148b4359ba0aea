//! Common test utilities for synchronization integration tests.
//!
//! # What this does NOT handle
//! - Mock server expectations (set up with wiremock in each test)

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use confsync_config::constants::*;
use confsync_config::{ConfigLoader, SyncMode, SyncSettings, testing};
use confsync_sync::{ProcessSupervisor, SupervisorError};

#[allow(unused_imports)]
pub use wiremock::{Mock, MockServer, ResponseTemplate};

/// Supervisor that only counts calls.
#[derive(Default)]
pub struct CountingSupervisor {
    pub teardowns: AtomicUsize,
    pub relaunches: AtomicUsize,
}

#[async_trait]
impl ProcessSupervisor for CountingSupervisor {
    async fn teardown(&self) -> Result<(), SupervisorError> {
        self.teardowns.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn relaunch(&self, _args: &[String]) -> Result<(), SupervisorError> {
        self.relaunches.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Loader with every variable set for a shared-secret instance.
pub fn loader(base_url: &str, env_file: &Path, hostname: &str) -> ConfigLoader {
    ConfigLoader::new()
        .with_var(ENV_BASE_URL, base_url)
        .with_var(ENV_PRIVATE_KEY, testing::PRIVATE_KEY)
        .with_var(ENV_SERVICE_ID, "billing")
        .with_var(ENV_SECRET_KEY, "shared-secret-key")
        .with_var(ENV_KAFKA_BOOTSTRAP_SERVERS, "localhost:9092")
        .with_var(ENV_KAFKA_SECURITY_PROTOCOL, "PLAINTEXT")
        .with_var(ENV_KAFKA_SASL_MECHANISM, "PLAIN")
        .with_var(ENV_KAFKA_SASL_JAAS_CONFIG, "unused")
        .with_var(ENV_ENV_FILE, env_file.to_string_lossy().to_string())
        .with_var(ENV_RETRY_BACKOFF_MS, "1")
        .with_var(ENV_PUBLISH_TIMEOUT, "2")
        .with_var(ENV_HOSTNAME, hostname)
}

#[allow(dead_code)]
pub fn settings(base_url: &str, env_file: &Path, hostname: &str) -> SyncSettings {
    match loader(base_url, env_file, hostname).build() {
        Ok(SyncMode::Enabled(settings)) => *settings,
        Ok(SyncMode::Disabled) => panic!("Expected enabled sync"),
        Err(e) => panic!("Expected enabled sync, got {}", e),
    }
}

/// Authority response with one plain and one encrypted entry.
#[allow(dead_code)]
pub fn authority_entries() -> serde_json::Value {
    serde_json::json!([
        {"configKey": "A", "configValue": "plain", "encrypted": false},
        {"configKey": "B", "configValue": testing::SECRET_CIPHERTEXT, "encrypted": true}
    ])
}

/// Number of `GET /configs` requests the mock server has seen.
#[allow(dead_code)]
pub async fn fetch_count(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.method.as_str() == "GET" && r.url.path() == "/configs")
        .count()
}

/// Poll `condition` until it holds or two seconds pass.
#[allow(dead_code)]
pub async fn wait_for(mut condition: impl FnMut() -> bool, context: &str) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while !condition() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "Timed out waiting for: {}",
            context
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

#[allow(dead_code)]
pub fn gate(supervisor: &Arc<CountingSupervisor>) -> Arc<confsync_sync::RestartGate> {
    confsync_sync::RestartGate::new(
        supervisor.clone(),
        vec!["./host".to_string(), "--serve".to_string()],
    )
}
