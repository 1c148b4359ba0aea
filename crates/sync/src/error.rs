//! Error types for configuration synchronization.
//!
//! Responsibilities:
//! - Define one error per failing stage (persist, broadcast, broker, restart).
//! - Fold every stage error, plus configuration and fetch errors, into [`SyncError`].
//!
//! Invariants:
//! - Error messages never contain configuration values or key material.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use confsync_client::ClientError;
use confsync_config::ConfigError;

/// Writing the materialized environment file failed.
#[derive(Error, Debug)]
pub enum PersistError {
    #[error("Failed to write environment file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A pub/sub transport operation failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Broker error: {0}")]
pub struct BrokerError(pub String);

/// Publishing the refresh notification failed.
#[derive(Error, Debug)]
pub enum BroadcastError {
    #[error("Publishing refresh to topic '{topic}' timed out after {timeout:?}")]
    Timeout { topic: String, timeout: Duration },

    #[error("Publishing refresh to topic '{topic}' failed: {source}")]
    Publish {
        topic: String,
        #[source]
        source: BrokerError,
    },
}

/// Tearing down or relaunching the host failed.
#[derive(Error, Debug)]
pub enum SupervisorError {
    #[error("Failed to tear down host: {0}")]
    Teardown(String),

    #[error("Failed to relaunch host: {0}")]
    Relaunch(String),
}

/// Any failure of a synchronization cycle.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error(transparent)]
    Configuration(#[from] ConfigError),

    #[error("Failed to fetch configuration: {0}")]
    Fetch(#[from] ClientError),

    #[error(transparent)]
    Persist(#[from] PersistError),

    #[error(transparent)]
    Broadcast(#[from] BroadcastError),

    #[error(transparent)]
    Broker(#[from] BrokerError),

    #[error(transparent)]
    Supervisor(#[from] SupervisorError),
}
