//! Configuration synchronization for confsync.
//!
//! This crate implements the refresh protocol: bootstrap-time fetch and
//! persistence, on-demand refresh with a pub/sub broadcast to every instance
//! of the service, echo suppression for the originating instance, and
//! serialized host restarts.
//!
//! The broker and the host process are reached through the [`Broker`] and
//! [`ProcessSupervisor`] traits; [`bootstrap`] is the composition root that
//! returns either a live [`SyncOrchestrator`] or a [`DisabledSync`].

pub mod broker;
pub mod coordinator;
pub mod error;
pub mod http;
#[cfg(feature = "kafka")]
pub mod kafka;
pub mod materializer;
pub mod orchestrator;
pub mod service;
pub mod supervisor;

pub use broker::{Broker, InMemoryBroker};
pub use coordinator::{NotificationOutcome, RefreshCoordinator, RefreshState};
pub use error::{BroadcastError, BrokerError, PersistError, SupervisorError, SyncError};
pub use materializer::ConfigMaterializer;
pub use orchestrator::{RefreshOutcome, RefreshStage, SyncOrchestrator};
pub use service::{ConfigSync, DisabledSync, SyncHandle, bootstrap};
pub use supervisor::{ProcessSupervisor, RestartGate};

pub use confsync_client::ConfigEntry;
