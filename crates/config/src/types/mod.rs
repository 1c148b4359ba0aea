//! Configuration types for confsync.
//!
//! Responsibilities:
//! - Define the resolved synchronization settings and the enabled/disabled mode.
//! - Define authentication strategies and the closed target environment enum.
//! - Define broker settings and derive broker client properties.
//!
//! Does NOT handle:
//! - Reading or validating environment variables (see `loader`).
//! - Decrypting values (see `encryption`).

mod auth;
mod broker;
mod settings;

pub use auth::{AuthStrategy, TargetEnvironment};
pub use broker::{BrokerSettings, SecurityProtocol};
pub use settings::{SyncMode, SyncSettings};
