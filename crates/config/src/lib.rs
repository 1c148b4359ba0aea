//! Configuration management for confsync.
//!
//! This crate resolves the settings a service instance needs to synchronize
//! its configuration with the config authority: endpoint, credentials, the
//! RSA private key used for encrypted values, pub/sub broker settings and
//! tuning knobs. It also owns the [`CredentialStore`] that decrypts values.

pub mod constants;
pub mod encryption;
mod loader;
pub mod types;

#[cfg(feature = "test-utils")]
pub mod testing;

pub use encryption::CredentialStore;
pub use loader::{ConfigError, ConfigLoader, IssueKind, VariableIssue, env_var_or_none};
pub use types::{
    AuthStrategy, BrokerSettings, SecurityProtocol, SyncMode, SyncSettings, TargetEnvironment,
};
