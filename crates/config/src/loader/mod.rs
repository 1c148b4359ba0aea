//! Configuration loader for environment variables.
//!
//! Responsibilities:
//! - Load confsync variables from the agent dotenv file and the process environment.
//! - Provide a builder-pattern `ConfigLoader` that resolves a [`crate::SyncMode`].
//! - Enforce `DOTENV_DISABLED` gate to prevent accidental dotenv loading in tests.
//!
//! Does NOT handle:
//! - Writing the materialized environment file (see `confsync-sync`).
//! - Decrypting configuration values (see `encryption.rs`).
//!
//! Invariants / Assumptions:
//! - Environment variables take precedence over values set through builder methods.
//! - `load_dotenv()` must be called explicitly to enable dotenv loading.
//! - The `DOTENV_DISABLED` variable is checked before the dotenv file is read.

mod builder;
mod env;
mod error;

pub use builder::ConfigLoader;
pub use env::env_var_or_none;
pub use error::{ConfigError, IssueKind, VariableIssue};

#[cfg(test)]
mod tests;
