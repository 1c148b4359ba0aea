//! Environment variable reading for configuration.
//!
//! Responsibilities:
//! - Read the recognized and optional confsync variables into a loader.
//! - Provide a helper for reading env vars with empty/whitespace filtering.
//!
//! Does NOT handle:
//! - Validating values (see builder.rs).
//! - Dotenv file loading (handled by ConfigLoader::load_dotenv).
//!
//! Invariants:
//! - Empty or whitespace-only environment variables are treated as unset.
//! - Returned values are trimmed (leading/trailing whitespace removed).

use super::builder::ConfigLoader;
use crate::constants::{OPTIONAL_VARS, RECOGNIZED_VARS};

/// Read an environment variable, returning None if unset, empty, or whitespace-only.
/// Returns the trimmed value (leading/trailing whitespace removed) if present.
pub fn env_var_or_none(key: &str) -> Option<String> {
    std::env::var(key).ok().and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else if trimmed.len() == s.len() {
            // No trimming needed, return original to avoid allocation
            Some(s)
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Copy every recognized and optional variable present in the process
/// environment into the loader. Values set earlier through builder methods
/// are overwritten.
pub fn apply_env(loader: &mut ConfigLoader) {
    for name in RECOGNIZED_VARS.iter().chain(OPTIONAL_VARS) {
        if let Some(value) = env_var_or_none(name) {
            loader.set_var(name, value);
        }
    }
}
