//! Authentication types for the config authority.
//!
//! Responsibilities:
//! - Define the two ways an instance authenticates (shared secret, client credentials).
//! - Define the closed set of target environments for client-credential logins.
//!
//! Does NOT handle:
//! - The login exchange itself (see the client crate).
//!
//! Invariants:
//! - All secret values use `secrecy::SecretString` to prevent accidental logging.
//! - An instance uses exactly one strategy; the loader rejects configurations
//!   that provide both shapes.

use secrecy::SecretString;
use std::fmt;
use std::str::FromStr;

/// Strategy for authenticating with the config authority.
#[derive(Debug, Clone)]
pub enum AuthStrategy {
    /// A static secret key sent as a bearer token on every fetch.
    SharedSecret { key: SecretString },
    /// Client id/secret exchanged for an access token before each fetch.
    ClientCredentials {
        client_id: String,
        client_secret: SecretString,
        environment: TargetEnvironment,
    },
}

impl AuthStrategy {
    /// Short, non-secret label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SharedSecret { .. } => "shared-secret",
            Self::ClientCredentials { .. } => "client-credentials",
        }
    }
}

/// Environment a client-credential login is scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetEnvironment {
    Development,
    Staging,
    Production,
}

impl TargetEnvironment {
    pub const ALL: [TargetEnvironment; 3] = [Self::Development, Self::Staging, Self::Production];

    /// The lowercase name used in authority URLs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Staging => "staging",
            Self::Production => "production",
        }
    }
}

impl fmt::Display for TargetEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetEnvironment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|env| env.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                let names: Vec<&str> = Self::ALL.iter().map(|e| e.as_str()).collect();
                format!("must be one of {}", names.join(", "))
            })
    }
}
