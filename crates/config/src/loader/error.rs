//! Error types for configuration loading and key handling.
//!
//! Responsibilities:
//! - Define error variants for all configuration failures.
//! - Describe each missing or invalid variable found during validation.
//!
//! Does NOT handle:
//! - Transport or persistence errors (see the client and sync crates).
//!
//! Invariants:
//! - Validation reports every problem at once, never just the first.
//! - Issue descriptions never include variable values.
//! - Dotenv errors NEVER include raw dotenv line contents to prevent secret leakage.
//! - Decryption failures never carry the underlying cryptographic error text.

use std::fmt;
use std::io::ErrorKind;
use thiserror::Error;

use crate::constants::AGENT_DOTENV_FILE;

/// What is wrong with a single variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueKind {
    /// The variable is not set (or is empty/whitespace-only).
    Missing,
    /// The variable is set but its value is unusable.
    Invalid(String),
}

/// A problem with one environment variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableIssue {
    pub name: String,
    pub kind: IssueKind,
}

impl VariableIssue {
    pub fn missing(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: IssueKind::Missing,
        }
    }

    pub fn invalid(name: &str, reason: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            kind: IssueKind::Invalid(reason.into()),
        }
    }
}

impl fmt::Display for VariableIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            IssueKind::Missing => write!(f, "{} (missing)", self.name),
            IssueKind::Invalid(reason) => write!(f, "{} ({})", self.name, reason),
        }
    }
}

fn join_issues(issues: &[VariableIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors that can occur while resolving configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Some, but not all, of the recognized variables are usable.
    #[error("Invalid configuration for {}", join_issues(.issues))]
    InvalidConfiguration { issues: Vec<VariableIssue> },

    /// The private key cannot be parsed.
    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    /// The private key parsed, but cannot decrypt a value.
    #[error("Configured private key is invalid. Update configured private key")]
    KeyMismatch,

    /// Failed to parse the agent dotenv file due to invalid syntax.
    ///
    /// SAFETY: This error only includes the byte index of the parse failure,
    /// NOT the offending line content, to prevent leaking secrets.
    #[error(
        "Failed to parse {file} at position {error_index}. Hint: set DOTENV_DISABLED=1 to skip dotenv loading",
        file = AGENT_DOTENV_FILE
    )]
    DotenvParse { error_index: usize },

    /// Failed to read the agent dotenv file due to an I/O error.
    #[error("Failed to read {file}: {kind}", file = AGENT_DOTENV_FILE)]
    DotenvIo { kind: ErrorKind },

    /// Unknown dotenv error (future variants from dotenvy crate).
    #[error(
        "Failed to load {file}. Hint: set DOTENV_DISABLED=1 to skip dotenv loading",
        file = AGENT_DOTENV_FILE
    )]
    DotenvUnknown,
}

impl ConfigError {
    /// Names of every variable reported by an `InvalidConfiguration` error.
    pub fn variable_names(&self) -> Vec<&str> {
        match self {
            Self::InvalidConfiguration { issues } => {
                issues.iter().map(|issue| issue.name.as_str()).collect()
            }
            _ => Vec::new(),
        }
    }
}
