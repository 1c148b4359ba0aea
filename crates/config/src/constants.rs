//! Centralized constants for the confsync workspace.
//!
//! This module contains default values and environment variable names used
//! across crates to avoid magic value duplication.

// =============================================================================
// Environment Variables: required set
// =============================================================================

/// Base URL of the config authority.
pub const ENV_BASE_URL: &str = "CONFIG_SERVER_BASE_URL";

/// Base64-encoded PKCS#8 DER RSA private key.
pub const ENV_PRIVATE_KEY: &str = "CONFIG_SERVER_PRIVATE_KEY";

/// Logical service identifier, used as the pub/sub topic.
pub const ENV_SERVICE_ID: &str = "CONFIG_SERVER_SERVICE_ID";

pub const ENV_KAFKA_BOOTSTRAP_SERVERS: &str = "CONFIG_SERVER_KAFKA_BOOTSTRAP_SERVERS";
pub const ENV_KAFKA_SECURITY_PROTOCOL: &str = "CONFIG_SERVER_KAFKA_SECURITY_PROTOCOL";
pub const ENV_KAFKA_SASL_MECHANISM: &str = "CONFIG_SERVER_KAFKA_SASL_MECHANISM";
pub const ENV_KAFKA_SASL_JAAS_CONFIG: &str = "CONFIG_SERVER_KAFKA_SASL_JAAS_CONFIG";

// =============================================================================
// Environment Variables: credential group (exactly one shape)
// =============================================================================

/// Shared secret key sent as a bearer token.
pub const ENV_SECRET_KEY: &str = "CONFIG_SERVER_SECRET_KEY";

pub const ENV_CLIENT_ID: &str = "CONFIG_SERVER_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "CONFIG_SERVER_CLIENT_SECRET";

/// Target environment for the client-credential variant.
pub const ENV_ENVIRONMENT: &str = "CONFIG_SERVER_ENVIRONMENT";

// =============================================================================
// Environment Variables: optional tuning
// =============================================================================

pub const ENV_KAFKA_SESSION_TIMEOUT_MS: &str = "CONFIG_SERVER_KAFKA_SESSION_TIMEOUT_MS";
pub const ENV_KAFKA_CLIENT_DNS_LOOKUP: &str = "CONFIG_SERVER_KAFKA_CLIENT_DNS_LOOKUP";
pub const ENV_ENV_FILE: &str = "CONFIG_SERVER_ENV_FILE";
pub const ENV_TIMEOUT: &str = "CONFIG_SERVER_TIMEOUT";
pub const ENV_MAX_RETRIES: &str = "CONFIG_SERVER_MAX_RETRIES";
pub const ENV_RETRY_BACKOFF_MS: &str = "CONFIG_SERVER_RETRY_BACKOFF_MS";
pub const ENV_PUBLISH_TIMEOUT: &str = "CONFIG_SERVER_PUBLISH_TIMEOUT";

/// Instance identity. Falls back to the OS hostname when unset.
pub const ENV_HOSTNAME: &str = "HOSTNAME";

/// Variables whose presence turns validation on.
///
/// If none of these are set, synchronization is disabled. If any is set,
/// every required variable must be present and well formed.
pub const RECOGNIZED_VARS: &[&str] = &[
    ENV_BASE_URL,
    ENV_PRIVATE_KEY,
    ENV_SERVICE_ID,
    ENV_KAFKA_BOOTSTRAP_SERVERS,
    ENV_KAFKA_SECURITY_PROTOCOL,
    ENV_KAFKA_SASL_MECHANISM,
    ENV_KAFKA_SASL_JAAS_CONFIG,
    ENV_SECRET_KEY,
    ENV_CLIENT_ID,
    ENV_CLIENT_SECRET,
    ENV_ENVIRONMENT,
];

/// Variables that are read but never enable synchronization on their own.
pub const OPTIONAL_VARS: &[&str] = &[
    ENV_KAFKA_SESSION_TIMEOUT_MS,
    ENV_KAFKA_CLIENT_DNS_LOOKUP,
    ENV_ENV_FILE,
    ENV_TIMEOUT,
    ENV_MAX_RETRIES,
    ENV_RETRY_BACKOFF_MS,
    ENV_PUBLISH_TIMEOUT,
    ENV_HOSTNAME,
];

// =============================================================================
// Connection & Timeout Defaults
// =============================================================================

/// Default HTTP request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Maximum allowed request timeout in seconds (1 hour).
pub const MAX_TIMEOUT_SECS: u64 = 3600;

/// Default maximum number of HTTP redirects to follow.
pub const DEFAULT_MAX_REDIRECTS: usize = 5;

/// Default number of fetch retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: usize = 3;

/// Upper bound for the configured retry count.
pub const MAX_MAX_RETRIES: usize = 10;

/// Base delay for exponential fetch backoff, in milliseconds.
pub const DEFAULT_RETRY_BACKOFF_MS: u64 = 500;

/// Authorization scheme used with the shared secret key.
pub const BEARER_TOKEN_PREFIX: &str = "Bearer";

// =============================================================================
// Broker Defaults
// =============================================================================

/// How long a publish may wait for the broker's acknowledgement.
pub const DEFAULT_PUBLISH_TIMEOUT_SECS: u64 = 10;

pub const DEFAULT_KAFKA_SESSION_TIMEOUT_MS: u64 = 45_000;

pub const DEFAULT_KAFKA_CLIENT_DNS_LOOKUP: &str = "use_all_dns_ips";

// =============================================================================
// Persistence Defaults
// =============================================================================

/// Local environment file written on every persistence cycle.
pub const DEFAULT_ENV_FILE: &str = ".env";

/// Dotenv file holding the agent's own settings.
///
/// Kept apart from the persisted file so fetched values never reach the
/// agent's environment.
pub const AGENT_DOTENV_FILE: &str = "confsync.env";
