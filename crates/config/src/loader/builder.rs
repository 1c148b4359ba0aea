//! Configuration loader builder implementation.
//!
//! Responsibilities:
//! - Collect confsync variables from the environment and direct builder methods.
//! - Decide between disabled and enabled synchronization.
//! - Validate every required variable and build the final [`SyncSettings`].
//!
//! Does NOT handle:
//! - Direct environment variable reading (delegated to env.rs).
//! - Talking to the config authority or the broker.
//!
//! Invariants / Assumptions:
//! - Zero recognized variables present means disabled; optional variables
//!   and `HOSTNAME` never enable synchronization on their own.
//! - Once enabled, validation reports every missing or invalid variable at once.
//! - Builder methods are overwritten by `from_env()` when both set a variable.
//! - `load_dotenv()` must be called explicitly to enable dotenv loading.
//! - The `DOTENV_DISABLED` variable is checked before the dotenv file is read.
//! - The agent dotenv file and the persisted env file are never the same file.

use secrecy::SecretString;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use super::env::apply_env;
use super::error::{ConfigError, VariableIssue};
use crate::constants::*;
use crate::encryption::CredentialStore;
use crate::types::{
    AuthStrategy, BrokerSettings, SecurityProtocol, SyncMode, SyncSettings, TargetEnvironment,
};

/// Configuration loader that builds sync settings from environment variables.
#[derive(Default)]
pub struct ConfigLoader {
    values: BTreeMap<String, String>,
}

impl std::fmt::Debug for ConfigLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigLoader")
            .field("present", &self.values.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ConfigLoader {
    /// Create a new configuration loader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if dotenv loading is disabled via environment variable.
    fn dotenv_disabled() -> bool {
        matches!(
            std::env::var("DOTENV_DISABLED").ok().as_deref(),
            Some("true") | Some("1")
        )
    }

    /// Load environment variables from the agent dotenv file
    /// ([`AGENT_DOTENV_FILE`]) if present.
    ///
    /// The persisted env file ([`DEFAULT_ENV_FILE`] unless overridden) is never
    /// read here; it belongs to the host.
    ///
    /// If `DOTENV_DISABLED` environment variable is set to "true" or "1",
    /// the file will not be loaded (useful for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file exists but has invalid syntax (`ConfigError::DotenvParse`)
    /// - The file exists but cannot be read due to I/O errors (`ConfigError::DotenvIo`)
    ///
    /// A missing file is silently ignored (returns `Ok(self)`).
    ///
    /// SAFETY: Error messages never include raw dotenv line contents to prevent secret leakage.
    pub fn load_dotenv(self) -> Result<Self, ConfigError> {
        if Self::dotenv_disabled() {
            return Ok(self);
        }

        match dotenvy::from_filename(AGENT_DOTENV_FILE) {
            Ok(_) => Ok(self),
            Err(e) if Self::is_not_found(&e) => Ok(self),
            Err(dotenvy::Error::LineParse(_, idx)) => {
                Err(ConfigError::DotenvParse { error_index: idx })
            }
            Err(dotenvy::Error::Io(io_err)) => Err(ConfigError::DotenvIo {
                kind: io_err.kind(),
            }),
            Err(_) => Err(ConfigError::DotenvUnknown),
        }
    }

    /// Check if a dotenv error indicates the file was not found.
    fn is_not_found(err: &dotenvy::Error) -> bool {
        matches!(
            err,
            dotenvy::Error::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound
        )
    }

    /// Read configuration from environment variables.
    pub fn from_env(mut self) -> Self {
        apply_env(&mut self);
        self
    }

    /// Set a variable directly, as if it had been read from the environment.
    ///
    /// Empty or whitespace-only values are treated as unset.
    pub fn with_var(mut self, name: &str, value: impl Into<String>) -> Self {
        let value = value.into();
        if !value.trim().is_empty() {
            self.set_var(name, value.trim().to_string());
        }
        self
    }

    pub(super) fn set_var(&mut self, name: &str, value: String) {
        self.values.insert(name.to_string(), value);
    }

    pub(crate) fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Recognized variables that are currently set.
    pub fn recognized_present(&self) -> Vec<&'static str> {
        RECOGNIZED_VARS
            .iter()
            .copied()
            .filter(|name| self.values.contains_key(*name))
            .collect()
    }

    /// Build the final sync mode.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidConfiguration`] listing every missing or
    /// invalid variable when at least one recognized variable is set but the
    /// configuration is incomplete.
    pub fn build(self) -> Result<SyncMode, ConfigError> {
        let present = self.recognized_present();
        if present.is_empty() {
            tracing::info!("No config authority settings found, synchronization disabled");
            return Ok(SyncMode::Disabled);
        }
        tracing::debug!(present = ?present, "Validating config authority settings");

        let mut issues = Vec::new();

        let base_url = self
            .required(ENV_BASE_URL, &mut issues)
            .and_then(|url| record(&mut issues, ENV_BASE_URL, validate_base_url(url)));
        let credentials = self.required(ENV_PRIVATE_KEY, &mut issues).and_then(|key| {
            let key = SecretString::new(key.to_string().into());
            record(
                &mut issues,
                ENV_PRIVATE_KEY,
                CredentialStore::from_base64_pkcs8(&key)
                    .map_err(|_| "not a base64-encoded PKCS#8 RSA key".to_string()),
            )
        });
        let service_id = self
            .required(ENV_SERVICE_ID, &mut issues)
            .map(str::to_string);
        let auth = self.resolve_auth(&mut issues);

        let bootstrap_servers = self
            .required(ENV_KAFKA_BOOTSTRAP_SERVERS, &mut issues)
            .map(str::to_string);
        let security_protocol = self
            .required(ENV_KAFKA_SECURITY_PROTOCOL, &mut issues)
            .and_then(|v| {
                record(
                    &mut issues,
                    ENV_KAFKA_SECURITY_PROTOCOL,
                    SecurityProtocol::from_str(v),
                )
            });
        let sasl_mechanism = self
            .required(ENV_KAFKA_SASL_MECHANISM, &mut issues)
            .map(str::to_string);
        let sasl_jaas_config = self
            .required(ENV_KAFKA_SASL_JAAS_CONFIG, &mut issues)
            .map(|v| SecretString::new(v.to_string().into()));

        let group_id = self.resolve_group_id(&mut issues);

        let session_timeout_ms = self.parse_optional(
            ENV_KAFKA_SESSION_TIMEOUT_MS,
            DEFAULT_KAFKA_SESSION_TIMEOUT_MS,
            "must be a number of milliseconds",
            |v: &u64| *v > 0,
            &mut issues,
        );
        let timeout_secs = self.parse_optional(
            ENV_TIMEOUT,
            DEFAULT_TIMEOUT_SECS,
            &format!("must be between 1 and {MAX_TIMEOUT_SECS} seconds"),
            |v: &u64| (1..=MAX_TIMEOUT_SECS).contains(v),
            &mut issues,
        );
        let max_retries = self.parse_optional(
            ENV_MAX_RETRIES,
            DEFAULT_MAX_RETRIES,
            &format!("must be between 0 and {MAX_MAX_RETRIES}"),
            |v: &usize| *v <= MAX_MAX_RETRIES,
            &mut issues,
        );
        let retry_backoff_ms = self.parse_optional(
            ENV_RETRY_BACKOFF_MS,
            DEFAULT_RETRY_BACKOFF_MS,
            "must be a number of milliseconds",
            |_: &u64| true,
            &mut issues,
        );
        let env_file = self.resolve_env_file(&mut issues);
        let publish_timeout_secs = self.parse_optional(
            ENV_PUBLISH_TIMEOUT,
            DEFAULT_PUBLISH_TIMEOUT_SECS,
            "must be a positive number of seconds",
            |v: &u64| *v > 0,
            &mut issues,
        );

        let (
            Some(base_url),
            Some(credentials),
            Some(service_id),
            Some(auth),
            Some(bootstrap_servers),
            Some(security_protocol),
            Some(sasl_mechanism),
            Some(sasl_jaas_config),
            Some(group_id),
            Some(session_timeout_ms),
            Some(timeout_secs),
            Some(max_retries),
            Some(retry_backoff_ms),
            Some(publish_timeout_secs),
            Some(env_file),
        ) = (
            base_url,
            credentials,
            service_id,
            auth,
            bootstrap_servers,
            security_protocol,
            sasl_mechanism,
            sasl_jaas_config,
            group_id,
            session_timeout_ms,
            timeout_secs,
            max_retries,
            retry_backoff_ms,
            publish_timeout_secs,
            env_file,
        )
        else {
            return Err(ConfigError::InvalidConfiguration { issues });
        };

        let settings = SyncSettings {
            base_url,
            auth,
            credentials: Arc::new(credentials),
            service_id,
            group_id,
            broker: BrokerSettings {
                bootstrap_servers,
                security_protocol,
                sasl_mechanism,
                sasl_jaas_config,
                session_timeout_ms,
                client_dns_lookup: self
                    .get(ENV_KAFKA_CLIENT_DNS_LOOKUP)
                    .unwrap_or(DEFAULT_KAFKA_CLIENT_DNS_LOOKUP)
                    .to_string(),
            },
            env_file,
            timeout: Duration::from_secs(timeout_secs),
            max_retries,
            retry_backoff: Duration::from_millis(retry_backoff_ms),
            publish_timeout: Duration::from_secs(publish_timeout_secs),
        };

        tracing::info!(
            service_id = %settings.service_id,
            group_id = %settings.group_id,
            auth = settings.auth.kind(),
            "Config authority synchronization enabled"
        );

        Ok(SyncMode::Enabled(Box::new(settings)))
    }

    fn required<'a>(&'a self, name: &str, issues: &mut Vec<VariableIssue>) -> Option<&'a str> {
        let value = self.get(name);
        if value.is_none() {
            issues.push(VariableIssue::missing(name));
        }
        value
    }

    /// Parse an optional variable, falling back to `default` when unset.
    ///
    /// Returns `None` (and records an issue) when the value is set but
    /// unparseable or rejected by `accept`.
    fn parse_optional<T: FromStr>(
        &self,
        name: &str,
        default: T,
        reason: &str,
        accept: impl Fn(&T) -> bool,
        issues: &mut Vec<VariableIssue>,
    ) -> Option<T> {
        match self.get(name) {
            None => Some(default),
            Some(raw) => match raw.parse::<T>() {
                Ok(value) if accept(&value) => Some(value),
                _ => {
                    issues.push(VariableIssue::invalid(name, reason));
                    None
                }
            },
        }
    }

    /// Resolve the credential group: a shared secret key, or a complete
    /// client-credential triple, never both.
    fn resolve_auth(&self, issues: &mut Vec<VariableIssue>) -> Option<AuthStrategy> {
        let shared = self.get(ENV_SECRET_KEY);
        let client_vars = [ENV_CLIENT_ID, ENV_CLIENT_SECRET, ENV_ENVIRONMENT];
        let any_client = client_vars.iter().any(|name| self.get(name).is_some());

        match (shared, any_client) {
            (Some(_), true) => {
                issues.push(VariableIssue::invalid(
                    ENV_SECRET_KEY,
                    format!("cannot be combined with {}", client_vars.join("/")),
                ));
                None
            }
            (Some(key), false) => Some(AuthStrategy::SharedSecret {
                key: SecretString::new(key.to_string().into()),
            }),
            (None, false) => {
                issues.push(VariableIssue::invalid(
                    ENV_SECRET_KEY,
                    format!("not set; alternatively set {}", client_vars.join(", ")),
                ));
                None
            }
            (None, true) => {
                let client_id = self.required(ENV_CLIENT_ID, issues);
                let client_secret = self.required(ENV_CLIENT_SECRET, issues);
                let environment = self.required(ENV_ENVIRONMENT, issues).and_then(|v| {
                    record(issues, ENV_ENVIRONMENT, TargetEnvironment::from_str(v))
                });

                Some(AuthStrategy::ClientCredentials {
                    client_id: client_id?.to_string(),
                    client_secret: SecretString::new(client_secret?.to_string().into()),
                    environment: environment?,
                })
            }
        }
    }

    /// The persisted env file, which must not shadow the agent dotenv file.
    fn resolve_env_file(&self, issues: &mut Vec<VariableIssue>) -> Option<PathBuf> {
        let path = PathBuf::from(self.get(ENV_ENV_FILE).unwrap_or(DEFAULT_ENV_FILE));
        if path.file_name() == Some(std::ffi::OsStr::new(AGENT_DOTENV_FILE)) {
            issues.push(VariableIssue::invalid(
                ENV_ENV_FILE,
                format!("must not name the agent settings file {AGENT_DOTENV_FILE}"),
            ));
            return None;
        }
        Some(path)
    }

    fn resolve_group_id(&self, issues: &mut Vec<VariableIssue>) -> Option<String> {
        if let Some(hostname) = self.get(ENV_HOSTNAME) {
            return Some(hostname.to_string());
        }

        let fallback = hostname::get()
            .ok()
            .and_then(|h| h.into_string().ok())
            .filter(|h| !h.trim().is_empty());
        if fallback.is_none() {
            issues.push(VariableIssue::missing(ENV_HOSTNAME));
        }
        fallback
    }
}

/// Record a validation failure for `name`, returning the value on success.
fn record<T>(
    issues: &mut Vec<VariableIssue>,
    name: &str,
    result: Result<T, String>,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(reason) => {
            issues.push(VariableIssue::invalid(name, reason));
            None
        }
    }
}

/// Validate that `raw` is an absolute http(s) URL and strip trailing slashes.
fn validate_base_url(raw: &str) -> Result<String, String> {
    let parsed = url::Url::parse(raw).map_err(|e| format!("not a valid URL: {e}"))?;
    match parsed.scheme() {
        "http" | "https" => {}
        other => return Err(format!("unsupported scheme '{other}', expected http or https")),
    }
    if parsed.host_str().is_none() {
        return Err("URL has no host".to_string());
    }
    Ok(raw.trim_end_matches('/').to_string())
}
