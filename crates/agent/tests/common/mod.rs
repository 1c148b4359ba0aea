//! Shared test utilities for confsync-agent integration tests.
//!
//! Invariants / Assumptions:
//! - `DOTENV_DISABLED=1` is set so a local `.env` never leaks into a test.
//! - Every `CONFIG_SERVER_*` variable inherited from the host is removed.

use assert_cmd::Command;

/// Returns a hermetic `confsync-agent` command.
pub fn agent_cmd() -> Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("confsync-agent");
    cmd.env("DOTENV_DISABLED", "1");
    for (key, _) in std::env::vars() {
        if key.starts_with("CONFIG_SERVER_") || key.starts_with("CONFSYNC_") {
            cmd.env_remove(&key);
        }
    }
    cmd.env("RUST_LOG", "warn");
    cmd
}

/// Agent command with every required variable set for a shared-secret instance.
#[allow(dead_code)]
pub fn enabled_agent_cmd(base_url: &str, env_file: &std::path::Path) -> Command {
    let mut cmd = agent_cmd();
    cmd.env("CONFIG_SERVER_BASE_URL", base_url)
        .env("CONFIG_SERVER_PRIVATE_KEY", confsync_config::testing::PRIVATE_KEY)
        .env("CONFIG_SERVER_SERVICE_ID", "billing")
        .env("CONFIG_SERVER_SECRET_KEY", "shared-secret-key")
        .env("CONFIG_SERVER_KAFKA_BOOTSTRAP_SERVERS", "localhost:9092")
        .env("CONFIG_SERVER_KAFKA_SECURITY_PROTOCOL", "PLAINTEXT")
        .env("CONFIG_SERVER_KAFKA_SASL_MECHANISM", "PLAIN")
        .env("CONFIG_SERVER_KAFKA_SASL_JAAS_CONFIG", "unused")
        .env("CONFIG_SERVER_ENV_FILE", env_file)
        .env("CONFIG_SERVER_MAX_RETRIES", "0")
        .env("HOSTNAME", "billing-0");
    cmd
}
