//! CLI argument definitions and parsing.
//!
//! Responsibilities:
//! - Define the agent's flags using clap derive macros.
//! - Capture the wrapped host command verbatim so restarts reuse the same argv.
//!
//! Non-responsibilities:
//! - Does not read config authority settings (see `confsync_config::ConfigLoader`).

use std::net::SocketAddr;

use clap::{Parser, ValueEnum};

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "confsync-agent")]
#[command(
    about = "Keep a service's configuration in sync with the config authority and restart it on change",
    long_about = None
)]
#[command(version)]
#[command(
    after_help = "Examples:\n  confsync-agent -- ./billing-service --port 9000\n  confsync-agent --bind 127.0.0.1:8081 --log-format json -- java -jar app.jar\n"
)]
pub struct Cli {
    /// Address the refresh endpoint listens on
    #[arg(long, env = "CONFSYNC_BIND", default_value = "0.0.0.0:8080")]
    pub bind: SocketAddr,

    /// Log output format
    #[arg(long, env = "CONFSYNC_LOG_FORMAT", value_enum, default_value = "text")]
    pub log_format: LogFormat,

    /// Host command and its arguments, relaunched verbatim on every restart
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true, value_name = "COMMAND")]
    pub command: Vec<String>,
}
