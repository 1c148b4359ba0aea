//! Agent exit codes for scripting and orchestration.
//!
//! Responsibilities:
//! - Define structured exit codes that supervisors can use to tell failures apart.
//! - Map startup errors to the appropriate exit code.
//!
//! Does NOT handle:
//! - Error message formatting (handled by anyhow Display).
//!
//! Invariants:
//! - Exit code 130 is reserved for SIGINT (Unix standard: 128 + SIGINT).

use confsync_config::ConfigError;
use confsync_sync::SyncError;

/// Structured exit codes for confsync-agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Unhandled or generic failure: broker, persistence, host launch.
    GeneralError = 1,

    /// Settings are incomplete or malformed, or the private key cannot
    /// decrypt the fetched values.
    ///
    /// Retrying without changing the environment will fail the same way.
    ConfigurationError = 2,

    /// The config authority rejected or did not answer the initial fetch.
    FetchError = 3,

    /// Interrupted - SIGINT/Ctrl+C (Unix standard: 128 + 2).
    Interrupted = 130,
}

impl ExitCode {
    /// Convert the exit code to an i32 for use with std::process::exit().
    pub const fn as_i32(self) -> i32 {
        self as u8 as i32
    }
}

impl From<&SyncError> for ExitCode {
    fn from(err: &SyncError) -> Self {
        match err {
            SyncError::Configuration(_) => ExitCode::ConfigurationError,
            SyncError::Fetch(_) => ExitCode::FetchError,
            SyncError::Persist(_)
            | SyncError::Broadcast(_)
            | SyncError::Broker(_)
            | SyncError::Supervisor(_) => ExitCode::GeneralError,
        }
    }
}

/// Extension trait for anyhow::Error to extract exit codes.
pub trait ExitCodeExt {
    /// Returns ExitCode::GeneralError if no known error is in the chain.
    fn exit_code(&self) -> ExitCode;
}

impl ExitCodeExt for anyhow::Error {
    fn exit_code(&self) -> ExitCode {
        for cause in self.chain() {
            if let Some(sync_err) = cause.downcast_ref::<SyncError>() {
                return ExitCode::from(sync_err);
            }
            if cause.downcast_ref::<ConfigError>().is_some() {
                return ExitCode::ConfigurationError;
            }
        }
        ExitCode::GeneralError
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use confsync_client::ClientError;
    use confsync_config::VariableIssue;
    use confsync_sync::{BrokerError, PersistError};

    #[test]
    fn test_exit_code_as_i32() {
        assert_eq!(ExitCode::GeneralError.as_i32(), 1);
        assert_eq!(ExitCode::ConfigurationError.as_i32(), 2);
        assert_eq!(ExitCode::FetchError.as_i32(), 3);
        assert_eq!(ExitCode::Interrupted.as_i32(), 130);
    }

    #[test]
    fn test_configuration_errors_map_to_2() {
        let err = SyncError::from(ConfigError::KeyMismatch);
        assert_eq!(ExitCode::from(&err), ExitCode::ConfigurationError);

        let err = anyhow::Error::new(ConfigError::InvalidConfiguration {
            issues: vec![VariableIssue::missing("CONFIG_SERVER_BASE_URL")],
        });
        assert_eq!(err.exit_code(), ExitCode::ConfigurationError);
    }

    #[test]
    fn test_fetch_errors_map_to_3() {
        let err = SyncError::from(ClientError::AuthFailed("client login returned 401".into()));
        assert_eq!(ExitCode::from(&err), ExitCode::FetchError);
    }

    #[test]
    fn test_other_sync_errors_are_general() {
        let err = SyncError::from(BrokerError("unreachable".to_string()));
        assert_eq!(ExitCode::from(&err), ExitCode::GeneralError);

        let err = SyncError::from(PersistError::Io {
            path: "app.env".into(),
            source: std::io::Error::other("disk full"),
        });
        assert_eq!(ExitCode::from(&err), ExitCode::GeneralError);
    }

    #[test]
    fn test_context_is_searched_for_known_errors() {
        let err = anyhow::Error::new(SyncError::from(ConfigError::KeyMismatch))
            .context("Failed to start config sync");
        assert_eq!(err.exit_code(), ExitCode::ConfigurationError);

        assert_eq!(anyhow::anyhow!("boom").exit_code(), ExitCode::GeneralError);
    }
}
