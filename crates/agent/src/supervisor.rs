//! Host process supervision.
//!
//! Responsibilities:
//! - Launch the wrapped host command as a child process.
//! - Stop the running child and start a fresh one with the same argv.
//!
//! Does NOT handle:
//! - Serializing restarts (see `confsync_sync::RestartGate`).
//!
//! Invariants:
//! - At most one child is tracked at a time.
//! - The child is killed when the supervisor is dropped.

use async_trait::async_trait;
use tokio::process::{Child, Command};
use tokio::sync::Mutex;

use confsync_sync::{ProcessSupervisor, SupervisorError};

/// Runs the host as a child of the agent.
#[derive(Debug, Default)]
pub struct ChildProcessSupervisor {
    child: Mutex<Option<Child>>,
}

impl ChildProcessSupervisor {
    pub fn new() -> Self {
        Self::default()
    }

    /// OS process id of the running host, if any.
    pub async fn pid(&self) -> Option<u32> {
        self.child.lock().await.as_ref().and_then(Child::id)
    }
}

#[async_trait]
impl ProcessSupervisor for ChildProcessSupervisor {
    async fn teardown(&self) -> Result<(), SupervisorError> {
        let mut guard = self.child.lock().await;
        let Some(mut child) = guard.take() else {
            tracing::debug!("No host process to tear down");
            return Ok(());
        };

        match child.try_wait() {
            Ok(Some(status)) => {
                tracing::info!(%status, "Host process had already exited");
                return Ok(());
            }
            Ok(None) => {}
            Err(e) => return Err(SupervisorError::Teardown(e.to_string())),
        }

        let pid = child.id();
        child
            .kill()
            .await
            .map_err(|e| SupervisorError::Teardown(e.to_string()))?;
        tracing::info!(pid, "Host process stopped");
        Ok(())
    }

    async fn relaunch(&self, args: &[String]) -> Result<(), SupervisorError> {
        let Some((program, rest)) = args.split_first() else {
            return Err(SupervisorError::Relaunch(
                "no host command configured".to_string(),
            ));
        };

        let child = Command::new(program)
            .args(rest)
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| SupervisorError::Relaunch(format!("{}: {}", program, e)))?;

        tracing::info!(pid = child.id(), program = %program, "Host process launched");
        *self.child.lock().await = Some(child);
        Ok(())
    }
}
