//! Host restart coordination.
//!
//! Responsibilities:
//! - Define the [`ProcessSupervisor`] seam that tears the host down and
//!   relaunches it with its original startup arguments.
//! - Serialize restarts through [`RestartGate`], a single-slot gate.
//!
//! Does NOT handle:
//! - Process management itself (the agent binary supplies a child-process supervisor).
//!
//! Invariants:
//! - At most one teardown/relaunch sequence runs at a time.
//! - Requests that arrive while a restart is waiting to run are coalesced into it.
//! - A request that arrives while a restart is running queues exactly one follow-up.
//! - Scheduling never blocks the caller.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::error::SupervisorError;

/// Owner of the host process lifecycle.
#[async_trait]
pub trait ProcessSupervisor: Send + Sync {
    /// Stop the running host, releasing its resources.
    async fn teardown(&self) -> Result<(), SupervisorError>;

    /// Start the host again with `args`.
    async fn relaunch(&self, args: &[String]) -> Result<(), SupervisorError>;
}

/// Single-slot restart gate.
pub struct RestartGate {
    supervisor: Arc<dyn ProcessSupervisor>,
    launch_args: Vec<String>,
    running: Mutex<()>,
    pending: AtomicBool,
    completed: AtomicUsize,
}

impl std::fmt::Debug for RestartGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestartGate")
            .field("launch_args", &self.launch_args)
            .field("pending", &self.pending.load(Ordering::Relaxed))
            .field("completed", &self.completed.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl RestartGate {
    pub fn new(supervisor: Arc<dyn ProcessSupervisor>, launch_args: Vec<String>) -> Arc<Self> {
        Arc::new(Self {
            supervisor,
            launch_args,
            running: Mutex::new(()),
            pending: AtomicBool::new(false),
            completed: AtomicUsize::new(0),
        })
    }

    /// Arguments the host is relaunched with.
    pub fn launch_args(&self) -> &[String] {
        &self.launch_args
    }

    /// Number of restart sequences that ran to completion.
    pub fn completed_restarts(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    /// Schedule a restart on a separate task.
    ///
    /// Returns the task handle, or `None` when the request was coalesced
    /// into a restart that has not started yet.
    pub fn schedule(self: &Arc<Self>) -> Option<JoinHandle<()>> {
        if self.pending.swap(true, Ordering::AcqRel) {
            tracing::debug!("Restart already pending, coalescing request");
            return None;
        }

        let gate = Arc::clone(self);
        Some(tokio::spawn(async move { gate.run().await }))
    }

    async fn run(&self) {
        let _guard = self.running.lock().await;
        // Requests arriving from here on queue a follow-up restart.
        self.pending.store(false, Ordering::Release);

        match self.restart().await {
            Ok(()) => {
                self.completed.fetch_add(1, Ordering::SeqCst);
                tracing::info!("Host restarted with refreshed configuration");
            }
            Err(e) => tracing::error!(error = %e, "Host restart failed"),
        }
    }

    async fn restart(&self) -> Result<(), SupervisorError> {
        tracing::info!("Tearing down host");
        self.supervisor.teardown().await?;
        tracing::info!(args = ?self.launch_args, "Relaunching host");
        self.supervisor.relaunch(&self.launch_args).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;

    /// Records calls and fails the test if two teardowns overlap.
    #[derive(Default)]
    struct RecordingSupervisor {
        calls: StdMutex<Vec<String>>,
        active: AtomicBool,
        overlapped: AtomicBool,
        delay: Duration,
    }

    #[async_trait]
    impl ProcessSupervisor for RecordingSupervisor {
        async fn teardown(&self) -> Result<(), SupervisorError> {
            if self.active.swap(true, Ordering::SeqCst) {
                self.overlapped.store(true, Ordering::SeqCst);
            }
            self.calls.lock().unwrap().push("teardown".to_string());
            tokio::time::sleep(self.delay).await;
            Ok(())
        }

        async fn relaunch(&self, args: &[String]) -> Result<(), SupervisorError> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("relaunch {}", args.join(" ")));
            self.active.store(false, Ordering::SeqCst);
            Ok(())
        }
    }

    struct FailingTeardown {
        relaunched: AtomicBool,
    }

    #[async_trait]
    impl ProcessSupervisor for FailingTeardown {
        async fn teardown(&self) -> Result<(), SupervisorError> {
            Err(SupervisorError::Teardown("host did not stop".to_string()))
        }

        async fn relaunch(&self, _args: &[String]) -> Result<(), SupervisorError> {
            self.relaunched.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    fn args() -> Vec<String> {
        vec!["./server".to_string(), "--port".to_string(), "9000".to_string()]
    }

    #[tokio::test]
    async fn test_restart_relaunches_with_original_args() {
        let supervisor = Arc::new(RecordingSupervisor::default());
        let gate = RestartGate::new(supervisor.clone(), args());

        gate.schedule().unwrap().await.unwrap();

        assert_eq!(
            *supervisor.calls.lock().unwrap(),
            vec!["teardown", "relaunch ./server --port 9000"]
        );
        assert_eq!(gate.completed_restarts(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_restarts_never_interleave() {
        let supervisor = Arc::new(RecordingSupervisor {
            delay: Duration::from_millis(20),
            ..Default::default()
        });
        let gate = RestartGate::new(supervisor.clone(), args());

        let first = gate.schedule().unwrap();
        // Let the first restart take the lock and start tearing down.
        while supervisor.calls.lock().unwrap().is_empty() {
            tokio::task::yield_now().await;
        }

        let mut follow_ups: Vec<_> = (0..8).filter_map(|_| gate.schedule()).collect();
        assert_eq!(follow_ups.len(), 1, "requests during a restart queue one follow-up");

        first.await.unwrap();
        follow_ups.pop().unwrap().await.unwrap();

        assert!(!supervisor.overlapped.load(Ordering::SeqCst));
        assert_eq!(gate.completed_restarts(), 2);
        let calls = supervisor.calls.lock().unwrap();
        assert_eq!(calls.len(), 4);
        for pair in calls.chunks(2) {
            assert_eq!(pair[0], "teardown");
            assert!(pair[1].starts_with("relaunch"));
        }
    }

    #[tokio::test]
    async fn test_failed_teardown_skips_relaunch() {
        let supervisor = Arc::new(FailingTeardown {
            relaunched: AtomicBool::new(false),
        });
        let gate = RestartGate::new(supervisor.clone(), args());

        gate.schedule().unwrap().await.unwrap();

        assert!(!supervisor.relaunched.load(Ordering::SeqCst));
        assert_eq!(gate.completed_restarts(), 0);
        // The gate is reusable after a failure.
        assert!(gate.schedule().is_some());
    }
}
