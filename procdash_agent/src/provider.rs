//! Snapshot provider seam: OS introspection and process control.
//!
//! Implementations are synchronous and may block on syscalls. [`Snapshots`]
//! moves every call onto tokio's blocking pool so neither the broadcast loop
//! nor request handlers stall on them.

use std::sync::Arc;

use crate::error::AgentError;
use crate::types::{ControlAction, ProcessSnapshot, SystemStatus};

pub trait SnapshotProvider: Send + Sync + 'static {
    fn list_processes(&self) -> Result<Vec<ProcessSnapshot>, AgentError>;

    fn process_snapshot(&self, pid: u32) -> Result<ProcessSnapshot, AgentError>;

    fn terminate(&self, pid: u32) -> Result<(), AgentError>;

    fn suspend(&self, pid: u32) -> Result<(), AgentError>;

    fn resume(&self, pid: u32) -> Result<(), AgentError>;

    fn system_status(&self) -> Result<SystemStatus, AgentError>;

    fn control(&self, pid: u32, action: ControlAction) -> Result<(), AgentError> {
        match action {
            ControlAction::Kill => self.terminate(pid),
            ControlAction::Suspend => self.suspend(pid),
            ControlAction::Resume => self.resume(pid),
        }
    }
}

/// Async facade over a shared provider.
#[derive(Clone)]
pub struct Snapshots {
    inner: Arc<dyn SnapshotProvider>,
}

impl Snapshots {
    pub fn new(provider: Arc<dyn SnapshotProvider>) -> Self {
        Self { inner: provider }
    }

    async fn run<T, F>(&self, f: F) -> Result<T, AgentError>
    where
        T: Send + 'static,
        F: FnOnce(&dyn SnapshotProvider) -> Result<T, AgentError> + Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || f(inner.as_ref()))
            .await
            .map_err(|e| AgentError::SamplingError(format!("provider task: {e}")))?
    }

    pub async fn list_processes(&self) -> Result<Vec<ProcessSnapshot>, AgentError> {
        self.run(|p| p.list_processes()).await
    }

    pub async fn process_snapshot(&self, pid: u32) -> Result<ProcessSnapshot, AgentError> {
        self.run(move |p| p.process_snapshot(pid)).await
    }

    pub async fn control(&self, pid: u32, action: ControlAction) -> Result<(), AgentError> {
        self.run(move |p| p.control(pid, action)).await
    }

    pub async fn system_status(&self) -> Result<SystemStatus, AgentError> {
        self.run(|p| p.system_status()).await
    }
}
