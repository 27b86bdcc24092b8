//! In-memory snapshot provider shared by the integration tests.
#![allow(dead_code)]

use std::collections::BTreeMap;
use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use chrono::Utc;
use procdash_agent::provider::SnapshotProvider;
use procdash_agent::types::{
    DegradedSnapshot, FullSnapshot, ProcessSnapshot, ProcessStatus, SystemStatus,
};
use procdash_agent::AgentError;

/// Pid that always answers control requests with "permission denied".
pub const PROTECTED_PID: u32 = 1;
/// Pid reported as vanished during enumeration.
pub const VANISHED_PID: u32 = 2;

pub struct FakeProvider {
    live: Mutex<BTreeMap<u32, ProcessStatus>>,
    samples: AtomicUsize,
    pub fail_listing: AtomicBool,
    pub fail_status: AtomicBool,
}

impl FakeProvider {
    /// `n` live processes with pids starting at 10, plus the protected pid.
    pub fn with_processes(n: u32) -> Self {
        let mut live: BTreeMap<u32, ProcessStatus> =
            (10..10 + n).map(|pid| (pid, ProcessStatus::Running)).collect();
        live.insert(PROTECTED_PID, ProcessStatus::Sleeping);
        Self {
            live: Mutex::new(live),
            samples: AtomicUsize::new(0),
            fail_listing: AtomicBool::new(false),
            fail_status: AtomicBool::new(false),
        }
    }

    pub fn status_of(&self, pid: u32) -> Option<ProcessStatus> {
        self.live.lock().unwrap().get(&pid).copied()
    }

    pub fn samples(&self) -> usize {
        self.samples.load(Ordering::SeqCst)
    }

    fn snapshot(pid: u32, status: ProcessStatus) -> ProcessSnapshot {
        ProcessSnapshot::Full(FullSnapshot {
            pid,
            name: format!("proc-{pid}"),
            status,
            cpu_percent: 1.5,
            memory_mb: 12.0,
            created_at: Utc::now(),
        })
    }

    fn set_status(&self, pid: u32, status: Option<ProcessStatus>) -> Result<(), AgentError> {
        let mut live = self.live.lock().unwrap();
        if !live.contains_key(&pid) {
            return Err(AgentError::NotFound(pid));
        }
        if pid == PROTECTED_PID {
            return Err(AgentError::OperationError {
                pid,
                source: io::Error::from(io::ErrorKind::PermissionDenied),
            });
        }
        match status {
            Some(s) => {
                live.insert(pid, s);
            }
            None => {
                live.remove(&pid);
            }
        }
        Ok(())
    }
}

impl SnapshotProvider for FakeProvider {
    fn list_processes(&self) -> Result<Vec<ProcessSnapshot>, AgentError> {
        if self.fail_listing.load(Ordering::SeqCst) {
            return Err(AgentError::SamplingError("listing unavailable".into()));
        }
        let mut out: Vec<ProcessSnapshot> = vec![ProcessSnapshot::Degraded(
            DegradedSnapshot::vanished(VANISHED_PID),
        )];
        out.extend(
            self.live
                .lock()
                .unwrap()
                .iter()
                .map(|(pid, status)| Self::snapshot(*pid, *status)),
        );
        out.sort_by_key(ProcessSnapshot::pid);
        Ok(out)
    }

    fn process_snapshot(&self, pid: u32) -> Result<ProcessSnapshot, AgentError> {
        self.status_of(pid)
            .map(|s| Self::snapshot(pid, s))
            .ok_or(AgentError::NotFound(pid))
    }

    fn terminate(&self, pid: u32) -> Result<(), AgentError> {
        self.set_status(pid, None)
    }

    fn suspend(&self, pid: u32) -> Result<(), AgentError> {
        self.set_status(pid, Some(ProcessStatus::Stopped))
    }

    fn resume(&self, pid: u32) -> Result<(), AgentError> {
        self.set_status(pid, Some(ProcessStatus::Running))
    }

    fn system_status(&self) -> Result<SystemStatus, AgentError> {
        self.samples.fetch_add(1, Ordering::SeqCst);
        if self.fail_status.load(Ordering::SeqCst) {
            return Err(AgentError::SamplingError("sensors offline".into()));
        }
        Ok(SystemStatus {
            cpu_percent: 7.5,
            cpu_core_count: 4,
            cpu_frequency_mhz: 2400.0,
            memory_total_gb: 16.0,
            memory_available_gb: 12.0,
            memory_percent: 25.0,
            disk_total_gb: 256.0,
            disk_free_gb: 128.0,
            disk_percent: 50.0,
            timestamp: Utc::now(),
        })
    }
}
