//! Metrics collection and process control using sysinfo.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use sysinfo::{
    CpuRefreshKind, Disks, MemoryRefreshKind, Pid, Process, ProcessRefreshKind,
    ProcessStatus as OsStatus, ProcessesToUpdate, RefreshKind, Signal, System,
};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::config::AgentConfig;
use crate::error::AgentError;
use crate::provider::SnapshotProvider;
use crate::types::{
    DegradedSnapshot, FullSnapshot, ProcessSnapshot, SystemStatus, BYTES_PER_GB, BYTES_PER_MB,
};

/// Persistent sysinfo handles. CPU usage figures are deltas against the
/// previous refresh, so the handles live as long as the agent.
///
/// Locked with `blocking_lock`; only call into this type from blocking
/// threads (see [`crate::provider::Snapshots`]).
pub struct SysinfoProvider {
    sys: Mutex<System>,
    disks: Mutex<Disks>,
    disk_mount: PathBuf,
    cpu_sample_delay: Duration,
}

impl SysinfoProvider {
    pub fn new(config: &AgentConfig) -> Self {
        let refresh_kind = RefreshKind::nothing()
            .with_cpu(CpuRefreshKind::everything())
            .with_memory(MemoryRefreshKind::everything())
            .with_processes(proc_kind());
        let sys = System::new_with_specifics(refresh_kind);

        Self {
            sys: Mutex::new(sys),
            disks: Mutex::new(Disks::new_with_refreshed_list()),
            disk_mount: config.disk_mount.clone(),
            cpu_sample_delay: config.cpu_sample_delay(),
        }
    }

    fn signal(&self, pid: u32, signal: Signal) -> Result<(), AgentError> {
        let os_pid = Pid::from_u32(pid);
        let mut sys = self.sys.blocking_lock();
        guarded("process refresh", || {
            sys.refresh_processes_specifics(
                ProcessesToUpdate::Some(&[os_pid]),
                true,
                ProcessRefreshKind::nothing(),
            )
        })?;
        let process = sys
            .process(os_pid)
            .filter(|p| is_live(p))
            .ok_or(AgentError::NotFound(pid))?;

        match process.kill_with(signal) {
            Some(true) => {
                info!(pid, ?signal, "signal delivered");
                Ok(())
            }
            // sysinfo reports a bare bool; errno still holds the reason.
            Some(false) => Err(AgentError::OperationError {
                pid,
                source: io::Error::last_os_error(),
            }),
            None => Err(AgentError::OperationError {
                pid,
                source: io::Error::new(
                    io::ErrorKind::Unsupported,
                    format!("{signal:?} is not supported on this platform"),
                ),
            }),
        }
    }
}

fn proc_kind() -> ProcessRefreshKind {
    ProcessRefreshKind::nothing().with_cpu().with_memory()
}

fn is_live(p: &Process) -> bool {
    !matches!(p.status(), OsStatus::Zombie | OsStatus::Dead)
}

fn guarded<T>(what: &str, f: impl FnOnce() -> T) -> Result<T, AgentError> {
    std::panic::catch_unwind(std::panic::AssertUnwindSafe(f)).map_err(|e| {
        warn!("sysinfo {what} panicked: {e:?}");
        AgentError::SamplingError(format!("{what} panicked"))
    })
}

fn full_snapshot(p: &Process) -> ProcessSnapshot {
    let created_at = i64::try_from(p.start_time())
        .ok()
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        .unwrap_or_default();
    ProcessSnapshot::Full(FullSnapshot {
        pid: p.pid().as_u32(),
        name: p.name().to_string_lossy().into_owned(),
        status: p.status().into(),
        cpu_percent: p.cpu_usage(),
        memory_mb: p.memory() as f64 / BYTES_PER_MB,
        created_at,
    })
}

fn percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

impl SnapshotProvider for SysinfoProvider {
    fn list_processes(&self) -> Result<Vec<ProcessSnapshot>, AgentError> {
        // Enumerate, wait for CPU deltas to accumulate, then look each pid up
        // again. Anything that exited in between comes back degraded.
        let enumerated: Vec<Pid> = {
            let mut sys = self.sys.blocking_lock();
            guarded("process refresh", || {
                sys.refresh_processes_specifics(ProcessesToUpdate::All, true, proc_kind())
            })?;
            sys.processes().keys().copied().collect()
        };

        std::thread::sleep(self.cpu_sample_delay);

        let mut sys = self.sys.blocking_lock();
        guarded("process refresh", || {
            sys.refresh_processes_specifics(ProcessesToUpdate::All, true, proc_kind())
        })?;

        let mut out: Vec<ProcessSnapshot> = enumerated
            .into_iter()
            .map(|pid| match sys.process(pid) {
                Some(p) => full_snapshot(p),
                None => ProcessSnapshot::Degraded(DegradedSnapshot::vanished(pid.as_u32())),
            })
            .collect();
        out.sort_by_key(ProcessSnapshot::pid);
        Ok(out)
    }

    fn process_snapshot(&self, pid: u32) -> Result<ProcessSnapshot, AgentError> {
        let os_pid = Pid::from_u32(pid);
        let mut sys = self.sys.blocking_lock();
        guarded("process refresh", || {
            sys.refresh_processes_specifics(ProcessesToUpdate::Some(&[os_pid]), true, proc_kind())
        })?;
        sys.process(os_pid)
            .map(full_snapshot)
            .ok_or(AgentError::NotFound(pid))
    }

    fn terminate(&self, pid: u32) -> Result<(), AgentError> {
        self.signal(pid, Signal::Term)
    }

    fn suspend(&self, pid: u32) -> Result<(), AgentError> {
        self.signal(pid, Signal::Stop)
    }

    fn resume(&self, pid: u32) -> Result<(), AgentError> {
        self.signal(pid, Signal::Continue)
    }

    fn system_status(&self) -> Result<SystemStatus, AgentError> {
        let mut sys = self.sys.blocking_lock();
        guarded("cpu/memory refresh", || {
            sys.refresh_cpu_usage();
            sys.refresh_cpu_frequency();
            sys.refresh_memory();
        })?;

        let cpus = sys.cpus();
        if cpus.is_empty() {
            return Err(AgentError::SamplingError("no cpus reported".into()));
        }
        let cpu_core_count = cpus.len();
        let cpu_frequency_mhz =
            cpus.iter().map(|c| c.frequency() as f64).sum::<f64>() / cpu_core_count as f64;
        let cpu_percent = sys.global_cpu_usage();

        let mem_total = sys.total_memory();
        if mem_total == 0 {
            return Err(AgentError::SamplingError("memory totals unavailable".into()));
        }
        let mem_available = sys.available_memory();
        drop(sys);

        let mut disks = self.disks.blocking_lock();
        guarded("disk refresh", || disks.refresh(true))?;
        let disk = disks
            .list()
            .iter()
            .find(|d| d.mount_point() == self.disk_mount.as_path())
            .ok_or_else(|| {
                AgentError::SamplingError(format!(
                    "no disk mounted at {}",
                    self.disk_mount.display()
                ))
            })?;
        let disk_total = disk.total_space();
        let disk_free = disk.available_space();

        Ok(SystemStatus {
            cpu_percent,
            cpu_core_count,
            cpu_frequency_mhz,
            memory_total_gb: mem_total as f64 / BYTES_PER_GB,
            memory_available_gb: mem_available as f64 / BYTES_PER_GB,
            memory_percent: percent(mem_total.saturating_sub(mem_available), mem_total),
            disk_total_gb: disk_total as f64 / BYTES_PER_GB,
            disk_free_gb: disk_free as f64 / BYTES_PER_GB,
            disk_percent: percent(disk_total.saturating_sub(disk_free), disk_total),
            timestamp: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> SysinfoProvider {
        let config = AgentConfig {
            cpu_sample_ms: 10,
            ..AgentConfig::default()
        };
        SysinfoProvider::new(&config)
    }

    #[test]
    fn percent_handles_zero_total() {
        assert_eq!(percent(5, 0), 0.0);
        assert_eq!(percent(25, 100), 25.0);
    }

    #[test]
    fn own_process_is_listed() {
        let me = std::process::id();
        let list = provider().list_processes().unwrap();
        assert!(list.iter().any(|p| p.pid() == me && !p.is_degraded()));
    }

    #[test]
    fn own_process_snapshot_resolves() {
        let me = std::process::id();
        match provider().process_snapshot(me).unwrap() {
            ProcessSnapshot::Full(f) => {
                assert_eq!(f.pid, me);
                assert!(f.memory_mb > 0.0);
            }
            ProcessSnapshot::Degraded(_) => panic!("own process should resolve fully"),
        }
    }

    #[test]
    fn unknown_pid_is_not_found() {
        let p = provider();
        // Above the largest pid_max Linux allows; never a live process.
        let pid = 4_194_400;
        assert!(matches!(p.process_snapshot(pid), Err(AgentError::NotFound(x)) if x == pid));
        assert!(matches!(p.terminate(pid), Err(AgentError::NotFound(_))));
        assert!(matches!(p.suspend(pid), Err(AgentError::NotFound(_))));
        assert!(matches!(p.resume(pid), Err(AgentError::NotFound(_))));
    }

    #[test]
    fn missing_disk_mount_is_sampling_error() {
        let config = AgentConfig {
            disk_mount: PathBuf::from("/definitely/not/mounted"),
            cpu_sample_ms: 10,
            ..AgentConfig::default()
        };
        let provider = SysinfoProvider::new(&config);
        assert!(matches!(
            provider.system_status(),
            Err(AgentError::SamplingError(_))
        ));
    }

    #[test]
    fn panicking_refresh_becomes_sampling_error() {
        let caught = guarded("disk refresh", || -> u32 { panic!("sysinfo blew up") });
        match caught {
            Err(AgentError::SamplingError(msg)) => assert_eq!(msg, "disk refresh panicked"),
            other => panic!("expected SamplingError, got {other:?}"),
        }
        assert_eq!(guarded("cpu refresh", || 7).unwrap(), 7);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn system_status_is_sane_or_sampling_error() {
        // Containers may not expose a disk mounted at `/`.
        match provider().system_status() {
            Ok(status) => {
                assert!(status.cpu_core_count > 0);
                assert!(status.memory_total_gb > 0.0);
                assert!((0.0..=100.0).contains(&status.memory_percent));
                assert!(status.disk_total_gb >= status.disk_free_gb);
            }
            Err(e) => assert!(matches!(e, AgentError::SamplingError(_)), "{e}"),
        }
    }
}
