//! Data types sent to the client over HTTP and WebSocket.
//! Keep this module minimal and stable; it defines the wire format.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const SERVICE_NAME: &str = "procdash";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessStatus {
    Running,
    Sleeping,
    Idle,
    Stopped,
    Zombie,
    Terminated,
    Unknown,
}

impl From<sysinfo::ProcessStatus> for ProcessStatus {
    fn from(s: sysinfo::ProcessStatus) -> Self {
        use sysinfo::ProcessStatus as S;
        match s {
            S::Run => Self::Running,
            S::Sleep | S::UninterruptibleDiskSleep | S::Waking | S::Wakekill => Self::Sleeping,
            S::Idle | S::Parked => Self::Idle,
            S::Stop | S::Tracing => Self::Stopped,
            S::Zombie => Self::Zombie,
            S::Dead => Self::Terminated,
            _ => Self::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FullSnapshot {
    pub pid: u32,
    pub name: String,
    pub status: ProcessStatus,
    pub cpu_percent: f32,
    #[serde(rename = "memoryMB")]
    pub memory_mb: f64,
    pub created_at: DateTime<Utc>,
}

/// A process that could not be queried in detail, usually because it exited
/// between enumeration and lookup. Carries no resource metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DegradedSnapshot {
    pub pid: u32,
    pub name: String,
    pub status: ProcessStatus,
}

impl DegradedSnapshot {
    pub fn vanished(pid: u32) -> Self {
        Self {
            pid,
            name: "Unknown".into(),
            status: ProcessStatus::Terminated,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProcessSnapshot {
    Full(FullSnapshot),
    Degraded(DegradedSnapshot),
}

impl ProcessSnapshot {
    pub fn pid(&self) -> u32 {
        match self {
            Self::Full(f) => f.pid,
            Self::Degraded(d) => d.pid,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemStatus {
    pub cpu_percent: f32,
    pub cpu_core_count: usize,
    #[serde(rename = "cpuFrequencyMHz")]
    pub cpu_frequency_mhz: f64,
    #[serde(rename = "memoryTotalGB")]
    pub memory_total_gb: f64,
    #[serde(rename = "memoryAvailableGB")]
    pub memory_available_gb: f64,
    pub memory_percent: f64,
    #[serde(rename = "diskTotalGB")]
    pub disk_total_gb: f64,
    #[serde(rename = "diskFreeGB")]
    pub disk_free_gb: f64,
    pub disk_percent: f64,
    pub timestamp: DateTime<Utc>,
}

/// Envelope pushed to every `/ws` observer once per broadcast cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ServerMessage {
    SystemUpdate(SystemStatus),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessList {
    pub count: usize,
    pub processes: Vec<ProcessSnapshot>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Health {
    pub status: String,
    pub service: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlAction {
    Kill,
    Suspend,
    Resume,
}

impl ControlAction {
    /// Past-tense label used in the acknowledgement body.
    pub fn done(self) -> &'static str {
        match self {
            Self::Kill => "killed",
            Self::Suspend => "suspended",
            Self::Resume => "resumed",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlAck {
    pub status: String,
    pub pid: u32,
}

pub const BYTES_PER_MB: f64 = 1024.0 * 1024.0;
pub const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn status() -> SystemStatus {
        SystemStatus {
            cpu_percent: 12.5,
            cpu_core_count: 8,
            cpu_frequency_mhz: 3200.0,
            memory_total_gb: 16.0,
            memory_available_gb: 8.0,
            memory_percent: 50.0,
            disk_total_gb: 512.0,
            disk_free_gb: 128.0,
            disk_percent: 75.0,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn system_update_envelope_shape() {
        let msg = ServerMessage::SystemUpdate(status());
        let v = serde_json::to_value(msg).unwrap();
        assert_eq!(v["type"], "system_update");
        assert_eq!(v["data"]["cpuPercent"], json!(12.5));
        assert_eq!(v["data"]["cpuCoreCount"], json!(8));
        assert!(v["data"]["cpuFrequencyMHz"].is_number());
        assert!(v["data"]["memoryTotalGB"].is_number());
        assert!(v["data"]["diskFreeGB"].is_number());
        assert!(v["data"]["timestamp"].is_string());
    }

    #[test]
    fn degraded_snapshot_has_no_metrics() {
        let snap = ProcessSnapshot::Degraded(DegradedSnapshot::vanished(42));
        let v = serde_json::to_value(snap).unwrap();
        assert_eq!(v, json!({"pid": 42, "name": "Unknown", "status": "terminated"}));
    }

    #[test]
    fn full_snapshot_field_names() {
        let snap = ProcessSnapshot::Full(FullSnapshot {
            pid: 7,
            name: "init".into(),
            status: ProcessStatus::Sleeping,
            cpu_percent: 0.5,
            memory_mb: 3.25,
            created_at: Utc::now(),
        });
        let v = serde_json::to_value(&snap).unwrap();
        assert_eq!(v["status"], "sleeping");
        assert_eq!(v["memoryMB"], json!(3.25));
        assert!(v["createdAt"].is_string());

        let back: ProcessSnapshot = serde_json::from_value(v).unwrap();
        assert!(!back.is_degraded());
        assert_eq!(back.pid(), 7);
    }

    #[test]
    fn action_labels() {
        assert_eq!(ControlAction::Kill.done(), "killed");
        assert_eq!(ControlAction::Suspend.done(), "suspended");
        assert_eq!(ControlAction::Resume.done(), "resumed");
    }
}
