//! Types that mirror the agent's JSON schema.

use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, PartialEq)]
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
    pub timestamp: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ServerMessage {
    SystemUpdate(SystemStatus),
}

/// One row of `/api/processes`. Degraded entries (process gone before it
/// could be inspected) carry no metrics.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProcessRow {
    pub pid: u32,
    pub name: String,
    pub status: String,
    pub cpu_percent: Option<f32>,
    #[serde(rename = "memoryMB")]
    pub memory_mb: Option<f64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProcessList {
    pub count: usize,
    pub processes: Vec<ProcessRow>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ControlAck {
    pub status: String,
    pub pid: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlAction {
    Kill,
    Suspend,
    Resume,
}

impl ControlAction {
    pub fn path(self) -> &'static str {
        match self {
            Self::Kill => "kill",
            Self::Suspend => "suspend",
            Self::Resume => "resume",
        }
    }
}
