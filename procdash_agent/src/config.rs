//! Command line and environment configuration for the agent.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(
    name = "procdash_agent",
    version,
    about = "Process and resource metrics over HTTP and WebSocket"
)]
pub struct AgentConfig {
    /// Address to listen on
    #[arg(long, env = "PROCDASH_BIND", default_value = "0.0.0.0")]
    pub bind: IpAddr,

    /// TCP port to listen on
    #[arg(short, long, env = "PROCDASH_PORT", default_value_t = 8000)]
    pub port: u16,

    /// Broadcast interval for /ws observers, in milliseconds
    #[arg(
        long = "interval-ms",
        env = "PROCDASH_INTERVAL_MS",
        default_value_t = 1000,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub interval_ms: u64,

    /// Mount point whose disk usage is reported
    #[arg(long = "disk-mount", env = "PROCDASH_DISK_MOUNT", default_value = "/")]
    pub disk_mount: PathBuf,

    /// Delay between the two process refreshes used to compute per-process CPU%
    #[arg(
        long = "cpu-sample-ms",
        env = "PROCDASH_CPU_SAMPLE_MS",
        default_value_t = 150
    )]
    pub cpu_sample_ms: u64,
}

impl AgentConfig {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn cpu_sample_delay(&self) -> Duration {
        Duration::from_millis(self.cpu_sample_ms)
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            bind: IpAddr::from([0, 0, 0, 0]),
            port: 8000,
            interval_ms: 1000,
            disk_mount: PathBuf::from("/"),
            cpu_sample_ms: 150,
        }
    }
}
