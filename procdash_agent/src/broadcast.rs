//! Background broadcaster: samples system status once per interval and
//! pushes the same serialized update to every registered observer.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::error::AgentError;
use crate::provider::Snapshots;
use crate::registry::{ConnectionRegistry, Payload};
use crate::types::ServerMessage;

/// Outcome of one broadcast cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub attempted: usize,
    pub delivered: usize,
    pub pruned: usize,
}

struct Running {
    stop_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

pub struct Broadcaster {
    snapshots: Snapshots,
    registry: Arc<ConnectionRegistry>,
    period: Duration,
    running: Mutex<Option<Running>>,
}

impl Broadcaster {
    pub fn new(snapshots: Snapshots, registry: Arc<ConnectionRegistry>, period: Duration) -> Self {
        Self {
            snapshots,
            registry,
            period,
            running: Mutex::new(None),
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_running(&self) -> bool {
        self.running
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|r| !r.handle.is_finished())
    }

    /// Spawn the loop task. Calling this while the loop is running is a no-op.
    pub fn start(&self) {
        let mut running = self.running.lock().unwrap_or_else(PoisonError::into_inner);
        if running.as_ref().is_some_and(|r| !r.handle.is_finished()) {
            return;
        }
        let (stop_tx, stop_rx) = watch::channel(false);
        let handle = tokio::spawn(run_loop(
            self.snapshots.clone(),
            Arc::clone(&self.registry),
            self.period,
            stop_rx,
        ));
        info!(
            period_ms = self.period.as_millis() as u64,
            "broadcast loop started"
        );
        *running = Some(Running { stop_tx, handle });
    }

    /// Stop the loop, wait for it to exit, and close every registered connection.
    pub async fn stop(&self) {
        let running = self
            .running
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(Running { stop_tx, handle }) = running {
            let _ = stop_tx.send(true);
            if let Err(e) = handle.await {
                warn!("broadcast loop ended abnormally: {e}");
            }
        }
        let closed = self.registry.clear();
        info!(closed, "broadcast loop stopped");
    }

    /// Run a single cycle without the loop. Used by the loop itself and by tests.
    pub async fn cycle(&self) -> CycleReport {
        run_cycle(&self.snapshots, &self.registry).await
    }
}

async fn run_loop(
    snapshots: Snapshots,
    registry: Arc<ConnectionRegistry>,
    period: Duration,
    mut stop_rx: watch::Receiver<bool>,
) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = stop_rx.changed() => break,
        }
        // Sampling may wait on the blocking pool; shutdown must not wait a full sample.
        tokio::select! {
            report = run_cycle(&snapshots, &registry) => {
                debug!(
                    attempted = report.attempted,
                    delivered = report.delivered,
                    pruned = report.pruned,
                    "broadcast cycle"
                );
            }
            _ = stop_rx.changed() => break,
        }
    }
}

async fn run_cycle(snapshots: &Snapshots, registry: &ConnectionRegistry) -> CycleReport {
    let status = match snapshots.system_status().await {
        Ok(s) => s,
        Err(e) => {
            warn!("skipping broadcast: {e}");
            return CycleReport::default();
        }
    };

    // Serialize once so every observer in this cycle gets the same bytes.
    let payload: Payload = match serde_json::to_string(&ServerMessage::SystemUpdate(status)) {
        Ok(js) => js.into(),
        Err(e) => {
            warn!("failed to serialize system update: {e}");
            return CycleReport::default();
        }
    };

    let mut report = CycleReport::default();
    let pruned = registry.for_each(|id, outbox| {
        report.attempted += 1;
        match outbox.try_send(Payload::clone(&payload)) {
            Ok(()) => {
                report.delivered += 1;
                Ok(())
            }
            Err(TrySendError::Full(_)) => {
                debug!(%id, "observer outbox full; dropping connection");
                Err(AgentError::SendFailure(id.get()))
            }
            Err(TrySendError::Closed(_)) => {
                debug!(%id, "observer gone; dropping connection");
                Err(AgentError::SendFailure(id.get()))
            }
        }
    });
    report.pruned = pruned.len();
    report
}
