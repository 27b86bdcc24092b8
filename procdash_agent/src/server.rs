//! Agent service object: owns the shared state and the broadcast loop and
//! ties their lifetime to the HTTP server.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tracing::info;

use crate::broadcast::Broadcaster;
use crate::config::AgentConfig;
use crate::metrics::SysinfoProvider;
use crate::provider::{SnapshotProvider, Snapshots};
use crate::registry::ConnectionRegistry;
use crate::router::build_router;
use crate::state::AppState;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("bind failed on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("serve error: {0}")]
    Serve(#[from] std::io::Error),
}

pub struct Agent {
    state: AppState,
    broadcaster: Arc<Broadcaster>,
}

impl Agent {
    /// Agent backed by the host's sysinfo data.
    pub fn new(config: &AgentConfig) -> Self {
        Self::with_provider(config, Arc::new(SysinfoProvider::new(config)))
    }

    pub fn with_provider(config: &AgentConfig, provider: Arc<dyn SnapshotProvider>) -> Self {
        let snapshots = Snapshots::new(provider);
        let registry = Arc::new(ConnectionRegistry::new());
        let broadcaster = Arc::new(Broadcaster::new(
            snapshots.clone(),
            Arc::clone(&registry),
            config.interval(),
        ));
        Self {
            state: AppState {
                snapshots,
                registry,
            },
            broadcaster,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.state.registry
    }

    pub fn broadcaster(&self) -> &Arc<Broadcaster> {
        &self.broadcaster
    }

    pub fn router(&self) -> Router {
        build_router(self.state.clone())
    }

    pub fn start(&self) {
        self.broadcaster.start();
    }

    pub async fn stop(&self) {
        self.broadcaster.stop().await;
    }

    /// Serve on `listener` until `shutdown` resolves. The broadcast loop runs
    /// for the lifetime of the server; on shutdown it is stopped first, which
    /// closes every observer socket so the HTTP side can drain.
    pub async fn serve<F>(&self, listener: TcpListener, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if let Ok(addr) = listener.local_addr() {
            info!(%addr, "procdash agent listening");
        }
        self.start();

        let broadcaster = Arc::clone(&self.broadcaster);
        let graceful = async move {
            shutdown.await;
            info!("shutdown requested");
            broadcaster.stop().await;
        };

        let served = axum::serve(listener, self.router())
            .with_graceful_shutdown(graceful)
            .await;
        // Also covers the error path, where the graceful future never ran.
        self.stop().await;
        served.map_err(ServerError::from)
    }
}

pub async fn bind(addr: SocketAddr) -> Result<TcpListener, ServerError> {
    TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })
}
