//! Axum router: REST endpoints, the `/ws` stream, CORS and request tracing.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api;
use crate::state::AppState;
use crate::ws::ws_handler;

/// CORS allows any origin, method and header (development posture).
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(api::health))
        .route("/ws", get(ws_handler))
        .route("/api/processes", get(api::list_processes))
        .route("/api/processes/:pid", get(api::get_process))
        .route("/api/processes/:pid/kill", post(api::kill_process))
        .route("/api/processes/:pid/suspend", post(api::suspend_process))
        .route("/api/processes/:pid/resume", post(api::resume_process))
        .route("/api/system/status", get(api::system_status))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
