//! REST handlers. Each calls the snapshot provider directly; none of them
//! touch the broadcast loop.

use axum::{
    async_trait,
    extract::{FromRequestParts, Path, State},
    http::request::Parts,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use tracing::error;

use crate::error::AgentError;
use crate::state::AppState;
use crate::types::{
    ControlAck, ControlAction, Health, ProcessList, ProcessSnapshot, SERVICE_NAME,
};

/// `/api/processes` never returns more entries than this.
pub const PROCESS_LIST_CAP: usize = 100;

/// `:pid` path segment. A segment that is not a u32 is rejected with a JSON
/// `{error}` body instead of axum's plain-text rejection.
pub struct Pid(pub u32);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Pid {
    type Rejection = AgentError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Path::<u32>::from_request_parts(parts, state)
            .await
            .map(|Path(pid)| Pid(pid))
            .map_err(|rejection| AgentError::InvalidPid(rejection.body_text()))
    }
}

pub async fn health() -> Json<Health> {
    Json(Health {
        status: "running".into(),
        service: SERVICE_NAME.into(),
        timestamp: Utc::now(),
    })
}

pub async fn list_processes(State(state): State<AppState>) -> Response {
    match state.snapshots.list_processes().await {
        Ok(mut processes) => {
            let count = processes.len();
            processes.truncate(PROCESS_LIST_CAP);
            Json(ProcessList {
                count,
                processes,
                timestamp: Utc::now(),
            })
            .into_response()
        }
        Err(e) => {
            error!("error fetching processes: {e}");
            e.into_embedded()
        }
    }
}

pub async fn get_process(
    State(state): State<AppState>,
    Pid(pid): Pid,
) -> Result<Json<ProcessSnapshot>, AgentError> {
    state.snapshots.process_snapshot(pid).await.map(Json)
}

pub async fn system_status(State(state): State<AppState>) -> Response {
    match state.snapshots.system_status().await {
        Ok(status) => Json(status).into_response(),
        Err(e) => {
            error!("error getting system status: {e}");
            e.into_embedded()
        }
    }
}

async fn control(
    state: AppState,
    pid: u32,
    action: ControlAction,
) -> Result<Json<ControlAck>, AgentError> {
    state
        .snapshots
        .control(pid, action)
        .await
        .map(|()| {
            Json(ControlAck {
                status: action.done().into(),
                pid,
            })
        })
        .inspect_err(|e| {
            if !matches!(e, AgentError::NotFound(_)) {
                error!(pid, ?action, "process control failed: {e}");
            }
        })
}

pub async fn kill_process(
    State(state): State<AppState>,
    Pid(pid): Pid,
) -> Result<Json<ControlAck>, AgentError> {
    control(state, pid, ControlAction::Kill).await
}

pub async fn suspend_process(
    State(state): State<AppState>,
    Pid(pid): Pid,
) -> Result<Json<ControlAck>, AgentError> {
    control(state, pid, ControlAction::Suspend).await
}

pub async fn resume_process(
    State(state): State<AppState>,
    Pid(pid): Pid,
) -> Result<Json<ControlAck>, AgentError> {
    control(state, pid, ControlAction::Resume).await
}
