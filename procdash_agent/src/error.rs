//! Agent error kinds and their HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// The pid does not resolve to a live process.
    #[error("Process not found")]
    NotFound(u32),

    /// The OS refused the control operation or introspection call.
    #[error("operation on pid {pid} failed: {source}")]
    OperationError {
        pid: u32,
        #[source]
        source: std::io::Error,
    },

    /// Transient failure collecting system metrics.
    #[error("sampling failed: {0}")]
    SamplingError(String),

    /// The pid path segment is not a non-negative integer in range.
    #[error("invalid pid: {0}")]
    InvalidPid(String),

    /// A push to one observer connection failed.
    #[error("send to connection {0} failed")]
    SendFailure(u64),
}

impl AgentError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::InvalidPid(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Body-only rendering kept for the listing endpoints, which answer
    /// 200 with an `error` field on internal failure.
    pub fn into_embedded(self) -> Response {
        let body = serde_json::json!({ "error": self.to_string() });
        Json(body).into_response()
    }
}

impl IntoResponse for AgentError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = serde_json::json!({ "error": self.to_string() });
        (status, Json(body)).into_response()
    }
}
