//! Client-side errors.

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("invalid agent url: {0}")]
    Url(#[from] url::ParseError),

    #[error("unsupported url scheme {0:?} (expected http or https)")]
    Scheme(String),

    #[error("http: {0}")]
    Http(#[from] reqwest::Error),

    #[error("websocket: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// The agent answered with an `{error}` body.
    #[error("agent: {message}")]
    Agent { status: u16, message: String },
}
