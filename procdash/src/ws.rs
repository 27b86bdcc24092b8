//! WebSocket client for the agent's `/ws` status stream.

use futures_util::StreamExt;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use url::Url;

use crate::error::ClientError;
use crate::types::{ServerMessage, SystemStatus};

pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    Status(SystemStatus),
    /// The agent closed the stream or the connection failed.
    Closed(String),
}

/// Map the agent's HTTP base url to its `/ws` endpoint.
pub fn ws_url(base: &Url) -> Result<Url, ClientError> {
    let mut url = base.clone();
    let scheme = match base.scheme() {
        "http" => "ws",
        "https" => "wss",
        other => return Err(ClientError::Scheme(other.to_string())),
    };
    // Only fails for cannot-be-a-base urls, which http(s) never are.
    let _ = url.set_scheme(scheme);
    url.set_path("/ws");
    url.set_query(None);
    Ok(url)
}

pub async fn connect(url: &Url) -> Result<WsStream, ClientError> {
    let (ws, _) = connect_async(url.as_str()).await?;
    Ok(ws)
}

/// Decode one text frame. Unknown or malformed frames yield `None`.
pub fn decode(text: &str) -> Option<SystemStatus> {
    match serde_json::from_str::<ServerMessage>(text).ok()? {
        ServerMessage::SystemUpdate(s) => Some(s),
    }
}

/// Read the stream until it ends, forwarding decoded updates. There is no
/// reconnect: a fresh connection would start with no replay anyway.
pub async fn forward_updates(mut ws: WsStream, tx: mpsc::Sender<StreamEvent>) {
    let reason = loop {
        match ws.next().await {
            Some(Ok(Message::Text(text))) => {
                if let Some(status) = decode(&text) {
                    if tx.send(StreamEvent::Status(status)).await.is_err() {
                        return;
                    }
                }
            }
            Some(Ok(Message::Close(_))) | None => break "closed by agent".to_string(),
            Some(Ok(_)) => {}
            Some(Err(e)) => break e.to_string(),
        }
    };
    let _ = tx.send(StreamEvent::Closed(reason)).await;
}
