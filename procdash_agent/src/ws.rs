//! WebSocket upgrade and per-connection handler. Registers an outbox with the
//! registry and forwards whatever the broadcaster pushes into it.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use tokio::sync::mpsc;
use tracing::debug;

use crate::registry::{ConnectionId, ConnectionRegistry};
use crate::state::AppState;

/// Updates an observer may fall behind by before it is dropped.
pub const OUTBOX_CAPACITY: usize = 16;

pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(mut socket: WebSocket, state: AppState) {
    let (tx, mut rx) = mpsc::channel(OUTBOX_CAPACITY);
    let id = state.registry.register(tx);
    debug!(%id, "observer connected");

    // Unregister however the handler exits.
    struct Registration<'a>(&'a ConnectionRegistry, ConnectionId);
    impl Drop for Registration<'_> {
        fn drop(&mut self) {
            self.0.unregister(self.1);
        }
    }
    let _guard = Registration(&state.registry, id);

    loop {
        tokio::select! {
            outgoing = rx.recv() => {
                match outgoing {
                    Some(payload) => {
                        let frame = Message::Text(payload.to_string());
                        if socket.send(frame).await.is_err() {
                            debug!(%id, "observer disconnected (send failed)");
                            return;
                        }
                    }
                    // Registry dropped our outbox: pruned or shutting down.
                    None => {
                        let _ = socket.send(Message::Close(None)).await;
                        debug!(%id, "observer closed by agent");
                        return;
                    }
                }
            }
            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | None => {
                        debug!(%id, "observer disconnected");
                        return;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            return;
                        }
                    }
                    Some(Err(e)) => {
                        debug!(%id, "observer socket error: {e}");
                        return;
                    }
                    // No client-to-server protocol on this channel.
                    _ => {}
                }
            }
        }
    }
}
