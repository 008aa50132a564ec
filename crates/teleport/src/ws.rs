//! WebSocket listeners.
//!
//! `GET /api/ws?session={id}&token={token}` attaches a push channel for
//! the token's role. The flow per connection:
//!   1. Validate query parameters (400 before the upgrade)
//!   2. Register with the coordinator → role and snapshot
//!   3. Send `joined`, then ask the coordinator to broadcast
//!   4. Forward `Outbound` values as JSON text frames until either side
//!      closes
//!   5. Unregister

use std::sync::Arc;

use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::extract::ws::{close_code, CloseFrame, Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::Response;
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use teleport_protocol::{Codec, JsonCodec, LocalView, ServerMessage, SessionId};
use teleport_session::{ListenerId, Outbound};
use tokio::sync::mpsc;

use crate::server::AppState;
use crate::TeleportError;

type WsSink = SplitSink<WebSocket, Message>;

#[derive(Debug, Deserialize)]
pub(crate) struct WsParams {
    session: Option<String>,
    token: Option<String>,
}

/// `GET /api/ws`
pub(crate) async fn ws_connect(
    State(state): State<Arc<AppState>>,
    Query(params): Query<WsParams>,
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Result<Response, TeleportError> {
    let session = non_empty(params.session, "session")?;
    let token = non_empty(params.token, "token")?;
    let ws = ws.map_err(|rejection| TeleportError::BadRequest(rejection.body_text()))?;

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, SessionId::from(session), token)))
}

fn non_empty(value: Option<String>, name: &str) -> Result<String, TeleportError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| TeleportError::BadRequest(format!("missing query parameter: {name}")))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, session: SessionId, token: String) {
    let listener = ListenerId::next();
    let (tx, rx) = mpsc::unbounded_channel();
    let (mut sink, mut stream) = socket.split();
    let codec = state.codec;

    let (snapshot, role) = match state
        .coordinator
        .register_listener(&session, &token, listener, tx)
        .await
    {
        Ok(attached) => attached,
        Err(e) => {
            tracing::debug!(session_id = %session, error = %e, "listener rejected");
            let msg = ServerMessage::Error {
                message: e.to_string(),
            };
            let _ = send(&mut sink, &codec, &msg).await;
            let _ = sink.send(Message::Close(None)).await;
            return;
        }
    };

    let joined = ServerMessage::Joined {
        local: LocalView::of(&snapshot, role),
        global: snapshot,
    };
    if let Err(e) = send(&mut sink, &codec, &joined).await {
        tracing::debug!(%listener, error = %e, "failed to send joined");
        state.coordinator.unregister_listener(&session, listener).await;
        return;
    }
    state.coordinator.broadcast(&session).await;

    let mut writer = tokio::spawn(forward(sink, rx, codec, listener));
    let mut reader = tokio::spawn(async move {
        while let Some(frame) = stream.next().await {
            match frame {
                Ok(Message::Close(_)) => break,
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!(error = %e, "websocket receive failed");
                    break;
                }
            }
        }
    });

    tokio::select! {
        _ = &mut writer => reader.abort(),
        _ = &mut reader => writer.abort(),
    }

    state.coordinator.unregister_listener(&session, listener).await;
    tracing::debug!(session_id = %session, %role, %listener, "websocket closed");
}

/// Drains the listener channel into the socket until the coordinator asks
/// for a close, the channel ends, or a send fails.
async fn forward(
    mut sink: WsSink,
    mut rx: mpsc::UnboundedReceiver<Outbound>,
    codec: JsonCodec,
    listener: ListenerId,
) {
    while let Some(outbound) = rx.recv().await {
        match outbound {
            Outbound::Message(msg) => {
                if let Err(e) = send(&mut sink, &codec, &msg).await {
                    tracing::debug!(%listener, error = %e, "websocket send failed");
                    return;
                }
            }
            Outbound::Close { reason } => {
                let frame = CloseFrame {
                    code: close_code::NORMAL,
                    reason: reason.into(),
                };
                let _ = sink.send(Message::Close(Some(frame))).await;
                return;
            }
        }
    }
}

async fn send(sink: &mut WsSink, codec: &JsonCodec, msg: &ServerMessage) -> Result<(), TeleportError> {
    let text = codec.encode_text(msg)?;
    sink.send(Message::Text(text.into())).await?;
    Ok(())
}
