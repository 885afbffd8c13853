//! Realtime change feed over WebSocket
//!
//! GET /api/realtime/ws?token=<JWT>
//! Auth: JWT in the query string (browser WebSockets cannot set headers)
//!
//! Protocol (server → client only): `RealtimeMessage`
//! - `ready` once subscribed
//! - `change` per committed write in the caller's store
//! - `resync` when events were dropped; the client refetches everything

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade, rejection::WebSocketUpgradeRejection};
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::{Router, routing::get};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use shared::error::AppError;
use shared::realtime::RealtimeMessage;
use tokio::sync::broadcast;
use tokio::time::Duration;

use crate::auth::{ensure_active, jwt};
use crate::auth::staff_auth::token_error;
use crate::state::AppState;

const PING_INTERVAL: Duration = Duration::from_secs(30);

pub fn router() -> Router<AppState> {
    Router::new().route("/api/realtime/ws", get(handle_realtime_ws))
}

#[derive(Deserialize)]
pub struct WsAuthQuery {
    token: String,
}

/// GET /api/realtime/ws?token=<JWT>
///
/// The token is checked before the upgrade so a bad token is a plain 401.
pub async fn handle_realtime_ws(
    State(state): State<AppState>,
    Query(query): Query<WsAuthQuery>,
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Result<Response, AppError> {
    let claims = jwt::verify_token(&query.token, &state.jwt_secret).map_err(token_error)?;
    let store_id = claims.store_id;
    let user_id = claims.sub;
    ensure_active(&state, store_id, user_id).await?;

    let ws = match ws {
        Ok(ws) => ws,
        Err(rejection) => return Ok(rejection.into_response()),
    };
    Ok(ws.on_upgrade(move |socket| realtime_session(socket, state, store_id, user_id)))
}

async fn realtime_session(socket: WebSocket, state: AppState, store_id: i64, user_id: i64) {
    let (mut sink, mut stream) = socket.split();
    let mut hub_rx = state.realtime.subscribe(store_id);

    tracing::info!(store_id, user_id, "Realtime WS connected");

    if send_message(&mut sink, &RealtimeMessage::Ready { store_id })
        .await
        .is_err()
    {
        state.realtime.release(store_id);
        return;
    }

    let mut ping_interval = tokio::time::interval(PING_INTERVAL);
    ping_interval.tick().await; // skip immediate

    loop {
        tokio::select! {
            _ = ping_interval.tick() => {
                if sink.send(Message::Ping(vec![].into())).await.is_err() {
                    break;
                }
            }

            event = hub_rx.recv() => {
                match event {
                    Ok(event) => {
                        if send_message(&mut sink, &RealtimeMessage::Change(event)).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(store_id, lagged = n, "Realtime subscriber lagged, asking for resync");
                        hub_rx = state.realtime.subscribe(store_id);
                        if send_message(&mut sink, &RealtimeMessage::Resync).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }

            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(_)) => break,
                    _ => {}
                }
            }
        }
    }

    drop(hub_rx);
    state.realtime.release(store_id);
    tracing::info!(store_id, user_id, "Realtime WS disconnected");
}

async fn send_message<S>(sink: &mut S, msg: &RealtimeMessage) -> Result<(), ()>
where
    S: futures::Sink<Message, Error = axum::Error> + Unpin,
{
    let json = serde_json::to_string(msg).map_err(|_| ())?;
    sink.send(Message::Text(json.into())).await.map_err(|_| ())
}
