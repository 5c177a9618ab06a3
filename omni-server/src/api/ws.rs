//! Kitchen display WebSocket endpoint
//!
//! GET /api/v1/ws/kitchen?token=<JWT>
//! Auth: browsers cannot set headers on a WebSocket, so the token may come
//! from the query string; an `Authorization: Bearer` header is also accepted.
//!
//! Protocol (server → display only): [`KitchenEvent`] JSON envelopes.
//! Resolution failures upgrade and then close with a 4xxx code.

use axum::extract::ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::http::{HeaderMap, Uri, header};
use axum::response::Response;
use futures::{Sink, SinkExt, StreamExt};
use serde::Deserialize;
use shared::error::{AppError, ErrorKind};
use shared::kitchen::KitchenEvent;
use tokio::time::Duration;

use crate::auth::bearer_token;
use crate::state::AppState;
use crate::tenant::{TenantContext, request_host};

const PING_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Debug, Default, Deserialize)]
pub struct WsAuthQuery {
    token: Option<String>,
}

/// GET /api/v1/ws/kitchen
pub async fn handle_kitchen_ws(
    State(state): State<AppState>,
    Query(query): Query<WsAuthQuery>,
    headers: HeaderMap,
    uri: Uri,
    ws: WebSocketUpgrade,
) -> Response {
    let host = request_host(&headers, &uri);
    let header_token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(bearer_token);
    let token = query.token.as_deref().or(header_token);

    match authorize(&state, &host, token).await {
        Ok(ctx) => ws.on_upgrade(move |socket| kitchen_ws_session(socket, state, ctx)),
        Err(err) => {
            tracing::debug!(host = %host, code = ?err.code, "Kitchen WS rejected");
            ws.on_upgrade(move |socket| reject(socket, err))
        }
    }
}

async fn authorize(
    state: &AppState,
    host: &str,
    token: Option<&str>,
) -> Result<TenantContext, AppError> {
    let ctx = state.resolver.resolve(host, token).await?;
    ctx.require_tenant_partition()?;
    ctx.require_staff()?;
    Ok(ctx)
}

async fn reject(mut socket: WebSocket, err: AppError) {
    let _ = socket.send(close_message(err.kind(), &err.message)).await;
}

fn close_message(kind: ErrorKind, reason: &str) -> Message {
    Message::Close(Some(CloseFrame {
        code: kind.ws_close_code(),
        reason: reason.to_string().into(),
    }))
}

async fn kitchen_ws_session(socket: WebSocket, state: AppState, ctx: TenantContext) {
    let (mut sink, mut stream) = socket.split();
    let partition = ctx.partition;

    // Dropping the subscription unsubscribes, whichever branch ends the loop
    let mut subscription = state.hub.subscribe(&partition);
    tracing::info!(partition = %partition, connection = subscription.id(), "Kitchen WS connected");

    let mut ping_interval = tokio::time::interval(PING_INTERVAL);
    ping_interval.tick().await; // skip immediate

    loop {
        tokio::select! {
            _ = ping_interval.tick() => {
                if sink.send(Message::Ping(vec![].into())).await.is_err() {
                    break;
                }
            }

            event = subscription.recv() => {
                match event {
                    Some(event) => {
                        if send_message(&mut sink, event.as_ref()).await.is_err() {
                            break;
                        }
                    }
                    None => {
                        // Hub dropped us as too slow
                        tracing::warn!(partition = %partition, "Kitchen subscriber evicted");
                        let _ = sink
                            .send(close_message(ErrorKind::TooManyRequests, "subscriber too slow"))
                            .await;
                        break;
                    }
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

    tracing::info!(partition = %partition, connection = subscription.id(), "Kitchen WS disconnected");
}

async fn send_message<S>(sink: &mut S, event: &KitchenEvent) -> Result<(), ()>
where
    S: Sink<Message, Error = axum::Error> + Unpin,
{
    let json = match serde_json::to_string(event) {
        Ok(json) => json,
        Err(e) => {
            tracing::error!(event = event.name(), error = %e, "Failed to serialize kitchen event");
            return Ok(());
        }
    };
    sink.send(Message::Text(json.into())).await.map_err(|_| ())
}
