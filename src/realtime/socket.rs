// realtime/socket.rs - GET /ws?token=

use axum::{
    extract::{
        ws::{rejection::WebSocketUpgradeRejection, Message, WebSocket, WebSocketUpgrade},
        rejection::QueryRejection,
        Query, State,
    },
    response::{IntoResponse, Response},
};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use super::ConnectionManager;
use crate::auth::Action;
use crate::error::ApiError;
use crate::middleware::authenticate;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct SocketParams {
    pub token: Option<String>,
}

/// Upgrades only after the token verifies and the caller may subscribe.
pub async fn ws_get(
    State(state): State<AppState>,
    query: Result<Query<SocketParams>, QueryRejection>,
    upgrade: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Result<Response, ApiError> {
    let Query(params) = query?;
    let token = params
        .token
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| ApiError::unauthorized("Missing token"))?;

    let caller = match authenticate(&state, &token).await {
        Ok(caller) => caller,
        Err(err) => {
            warn!("Realtime connection refused: {}", err);
            return Err(err);
        }
    };
    caller.require(Action::Subscribe)?;

    let upgrade = match upgrade {
        Ok(upgrade) => upgrade,
        Err(rejection) => return Ok(rejection.into_response()),
    };

    info!("Realtime connection admitted for user {}", caller.id);
    let manager = state.realtime.clone();
    Ok(upgrade.on_upgrade(move |socket| serve(socket, manager, caller.id)))
}

async fn serve(socket: WebSocket, manager: ConnectionManager, user_id: Uuid) {
    let mut subscription = manager.register(user_id).await;
    let (mut sink, mut stream) = socket.split();

    loop {
        tokio::select! {
            event = subscription.recv() => {
                let Some(event) = event else { break };
                let text = match serde_json::to_string(&event) {
                    Ok(text) => text,
                    Err(e) => {
                        tracing::error!("Failed to encode realtime event: {}", e);
                        continue;
                    }
                };
                if sink.send(Message::Text(text)).await.is_err() {
                    break;
                }
            }
            incoming = stream.next() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    // clients have nothing to say; pings are answered by axum
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    manager.unregister(subscription.id).await;
    info!("Realtime connection closed for user {}", user_id);
}
