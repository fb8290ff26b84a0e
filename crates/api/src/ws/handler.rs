use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use maintrack_events::WATCHED_TABLES;

use crate::state::AppState;
use crate::ws::manager::WsManager;
use crate::ws::protocol::{ClientMessage, ServerMessage};

/// GET /api/v1/ws
///
/// Upgrade to a WebSocket carrying the table change feed.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state.ws_manager))
}

/// Manage a single WebSocket connection after upgrade.
///
/// Splits the socket into a sink (outbound) and stream (inbound), then:
///   1. Registers the connection with `WsManager`.
///   2. Spawns a sender task that forwards messages from the manager channel.
///   3. Processes subscribe/unsubscribe messages on the current task.
///   4. Cleans up on disconnect.
async fn handle_socket(socket: WebSocket, ws_manager: Arc<WsManager>) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    tracing::info!(conn_id = %conn_id, "WebSocket connected");

    let mut rx = ws_manager.add(conn_id.clone()).await;

    let (mut sink, mut stream) = socket.split();

    let sender_conn_id = conn_id.clone();
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let is_close = matches!(msg, Message::Close(_));
            if sink.send(msg).await.is_err() || is_close {
                tracing::debug!(conn_id = %sender_conn_id, "WebSocket sink closed");
                break;
            }
        }
    });

    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Close(_)) => break,
            Ok(Message::Pong(_)) => {
                tracing::trace!(conn_id = %conn_id, "Pong received");
            }
            Ok(Message::Text(text)) => {
                let reply = handle_client_message(&ws_manager, &conn_id, text.as_str()).await;
                ws_manager
                    .send_to(&conn_id, Message::Text(reply.to_json().into()))
                    .await;
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(conn_id = %conn_id, error = %e, "WebSocket receive error");
                break;
            }
        }
    }

    ws_manager.remove(&conn_id).await;
    send_task.abort();
    tracing::info!(conn_id = %conn_id, "WebSocket disconnected");
}

/// Apply one client message and build the reply.
async fn handle_client_message(
    ws_manager: &WsManager,
    conn_id: &str,
    text: &str,
) -> ServerMessage {
    let msg = match serde_json::from_str::<ClientMessage>(text) {
        Ok(msg) => msg,
        Err(e) => return ServerMessage::error(format!("Invalid message: {e}")),
    };

    match msg {
        ClientMessage::Subscribe { table } => {
            if !WATCHED_TABLES.contains(&table.as_str()) {
                return ServerMessage::error(format!(
                    "Unknown table '{table}'. Valid tables: {}",
                    WATCHED_TABLES.join(", ")
                ));
            }
            ws_manager.subscribe(conn_id, &table).await;
            tracing::debug!(conn_id, table = %table, "WebSocket subscribed");
            ServerMessage::Subscribed { table }
        }
        ClientMessage::Unsubscribe { table } => {
            ws_manager.unsubscribe(conn_id, &table).await;
            ServerMessage::Unsubscribed { table }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribe_to_known_table_is_acknowledged() {
        let manager = WsManager::new();
        let _rx = manager.add("c".into()).await;

        let reply = handle_client_message(
            &manager,
            "c",
            r#"{"action":"subscribe","table":"downtime_logs"}"#,
        )
        .await;
        assert_eq!(
            reply,
            ServerMessage::Subscribed {
                table: "downtime_logs".into()
            }
        );
        assert_eq!(
            manager
                .send_to_subscribers("downtime_logs", Message::Text("x".into()))
                .await,
            1
        );
    }

    #[tokio::test]
    async fn unknown_table_is_an_error() {
        let manager = WsManager::new();
        let _rx = manager.add("c".into()).await;
        let reply =
            handle_client_message(&manager, "c", r#"{"action":"subscribe","table":"users"}"#)
                .await;
        assert!(matches!(reply, ServerMessage::Error { .. }));
    }

    #[tokio::test]
    async fn malformed_json_is_an_error() {
        let manager = WsManager::new();
        let reply = handle_client_message(&manager, "c", "hello").await;
        assert!(matches!(reply, ServerMessage::Error { .. }));
    }
}
