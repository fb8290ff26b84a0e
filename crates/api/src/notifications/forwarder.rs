//! [`ChangeForwarder`] subscribes to the event bus and pushes each
//! [`TableChange`] to the WebSocket connections subscribed to its table.

use std::sync::Arc;

use axum::extract::ws::Message;
use maintrack_events::TableChange;
use tokio::sync::broadcast;

use crate::ws::protocol::ServerMessage;
use crate::ws::WsManager;

/// Routes table changes to subscribed WebSocket connections.
pub struct ChangeForwarder {
    ws_manager: Arc<WsManager>,
}

impl ChangeForwarder {
    pub fn new(ws_manager: Arc<WsManager>) -> Self {
        Self { ws_manager }
    }

    /// Run the forwarding loop.
    ///
    /// The loop exits when the channel is closed (i.e. the
    /// [`EventBus`](maintrack_events::EventBus) is dropped).
    pub async fn run(self, mut receiver: broadcast::Receiver<TableChange>) {
        loop {
            match receiver.recv().await {
                Ok(change) => {
                    self.forward(&change).await;
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Change forwarder lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, change forwarder shutting down");
                    break;
                }
            }
        }
    }

    /// Push one change to its table's subscribers. Returns the number of
    /// connections reached.
    pub async fn forward(&self, change: &TableChange) -> usize {
        let payload = ServerMessage::from(change).to_json();
        let sent = self
            .ws_manager
            .send_to_subscribers(&change.table, Message::Text(payload.into()))
            .await;
        tracing::debug!(
            table = %change.table,
            action = %change.action,
            id = change.row_id,
            sent,
            "Forwarded table change",
        );
        sent
    }
}
