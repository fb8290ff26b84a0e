//! JSON messages exchanged over the change-feed WebSocket.
//!
//! Clients send `{"action": "subscribe", "table": "downtime_logs"}` (or
//! `unsubscribe`); the server answers with an acknowledgement and then
//! pushes a `table_changed` message for every row change in that table.

use maintrack_core::types::DbId;
use maintrack_events::{ChangeAction, TableChange};
use serde::{Deserialize, Serialize};

/// Inbound client message.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ClientMessage {
    Subscribe { table: String },
    Unsubscribe { table: String },
}

/// Outbound server message.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Subscribed {
        table: String,
    },
    Unsubscribed {
        table: String,
    },
    TableChanged {
        table: String,
        action: ChangeAction,
        id: DbId,
    },
    Error {
        message: String,
    },
}

impl ServerMessage {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// Serialize to a text frame payload.
    pub fn to_json(&self) -> String {
        // Serializing these variants cannot fail: all fields are plain data.
        serde_json::to_string(self).unwrap_or_default()
    }
}

impl From<&TableChange> for ServerMessage {
    fn from(change: &TableChange) -> Self {
        Self::TableChanged {
            table: change.table.clone(),
            action: change.action,
            id: change.row_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_subscribe_and_unsubscribe() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"action":"subscribe","table":"machines"}"#).unwrap();
        assert_eq!(
            msg,
            ClientMessage::Subscribe {
                table: "machines".into()
            }
        );
        let msg: ClientMessage =
            serde_json::from_str(r#"{"action":"unsubscribe","table":"work_orders"}"#).unwrap();
        assert_eq!(
            msg,
            ClientMessage::Unsubscribe {
                table: "work_orders".into()
            }
        );
    }

    #[test]
    fn rejects_unknown_action() {
        assert!(serde_json::from_str::<ClientMessage>(r#"{"action":"drop","table":"x"}"#).is_err());
    }

    #[test]
    fn table_change_serializes_with_type_tag() {
        let change = TableChange::new("downtime_logs", ChangeAction::Delete, 12);
        let json: serde_json::Value =
            serde_json::from_str(&ServerMessage::from(&change).to_json()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "table_changed",
                "table": "downtime_logs",
                "action": "delete",
                "id": 12
            })
        );
    }
}
