//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the central publish/subscribe hub for [`TableChange`]s.
//! It is designed to be shared via `Arc<EventBus>` across the application.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use maintrack_core::types::DbId;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Tables whose row changes are published on the feed.
pub const WATCHED_TABLES: &[&str] = &["machines", "work_orders", "pm_schedules", "downtime_logs"];

// ---------------------------------------------------------------------------
// TableChange
// ---------------------------------------------------------------------------

/// Kind of row change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeAction {
    Insert,
    Update,
    Delete,
}

impl ChangeAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Insert => "insert",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for ChangeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors from decoding a notification payload.
#[derive(Debug, thiserror::Error)]
pub enum ChangeParseError {
    #[error("Malformed change payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Change for unwatched table '{0}'")]
    UnknownTable(String),
}

/// A row in one of the [`WATCHED_TABLES`] was inserted, updated or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableChange {
    pub table: String,
    pub action: ChangeAction,
    /// Primary key of the changed row.
    #[serde(rename = "id")]
    pub row_id: DbId,
    /// When the change was received (UTC).
    #[serde(default = "chrono::Utc::now", skip_serializing)]
    pub timestamp: DateTime<Utc>,
}

impl TableChange {
    pub fn new(table: impl Into<String>, action: ChangeAction, row_id: DbId) -> Self {
        Self {
            table: table.into(),
            action,
            row_id,
            timestamp: Utc::now(),
        }
    }
}

impl FromStr for TableChange {
    type Err = ChangeParseError;

    /// Parse the `{"table", "action", "id"}` JSON emitted by the
    /// `notify_table_change()` trigger.
    fn from_str(payload: &str) -> Result<Self, Self::Err> {
        let change: TableChange = serde_json::from_str(payload)?;
        if !WATCHED_TABLES.contains(&change.table.as_str()) {
            return Err(ChangeParseError::UnknownTable(change.table));
        }
        Ok(change)
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// Wraps a [`broadcast::Sender`] so that any number of subscribers can
/// independently receive every published [`TableChange`].
///
/// # Usage
///
/// ```rust
/// use maintrack_events::bus::{ChangeAction, EventBus, TableChange};
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(TableChange::new("machines", ChangeAction::Insert, 1));
/// ```
pub struct EventBus {
    sender: broadcast::Sender<TableChange>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are dropped
    /// and slow receivers will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish a change to all current subscribers.
    ///
    /// If there are no active subscribers the change is silently dropped.
    pub fn publish(&self, change: TableChange) {
        // Ignore the SendError; it only means there are zero receivers.
        let _ = self.sender.send(change);
    }

    /// Subscribe to all changes published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<TableChange> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
