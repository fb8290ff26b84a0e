//! Downtime log entity model and DTOs.

use maintrack_core::downtime::DowntimeRecord;
use maintrack_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `downtime_logs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DowntimeLog {
    pub id: DbId,
    pub machine_id: DbId,
    pub reason: String,
    pub description: Option<String>,
    pub started_at: Timestamp,
    pub ended_at: Option<Timestamp>,
    pub duration_minutes: Option<i64>,
    pub created_at: Timestamp,
}

impl DowntimeLog {
    pub fn is_active(&self) -> bool {
        self.ended_at.is_none()
    }
}

impl DowntimeRecord for DowntimeLog {
    fn ended_at(&self) -> Option<Timestamp> {
        self.ended_at
    }

    fn duration_minutes(&self) -> Option<i64> {
        self.duration_minutes
    }
}

/// A log joined with its machine's name, for list views.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DowntimeLogWithMachine {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub log: DowntimeLog,
    pub machine_name: String,
}

impl DowntimeRecord for DowntimeLogWithMachine {
    fn ended_at(&self) -> Option<Timestamp> {
        self.log.ended_at
    }

    fn duration_minutes(&self) -> Option<i64> {
        self.log.duration_minutes
    }
}

/// DTO for opening a downtime log.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateDowntimeLog {
    pub machine_id: DbId,
    pub reason: String,
    pub description: Option<String>,
    /// Defaults to now if omitted.
    pub started_at: Option<Timestamp>,
}

/// Body of `POST /downtime/{id}/end`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EndDowntimeLog {
    /// Defaults to now if omitted.
    pub ended_at: Option<Timestamp>,
}
