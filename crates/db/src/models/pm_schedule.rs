//! PM schedule entity model and DTOs.

use maintrack_core::pm_schedule::PmStatus;
use maintrack_core::types::{Date, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `pm_schedules` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PmSchedule {
    pub id: DbId,
    pub machine_id: DbId,
    pub task_name: String,
    pub description: Option<String>,
    pub frequency: String,
    pub last_completed_date: Option<Date>,
    pub next_due_date: Option<Date>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl PmSchedule {
    /// Derived display status as of `today`.
    pub fn status_on(&self, today: Date) -> PmStatus {
        PmStatus::derive(self.is_active, self.next_due_date, today)
    }
}

/// A schedule joined with its machine's name, for list views.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PmScheduleWithMachine {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub schedule: PmSchedule,
    pub machine_name: String,
}

/// DTO for creating a PM schedule.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePmSchedule {
    pub machine_id: DbId,
    pub task_name: String,
    pub description: Option<String>,
    /// Defaults to `monthly` if omitted.
    pub frequency: Option<String>,
    pub next_due_date: Option<Date>,
    /// Defaults to `true` if omitted.
    pub is_active: Option<bool>,
}

/// DTO for updating a PM schedule. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePmSchedule {
    pub task_name: Option<String>,
    pub description: Option<String>,
    pub frequency: Option<String>,
    pub next_due_date: Option<Date>,
    pub is_active: Option<bool>,
}

/// Body of `POST /pm-schedules/{id}/complete`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompletePmSchedule {
    /// Defaults to today (UTC) if omitted.
    pub completed_on: Option<Date>,
}
