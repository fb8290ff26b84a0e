//! Work order entity model and DTOs.

use maintrack_core::types::{Date, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `work_orders` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WorkOrder {
    pub id: DbId,
    pub machine_id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub issue_type: String,
    pub priority: String,
    pub status: String,
    pub assigned_to: Option<String>,
    pub due_date: Option<Date>,
    pub photo_url: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub completed_at: Option<Timestamp>,
}

/// A work order joined with its machine's name, for list views.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WorkOrderWithMachine {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub work_order: WorkOrder,
    pub machine_name: String,
}

/// DTO for creating a work order.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateWorkOrder {
    pub machine_id: DbId,
    pub title: String,
    pub description: Option<String>,
    /// Defaults to `other` if omitted.
    pub issue_type: Option<String>,
    /// Defaults to `medium` if omitted.
    pub priority: Option<String>,
    pub assigned_to: Option<String>,
    pub due_date: Option<Date>,
}

/// DTO for updating a work order. All fields are optional.
///
/// `completed_at` is not client-writable; the handler resolves it from the
/// status transition.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateWorkOrder {
    pub title: Option<String>,
    pub description: Option<String>,
    pub issue_type: Option<String>,
    pub priority: Option<String>,
    pub status: Option<String>,
    pub assigned_to: Option<String>,
    pub due_date: Option<Date>,
}

/// Query filters for the work-order list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkOrderListParams {
    /// `all`, `active` or an exact status.
    pub status: Option<String>,
    pub priority: Option<String>,
    pub machine_id: Option<DbId>,
    /// Case-insensitive match on title or description.
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
