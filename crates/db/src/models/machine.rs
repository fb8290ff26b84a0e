//! Machine entity model and DTOs.

use maintrack_core::types::{Date, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `machines` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Machine {
    pub id: DbId,
    pub name: String,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub location: String,
    pub status: String,
    pub notes: Option<String>,
    pub photo_url: Option<String>,
    pub installed_at: Option<Date>,
    pub last_maintained_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a machine.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateMachine {
    pub name: String,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub location: String,
    /// Defaults to `running` if omitted.
    pub status: Option<String>,
    pub notes: Option<String>,
    pub installed_at: Option<Date>,
}

/// DTO for updating a machine. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateMachine {
    pub name: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub location: Option<String>,
    pub status: Option<String>,
    pub notes: Option<String>,
    pub installed_at: Option<Date>,
    pub last_maintained_at: Option<Timestamp>,
}

/// Query filters for the machine list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MachineListParams {
    pub status: Option<String>,
    /// Case-insensitive match on name, location or model.
    pub search: Option<String>,
}
