//! Request handlers for the maintenance entities.
//!
//! Each submodule provides async handler functions for a single entity type.
//! Handlers parse and validate input with `maintrack_core`, delegate to the
//! corresponding repository in `maintrack_db`, and map errors via
//! [`AppError`](crate::error::AppError).

pub mod dashboard;
pub mod downtime;
pub mod machines;
pub mod photos;
pub mod pm_schedules;
pub mod work_orders;

use maintrack_core::error::CoreError;

use crate::error::AppResult;

/// Reject a required text field that is empty or whitespace.
pub(crate) fn require_text(field: &str, value: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(CoreError::Validation(format!("{field} must not be empty")).into());
    }
    Ok(())
}

/// Reject an optional text field that was supplied but is blank.
pub(crate) fn require_text_if_present(field: &str, value: Option<&str>) -> AppResult<()> {
    match value {
        Some(v) => require_text(field, v),
        None => Ok(()),
    }
}
