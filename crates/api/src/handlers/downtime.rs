//! Handlers for the `/downtime` resource.
//!
//! Opening a log puts the machine into `breakdown`; closing the last active
//! log on a machine puts it back to `running`. The machine status write is
//! a second statement: if it fails the downtime change still stands and the
//! failure is logged.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use maintrack_core::downtime::{
    close_downtime, ensure_not_future, format_duration, live_elapsed_minutes, DowntimeRollup,
};
use maintrack_core::error::CoreError;
use maintrack_core::machine::MachineStatus;
use maintrack_core::search::{clamp_limit, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT};
use maintrack_core::types::{DbId, Timestamp};
use maintrack_db::models::downtime_log::{
    CreateDowntimeLog, DowntimeLogWithMachine, EndDowntimeLog,
};
use maintrack_db::repositories::{DowntimeLogRepo, MachineRepo};
use maintrack_db::DbPool;
use serde::Serialize;

use super::machines::{current_status, ensure_machine_exists};
use super::require_text;
use crate::error::{AppError, AppResult};
use crate::query::LimitParams;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// An active log with its live elapsed counter.
#[derive(Debug, Serialize)]
pub struct ActiveDowntime {
    #[serde(flatten)]
    pub log: DowntimeLogWithMachine,
    /// Whole minutes since `started_at`, as of the request.
    pub elapsed_minutes: i64,
    pub elapsed_label: String,
}

/// A closed log with its formatted duration.
#[derive(Debug, Serialize)]
pub struct ClosedDowntimeEntry {
    #[serde(flatten)]
    pub log: DowntimeLogWithMachine,
    pub duration_label: String,
}

/// Body of `GET /downtime`.
#[derive(Debug, Serialize)]
pub struct DowntimeOverview {
    pub active: Vec<ActiveDowntime>,
    pub history: Vec<ClosedDowntimeEntry>,
    pub rollup: DowntimeRollup,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Move a machine to `to` if it is not already there.
async fn sync_machine_status(pool: &DbPool, machine_id: DbId, to: MachineStatus) -> AppResult<()> {
    let machine = ensure_machine_exists(pool, machine_id).await?;
    let from = current_status(&machine)?;
    if from == to {
        return Ok(());
    }
    from.validate_transition(to)?;
    MachineRepo::update_status(pool, machine_id, to.as_str()).await?;
    tracing::info!(machine_id, from = %from, to = %to, "Machine status changed");
    Ok(())
}

/// Like [`sync_machine_status`], but a failure is logged and swallowed.
async fn set_machine_status_best_effort(pool: &DbPool, machine_id: DbId, to: MachineStatus) {
    if let Err(e) = sync_machine_status(pool, machine_id, to).await {
        tracing::warn!(
            machine_id,
            status = %to,
            error = %e,
            "Failed to update machine status after downtime change",
        );
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/downtime
///
/// Every active log with its live elapsed minutes, the `limit` most recent
/// closed logs (default 100), and a rollup over both.
pub async fn list_downtime(
    State(state): State<AppState>,
    Query(params): Query<LimitParams>,
) -> AppResult<impl IntoResponse> {
    let limit = clamp_limit(params.limit, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT);
    let now = chrono::Utc::now();

    let active = DowntimeLogRepo::list_active(&state.pool).await?;
    let history: Vec<DowntimeLogWithMachine> = DowntimeLogRepo::list_recent(&state.pool, limit)
        .await?
        .into_iter()
        .filter(|row| !row.log.is_active())
        .collect();

    let rollup = DowntimeRollup::from_logs(active.iter().chain(history.iter()));

    let active = active
        .into_iter()
        .map(|log| {
            let elapsed_minutes = live_elapsed_minutes(log.log.started_at, now);
            ActiveDowntime {
                log,
                elapsed_minutes,
                elapsed_label: format_duration(elapsed_minutes),
            }
        })
        .collect();

    let history = history
        .into_iter()
        .map(|log| ClosedDowntimeEntry {
            duration_label: format_duration(log.log.duration_minutes.unwrap_or(0)),
            log,
        })
        .collect();

    Ok(Json(DataResponse {
        data: DowntimeOverview {
            active,
            history,
            rollup,
        },
    }))
}

/// POST /api/v1/downtime
///
/// Open a downtime log and put the machine into `breakdown`. A machine can
/// have only one active log; a second one is rejected with 409.
pub async fn start_downtime(
    State(state): State<AppState>,
    Json(input): Json<CreateDowntimeLog>,
) -> AppResult<impl IntoResponse> {
    require_text("reason", &input.reason)?;

    let now: Timestamp = chrono::Utc::now();
    if let Some(started_at) = input.started_at {
        ensure_not_future("started_at", started_at, now)?;
    }

    let machine = ensure_machine_exists(&state.pool, input.machine_id).await?;
    current_status(&machine)?.validate_transition(MachineStatus::Breakdown)?;

    let log = DowntimeLogRepo::create(&state.pool, &input, now).await?;

    tracing::info!(
        downtime_log_id = log.id,
        machine_id = log.machine_id,
        reason = %log.reason,
        "Downtime started",
    );

    set_machine_status_best_effort(&state.pool, log.machine_id, MachineStatus::Breakdown).await;

    Ok((StatusCode::CREATED, Json(DataResponse { data: log })))
}

/// POST /api/v1/downtime/{id}/end
///
/// Close an active log at `ended_at` (default now), recording its duration.
/// When no other active log remains on the machine it goes back to
/// `running`. Ending an already-closed log is rejected with 409. The body
/// may be omitted entirely.
pub async fn end_downtime(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    input: Option<Json<EndDowntimeLog>>,
) -> AppResult<impl IntoResponse> {
    let input = input.map(|Json(body)| body).unwrap_or_default();
    let now: Timestamp = chrono::Utc::now();
    if let Some(ended_at) = input.ended_at {
        ensure_not_future("ended_at", ended_at, now)?;
    }

    let existing = DowntimeLogRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "DowntimeLog",
            id,
        }))?;

    let closed = close_downtime(
        existing.started_at,
        existing.ended_at,
        input.ended_at.unwrap_or(now),
    )?;

    let log = DowntimeLogRepo::close(&state.pool, id, &closed)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict(
                "Downtime log has already been ended".to_string(),
            ))
        })?;

    tracing::info!(
        downtime_log_id = id,
        machine_id = log.machine_id,
        duration_minutes = closed.duration_minutes,
        "Downtime ended",
    );

    match DowntimeLogRepo::count_other_active(&state.pool, log.machine_id, id).await {
        Ok(0) => {
            set_machine_status_best_effort(&state.pool, log.machine_id, MachineStatus::Running)
                .await;
        }
        Ok(remaining) => {
            tracing::info!(
                machine_id = log.machine_id,
                remaining,
                "Machine still has active downtime, status unchanged",
            );
        }
        Err(e) => {
            tracing::warn!(
                machine_id = log.machine_id,
                error = %e,
                "Failed to check remaining downtime, machine status unchanged",
            );
        }
    }

    Ok(Json(DataResponse { data: log }))
}

/// DELETE /api/v1/downtime/{id}
pub async fn delete_downtime(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let deleted = DowntimeLogRepo::delete(&state.pool, id).await?;

    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "DowntimeLog",
            id,
        }));
    }

    tracing::info!(downtime_log_id = id, "Downtime log deleted");

    Ok(StatusCode::NO_CONTENT)
}
