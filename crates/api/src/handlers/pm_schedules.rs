//! Handlers for the `/pm-schedules` resource.
//!
//! The derived status (`overdue`, `due_soon`, ...) is computed against the
//! current UTC date on every read and attached to each schedule.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use maintrack_core::error::CoreError;
use maintrack_core::pm_schedule::{PmFilter, PmStatus};
use maintrack_core::recurrence::{complete_pm, Frequency};
use maintrack_core::types::{Date, DbId};
use maintrack_db::models::pm_schedule::{
    CompletePmSchedule, CreatePmSchedule, PmSchedule, UpdatePmSchedule,
};
use maintrack_db::repositories::PmScheduleRepo;
use maintrack_db::DbPool;
use serde::{Deserialize, Serialize};

use super::{require_text, require_text_if_present};
use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// A schedule with its derived status.
#[derive(Debug, Serialize)]
pub struct PmScheduleView<T: Serialize> {
    #[serde(flatten)]
    pub schedule: T,
    pub status: PmStatus,
    pub status_label: &'static str,
}

impl<T: Serialize> PmScheduleView<T> {
    fn new(schedule: T, status: PmStatus) -> Self {
        Self {
            schedule,
            status,
            status_label: status.label(),
        }
    }
}

/// Query parameters for `GET /pm-schedules`.
#[derive(Debug, Default, Deserialize)]
pub struct PmListParams {
    /// `all`, `overdue`, `upcoming` or `inactive`.
    pub filter: Option<String>,
}

fn today() -> Date {
    chrono::Utc::now().date_naive()
}

/// Verify that a schedule exists, returning the full row.
async fn ensure_schedule_exists(pool: &DbPool, id: DbId) -> AppResult<PmSchedule> {
    PmScheduleRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "PmSchedule",
            id,
        }))
}

/// GET /api/v1/pm-schedules
///
/// List schedules soonest-due first (undated last) with their derived
/// status, narrowed by `filter`.
pub async fn list_pm_schedules(
    State(state): State<AppState>,
    Query(params): Query<PmListParams>,
) -> AppResult<impl IntoResponse> {
    let filter = params
        .filter
        .as_deref()
        .map(str::parse::<PmFilter>)
        .transpose()?
        .unwrap_or_default();
    let today = today();

    let schedules: Vec<_> = PmScheduleRepo::list_with_machine(&state.pool)
        .await?
        .into_iter()
        .filter(|row| {
            filter.matches(row.schedule.is_active, row.schedule.next_due_date, today)
        })
        .map(|row| {
            let status = row.schedule.status_on(today);
            PmScheduleView::new(row, status)
        })
        .collect();

    Ok(Json(DataResponse { data: schedules }))
}

/// GET /api/v1/pm-schedules/{id}
pub async fn get_pm_schedule(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let schedule = ensure_schedule_exists(&state.pool, id).await?;
    let status = schedule.status_on(today());

    Ok(Json(DataResponse {
        data: PmScheduleView::new(schedule, status),
    }))
}

/// POST /api/v1/pm-schedules
///
/// Create a schedule. `frequency` defaults to `monthly`.
pub async fn create_pm_schedule(
    State(state): State<AppState>,
    Json(input): Json<CreatePmSchedule>,
) -> AppResult<impl IntoResponse> {
    require_text("task_name", &input.task_name)?;
    if let Some(frequency) = &input.frequency {
        frequency.parse::<Frequency>()?;
    }

    let schedule = PmScheduleRepo::create(&state.pool, &input).await?;
    let status = schedule.status_on(today());

    tracing::info!(
        pm_schedule_id = schedule.id,
        machine_id = schedule.machine_id,
        frequency = %schedule.frequency,
        "PM schedule created",
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: PmScheduleView::new(schedule, status),
        }),
    ))
}

/// PUT /api/v1/pm-schedules/{id}
pub async fn update_pm_schedule(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdatePmSchedule>,
) -> AppResult<impl IntoResponse> {
    require_text_if_present("task_name", input.task_name.as_deref())?;
    if let Some(frequency) = &input.frequency {
        frequency.parse::<Frequency>()?;
    }

    let schedule = PmScheduleRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "PmSchedule",
            id,
        }))?;
    let status = schedule.status_on(today());

    tracing::info!(pm_schedule_id = id, "PM schedule updated");

    Ok(Json(DataResponse {
        data: PmScheduleView::new(schedule, status),
    }))
}

/// POST /api/v1/pm-schedules/{id}/complete
///
/// Mark the task done on `completed_on` (default today). The next due date
/// is recomputed from the completion date, not the previous due date. The
/// body may be omitted entirely.
pub async fn complete_pm_schedule(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    input: Option<Json<CompletePmSchedule>>,
) -> AppResult<impl IntoResponse> {
    let input = input.map(|Json(body)| body).unwrap_or_default();
    let existing = ensure_schedule_exists(&state.pool, id).await?;
    let frequency = existing.frequency.parse::<Frequency>()?;
    let today = today();

    let completion = complete_pm(frequency, input.completed_on.unwrap_or(today))?;

    let schedule = PmScheduleRepo::mark_complete(&state.pool, id, &completion)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "PmSchedule",
            id,
        }))?;
    let status = schedule.status_on(today);

    tracing::info!(
        pm_schedule_id = id,
        completed_on = %completion.last_completed_date,
        next_due = %completion.next_due_date,
        "PM task completed",
    );

    Ok(Json(DataResponse {
        data: PmScheduleView::new(schedule, status),
    }))
}

/// DELETE /api/v1/pm-schedules/{id}
pub async fn delete_pm_schedule(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let deleted = PmScheduleRepo::delete(&state.pool, id).await?;

    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "PmSchedule",
            id,
        }));
    }

    tracing::info!(pm_schedule_id = id, "PM schedule deleted");

    Ok(StatusCode::NO_CONTENT)
}
