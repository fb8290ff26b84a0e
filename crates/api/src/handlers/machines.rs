//! Handlers for the `/machines` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use maintrack_core::error::CoreError;
use maintrack_core::machine::MachineStatus;
use maintrack_core::types::DbId;
use maintrack_db::models::machine::{CreateMachine, Machine, MachineListParams, UpdateMachine};
use maintrack_db::repositories::MachineRepo;
use maintrack_db::DbPool;

use super::{require_text, require_text_if_present};
use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Verify that a machine exists, returning the full row.
pub(crate) async fn ensure_machine_exists(pool: &DbPool, id: DbId) -> AppResult<Machine> {
    MachineRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Machine",
            id,
        }))
}

/// The stored status of `machine`, as the typed enum.
pub(crate) fn current_status(machine: &Machine) -> AppResult<MachineStatus> {
    machine.status.parse::<MachineStatus>().map_err(|_| {
        AppError::InternalError(format!(
            "Machine {} has unrecognised status '{}'",
            machine.id, machine.status
        ))
    })
}

/// GET /api/v1/machines
///
/// List machines ordered by name, optionally filtered by `status` and a
/// `search` term matched against name, location and model.
pub async fn list_machines(
    State(state): State<AppState>,
    Query(params): Query<MachineListParams>,
) -> AppResult<impl IntoResponse> {
    if let Some(status) = &params.status {
        status.parse::<MachineStatus>()?;
    }

    let machines = MachineRepo::list_filtered(&state.pool, &params).await?;

    Ok(Json(DataResponse { data: machines }))
}

/// GET /api/v1/machines/available
///
/// Machines with no active downtime log, for the "log downtime" picker.
pub async fn list_available_machines(
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let machines = MachineRepo::list_available(&state.pool).await?;

    Ok(Json(DataResponse { data: machines }))
}

/// GET /api/v1/machines/{id}
pub async fn get_machine(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let machine = ensure_machine_exists(&state.pool, id).await?;

    Ok(Json(DataResponse { data: machine }))
}

/// POST /api/v1/machines
///
/// Register a machine. `name` and `location` are required; `status`
/// defaults to `running`.
pub async fn create_machine(
    State(state): State<AppState>,
    Json(input): Json<CreateMachine>,
) -> AppResult<impl IntoResponse> {
    require_text("name", &input.name)?;
    require_text("location", &input.location)?;
    if let Some(status) = &input.status {
        status.parse::<MachineStatus>()?;
    }

    let machine = MachineRepo::create(&state.pool, &input).await?;

    tracing::info!(machine_id = machine.id, name = %machine.name, "Machine created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: machine })))
}

/// PUT /api/v1/machines/{id}
///
/// Update a machine. A status change must be a legal transition from the
/// current status.
pub async fn update_machine(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateMachine>,
) -> AppResult<impl IntoResponse> {
    require_text_if_present("name", input.name.as_deref())?;
    require_text_if_present("location", input.location.as_deref())?;

    let existing = ensure_machine_exists(&state.pool, id).await?;

    if let Some(status) = &input.status {
        let to = status.parse::<MachineStatus>()?;
        current_status(&existing)?.validate_transition(to)?;
    }

    let machine = MachineRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Machine",
            id,
        }))?;

    tracing::info!(machine_id = id, status = %machine.status, "Machine updated");

    Ok(Json(DataResponse { data: machine }))
}

/// DELETE /api/v1/machines/{id}
///
/// Delete a machine together with its work orders, schedules and downtime.
pub async fn delete_machine(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let deleted = MachineRepo::delete(&state.pool, id).await?;

    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Machine",
            id,
        }));
    }

    tracing::info!(machine_id = id, "Machine deleted");

    Ok(StatusCode::NO_CONTENT)
}
