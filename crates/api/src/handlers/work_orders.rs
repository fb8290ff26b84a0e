//! Handlers for the `/work-orders` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use maintrack_core::error::CoreError;
use maintrack_core::search::{clamp_limit, clamp_offset, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT};
use maintrack_core::types::DbId;
use maintrack_core::work_order::{
    resolve_completed_at, state_machine, Priority, StatusFilter, WorkOrderStatus,
};
use maintrack_db::models::work_order::{
    CreateWorkOrder, UpdateWorkOrder, WorkOrder, WorkOrderListParams,
};
use maintrack_db::repositories::work_order_repo::WorkOrderQuery;
use maintrack_db::repositories::WorkOrderRepo;
use maintrack_db::DbPool;

use super::{require_text, require_text_if_present};
use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Verify that a work order exists, returning the full row.
pub(crate) async fn ensure_work_order_exists(pool: &DbPool, id: DbId) -> AppResult<WorkOrder> {
    WorkOrderRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "WorkOrder",
            id,
        }))
}

/// GET /api/v1/work-orders
///
/// List work orders newest first. `status` accepts `all`, `active`
/// (open, assigned, in progress) or an exact status; `priority` an exact
/// priority; `search` matches title and description.
pub async fn list_work_orders(
    State(state): State<AppState>,
    Query(params): Query<WorkOrderListParams>,
) -> AppResult<impl IntoResponse> {
    let status_filter = params
        .status
        .as_deref()
        .map(str::parse::<StatusFilter>)
        .transpose()?
        .unwrap_or(StatusFilter::All);
    let priority = params
        .priority
        .as_deref()
        .map(str::parse::<Priority>)
        .transpose()?;

    let query = WorkOrderQuery {
        statuses: match status_filter {
            StatusFilter::All => None,
            filter => Some(filter.statuses()),
        },
        priority: priority.map(Priority::as_str),
        machine_id: params.machine_id,
        search: params.search.as_deref(),
        limit: clamp_limit(params.limit, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT),
        offset: clamp_offset(params.offset),
    };

    let work_orders = WorkOrderRepo::list_filtered(&state.pool, &query).await?;

    Ok(Json(DataResponse { data: work_orders }))
}

/// GET /api/v1/work-orders/{id}
pub async fn get_work_order(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let work_order = ensure_work_order_exists(&state.pool, id).await?;

    Ok(Json(DataResponse { data: work_order }))
}

/// POST /api/v1/work-orders
///
/// Raise a work order against a machine. New orders start `open`.
pub async fn create_work_order(
    State(state): State<AppState>,
    Json(input): Json<CreateWorkOrder>,
) -> AppResult<impl IntoResponse> {
    require_text("title", &input.title)?;
    if let Some(priority) = &input.priority {
        priority.parse::<Priority>()?;
    }

    let work_order = WorkOrderRepo::create(&state.pool, &input).await?;

    tracing::info!(
        work_order_id = work_order.id,
        machine_id = work_order.machine_id,
        priority = %work_order.priority,
        "Work order created",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: work_order })))
}

/// PUT /api/v1/work-orders/{id}
///
/// Update a work order. Status changes must follow the lifecycle; entering
/// `completed` or `cancelled` stamps `completed_at`, which is kept on later
/// edits.
pub async fn update_work_order(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateWorkOrder>,
) -> AppResult<impl IntoResponse> {
    require_text_if_present("title", input.title.as_deref())?;
    if let Some(priority) = &input.priority {
        priority.parse::<Priority>()?;
    }

    let existing = ensure_work_order_exists(&state.pool, id).await?;
    let from = existing.status.parse::<WorkOrderStatus>().map_err(|_| {
        AppError::InternalError(format!(
            "Work order {id} has unrecognised status '{}'",
            existing.status
        ))
    })?;

    let to = match &input.status {
        Some(status) => {
            let to = status.parse::<WorkOrderStatus>()?;
            state_machine::validate_transition(from, to)?;
            to
        }
        None => from,
    };

    let completed_at = resolve_completed_at(to, existing.completed_at, chrono::Utc::now());

    let work_order = WorkOrderRepo::update(&state.pool, id, &input, completed_at)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "WorkOrder",
            id,
        }))?;

    if from != to {
        tracing::info!(work_order_id = id, from = %from, to = %to, "Work order status changed");
    } else {
        tracing::info!(work_order_id = id, "Work order updated");
    }

    Ok(Json(DataResponse { data: work_order }))
}

/// DELETE /api/v1/work-orders/{id}
pub async fn delete_work_order(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let deleted = WorkOrderRepo::delete(&state.pool, id).await?;

    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "WorkOrder",
            id,
        }));
    }

    tracing::info!(work_order_id = id, "Work order deleted");

    Ok(StatusCode::NO_CONTENT)
}
