//! Route definitions for the `/pm-schedules` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::pm_schedules;
use crate::state::AppState;

/// PM schedule routes mounted at `/pm-schedules`.
///
/// ```text
/// GET    /                -> list_pm_schedules (?filter=all|overdue|upcoming|inactive)
/// POST   /                -> create_pm_schedule
/// GET    /{id}            -> get_pm_schedule
/// PUT    /{id}            -> update_pm_schedule
/// DELETE /{id}            -> delete_pm_schedule
/// POST   /{id}/complete   -> complete_pm_schedule
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(pm_schedules::list_pm_schedules).post(pm_schedules::create_pm_schedule),
        )
        .route(
            "/{id}",
            get(pm_schedules::get_pm_schedule)
                .put(pm_schedules::update_pm_schedule)
                .delete(pm_schedules::delete_pm_schedule),
        )
        .route("/{id}/complete", post(pm_schedules::complete_pm_schedule))
}
