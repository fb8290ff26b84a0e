//! Route definitions for downtime logging.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::downtime;
use crate::state::AppState;

/// Downtime routes mounted at `/downtime`.
///
/// ```text
/// GET    /                -> list_downtime (?limit)
/// POST   /                -> start_downtime
/// DELETE /{id}            -> delete_downtime
/// POST   /{id}/end        -> end_downtime
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(downtime::list_downtime).post(downtime::start_downtime),
        )
        .route("/{id}", delete(downtime::delete_downtime))
        .route("/{id}/end", post(downtime::end_downtime))
}
