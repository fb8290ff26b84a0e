//! Route definitions for the `/work-orders` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{photos, work_orders};
use crate::state::AppState;

/// Work-order routes mounted at `/work-orders`.
///
/// ```text
/// GET    /                -> list_work_orders (?status, priority, machine_id, search, limit, offset)
/// POST   /                -> create_work_order
/// GET    /{id}            -> get_work_order
/// PUT    /{id}            -> update_work_order
/// DELETE /{id}            -> delete_work_order
/// POST   /{id}/photo      -> upload_work_order_photo (multipart)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(work_orders::list_work_orders).post(work_orders::create_work_order),
        )
        .route(
            "/{id}",
            get(work_orders::get_work_order)
                .put(work_orders::update_work_order)
                .delete(work_orders::delete_work_order),
        )
        .route("/{id}/photo", post(photos::upload_work_order_photo))
}
