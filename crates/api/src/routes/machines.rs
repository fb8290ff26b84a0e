//! Route definitions for the `/machines` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{machines, photos};
use crate::state::AppState;

/// Machine routes mounted at `/machines`.
///
/// ```text
/// GET    /                -> list_machines (?status, search)
/// POST   /                -> create_machine
/// GET    /available       -> list_available_machines
/// GET    /{id}            -> get_machine
/// PUT    /{id}            -> update_machine
/// DELETE /{id}            -> delete_machine
/// POST   /{id}/photo      -> upload_machine_photo (multipart)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(machines::list_machines).post(machines::create_machine),
        )
        .route("/available", get(machines::list_available_machines))
        .route(
            "/{id}",
            get(machines::get_machine)
                .put(machines::update_machine)
                .delete(machines::delete_machine),
        )
        .route("/{id}/photo", post(photos::upload_machine_photo))
}
