use axum::routing::get;
use axum::Router;

use crate::handlers::dashboard;
use crate::state::AppState;

/// Dashboard routes mounted at `/dashboard`.
///
/// ```text
/// GET  /summary   -> dashboard_summary
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/summary", get(dashboard::dashboard_summary))
}
