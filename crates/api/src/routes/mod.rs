pub mod dashboard;
pub mod downtime;
pub mod health;
pub mod machines;
pub mod pm_schedules;
pub mod work_orders;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /ws                                  WebSocket change feed
///
/// /machines                            list (?status, search), create
/// /machines/available                  machines with no active downtime
/// /machines/{id}                       get, update, delete
/// /machines/{id}/photo                 upload photo (multipart POST)
///
/// /work-orders                         list (?status, priority, machine_id, search, limit, offset), create
/// /work-orders/{id}                    get, update, delete
/// /work-orders/{id}/photo              upload photo (multipart POST)
///
/// /pm-schedules                        list (?filter), create
/// /pm-schedules/{id}                   get, update, delete
/// /pm-schedules/{id}/complete          mark complete (POST)
///
/// /downtime                            active + history + rollup (?limit), start
/// /downtime/{id}                       delete
/// /downtime/{id}/end                   end (POST)
///
/// /dashboard/summary                   KPIs and recent work orders
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // WebSocket change feed.
        .route("/ws", get(ws::ws_handler))
        // Machines, including photo upload.
        .nest("/machines", machines::router())
        .nest("/work-orders", work_orders::router())
        // PM schedules and completion.
        .nest("/pm-schedules", pm_schedules::router())
        // Downtime logging.
        .nest("/downtime", downtime::router())
        .nest("/dashboard", dashboard::router())
}
