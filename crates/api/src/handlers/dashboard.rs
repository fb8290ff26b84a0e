//! Handler for the dashboard summary.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use maintrack_core::dashboard::DashboardStats;
use maintrack_core::machine::MachineStatus;
use maintrack_core::work_order::WorkOrderStatus;
use maintrack_db::models::work_order::WorkOrderWithMachine;
use maintrack_db::repositories::{DowntimeLogRepo, MachineRepo, PmScheduleRepo, WorkOrderRepo};
use serde::Serialize;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// Number of work orders shown in the "recent" panel.
const RECENT_WORK_ORDERS: i64 = 5;

#[derive(Debug, Serialize)]
pub struct DashboardSummary {
    #[serde(flatten)]
    pub stats: DashboardStats,
    pub recent_work_orders: Vec<WorkOrderWithMachine>,
}

/// GET /api/v1/dashboard/summary
///
/// Headline counts across machines, work orders, PM schedules and downtime,
/// plus the most recently created work orders.
pub async fn dashboard_summary(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let pool = &state.pool;
    let today = chrono::Utc::now().date_naive();

    let (machines, work_orders, pm_schedules, downtime, recent_work_orders) = tokio::try_join!(
        MachineRepo::list_statuses(pool),
        WorkOrderRepo::list_status_due_dates(pool),
        PmScheduleRepo::list_active_due_dates(pool),
        DowntimeLogRepo::list_closed_durations(pool),
        WorkOrderRepo::list_recent(pool, RECENT_WORK_ORDERS),
    )?;

    // Unrecognised statuses are skipped.
    let machine_statuses = machines
        .iter()
        .filter_map(|s| s.parse::<MachineStatus>().ok());
    let work_order_rows = work_orders.iter().filter_map(|(status, due)| {
        status
            .parse::<WorkOrderStatus>()
            .ok()
            .map(|s| (s, *due))
    });

    let stats = DashboardStats::compute(
        machine_statuses,
        work_order_rows,
        pm_schedules,
        downtime,
        today,
    );

    Ok(Json(DataResponse {
        data: DashboardSummary {
            stats,
            recent_work_orders,
        },
    }))
}
