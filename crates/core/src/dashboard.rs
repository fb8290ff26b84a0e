//! Dashboard KPI reduction.
//!
//! Callers feed in the already-fetched rows; everything here is a single
//! pass over each collection with no hidden state.

use serde::Serialize;

use crate::downtime::minutes_to_hours_1dp;
use crate::machine::MachineStatus;
use crate::pm_schedule::count_overdue;
use crate::types::Date;
use crate::work_order::{is_overdue, WorkOrderStatus};

/// Headline numbers for the maintenance dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct DashboardStats {
    pub total_machines: usize,
    pub running_machines: usize,
    pub maintenance_due_machines: usize,
    pub breakdown_machines: usize,
    /// Open, assigned and in-progress work orders.
    pub open_work_orders: usize,
    pub overdue_work_orders: usize,
    /// Active PM schedules past their due date.
    pub overdue_pm_schedules: usize,
    /// Closed downtime in hours, one decimal place.
    pub total_downtime_hours: f64,
}

impl DashboardStats {
    /// Reduce the four collections into the dashboard numbers as of `today`.
    ///
    /// - `machines`: one status per machine
    /// - `work_orders`: `(status, due_date)` per order
    /// - `pm_schedules`: `(is_active, next_due_date)` per schedule
    /// - `closed_downtime_minutes`: `duration_minutes` of every closed log
    pub fn compute<M, W, P, D>(
        machines: M,
        work_orders: W,
        pm_schedules: P,
        closed_downtime_minutes: D,
        today: Date,
    ) -> Self
    where
        M: IntoIterator<Item = MachineStatus>,
        W: IntoIterator<Item = (WorkOrderStatus, Option<Date>)>,
        P: IntoIterator<Item = (bool, Option<Date>)>,
        D: IntoIterator<Item = i64>,
    {
        let mut stats = Self::default();

        for status in machines {
            stats.total_machines += 1;
            match status {
                MachineStatus::Running => stats.running_machines += 1,
                MachineStatus::MaintenanceDue => stats.maintenance_due_machines += 1,
                MachineStatus::Breakdown => stats.breakdown_machines += 1,
                MachineStatus::Offline | MachineStatus::Decommissioned => {}
            }
        }

        for (status, due_date) in work_orders {
            if status.is_active() {
                stats.open_work_orders += 1;
            }
            if is_overdue(status, due_date, today) {
                stats.overdue_work_orders += 1;
            }
        }

        stats.overdue_pm_schedules = count_overdue(pm_schedules, today);
        stats.total_downtime_hours = minutes_to_hours_1dp(closed_downtime_minutes.into_iter().sum());

        stats
    }
}
