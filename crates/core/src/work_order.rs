//! Work-order priority, status lifecycle and completion bookkeeping.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::CoreError;
use crate::types::{Date, Timestamp};

// ---------------------------------------------------------------------------
// Priority
// ---------------------------------------------------------------------------

/// All valid priorities, lowest first.
pub const VALID_PRIORITIES: &[&str] = &["low", "medium", "high", "critical"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl FromStr for Priority {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "critical" => Ok(Self::Critical),
            other => Err(CoreError::Validation(format!(
                "Unknown priority: '{other}'. Valid priorities: {}",
                VALID_PRIORITIES.join(", ")
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// All valid work-order statuses.
pub const VALID_STATUSES: &[&str] = &["open", "assigned", "in_progress", "completed", "cancelled"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkOrderStatus {
    Open,
    Assigned,
    InProgress,
    Completed,
    Cancelled,
}

impl WorkOrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Assigned => "assigned",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Completed and cancelled orders are closed for good.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Open, assigned and in-progress orders count as outstanding work.
    pub fn is_active(self) -> bool {
        !self.is_terminal()
    }
}

impl fmt::Display for WorkOrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkOrderStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(Self::Open),
            "assigned" => Ok(Self::Assigned),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(CoreError::Validation(format!(
                "Unknown work order status: '{other}'. Valid statuses: {}",
                VALID_STATUSES.join(", ")
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

pub mod state_machine {
    use super::WorkOrderStatus::{self, *};
    use crate::error::CoreError;

    /// Statuses reachable from `from` in one step.
    ///
    /// Terminal states return an empty slice.
    pub fn valid_transitions(from: WorkOrderStatus) -> &'static [WorkOrderStatus] {
        match from {
            Open => &[Assigned, InProgress, Completed, Cancelled],
            Assigned => &[Open, InProgress, Completed, Cancelled],
            InProgress => &[Assigned, Completed, Cancelled],
            Completed | Cancelled => &[],
        }
    }

    /// Staying in the same status is always allowed.
    pub fn can_transition(from: WorkOrderStatus, to: WorkOrderStatus) -> bool {
        from == to || valid_transitions(from).contains(&to)
    }

    pub fn validate_transition(from: WorkOrderStatus, to: WorkOrderStatus) -> Result<(), CoreError> {
        if can_transition(from, to) {
            Ok(())
        } else {
            Err(CoreError::Validation(format!(
                "Invalid work order status transition: {from} -> {to}"
            )))
        }
    }
}

// ---------------------------------------------------------------------------
// Completion bookkeeping
// ---------------------------------------------------------------------------

/// The `completed_at` value after moving an order into status `to`.
///
/// `completed_at` stays null while the order is open, is stamped with `now`
/// on the transition into a terminal status, and is never overwritten once
/// set.
pub fn resolve_completed_at(
    to: WorkOrderStatus,
    existing: Option<Timestamp>,
    now: Timestamp,
) -> Option<Timestamp> {
    if to.is_terminal() {
        Some(existing.unwrap_or(now))
    } else {
        None
    }
}

/// An outstanding order whose due date is in the past.
pub fn is_overdue(status: WorkOrderStatus, due_date: Option<Date>, today: Date) -> bool {
    match due_date {
        Some(due) => status.is_active() && due < today,
        None => false,
    }
}

/// Status groups accepted by the work-order list endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    All,
    Active,
    Exactly(WorkOrderStatus),
}

impl StatusFilter {
    pub fn matches(self, status: WorkOrderStatus) -> bool {
        match self {
            Self::All => true,
            Self::Active => status.is_active(),
            Self::Exactly(s) => s == status,
        }
    }

    /// The concrete statuses this filter admits, for SQL `= ANY($n)`.
    pub fn statuses(self) -> Vec<&'static str> {
        VALID_STATUSES
            .iter()
            .copied()
            .filter(|s| {
                s.parse::<WorkOrderStatus>()
                    .map(|st| self.matches(st))
                    .unwrap_or(false)
            })
            .collect()
    }
}

impl FromStr for StatusFilter {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "active" => Ok(Self::Active),
            other => other.parse().map(Self::Exactly),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::state_machine::*;
    use super::WorkOrderStatus::*;
    use super::*;

    fn ts(h: u32) -> Timestamp {
        chrono::Utc.with_ymd_and_hms(2024, 4, 1, h, 0, 0).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn open_can_start_or_finish() {
        assert!(can_transition(Open, InProgress));
        assert!(can_transition(Open, Completed));
        assert!(can_transition(Open, Cancelled));
    }

    #[test]
    fn in_progress_cannot_reopen() {
        assert!(!can_transition(InProgress, Open));
        assert!(can_transition(InProgress, Assigned));
    }

    #[test]
    fn terminal_states_have_no_transitions() {
        assert!(valid_transitions(Completed).is_empty());
        assert!(valid_transitions(Cancelled).is_empty());
        assert!(validate_transition(Completed, Open).is_err());
        assert!(validate_transition(Cancelled, InProgress).is_err());
    }

    #[test]
    fn same_status_is_allowed() {
        assert!(can_transition(Completed, Completed));
        assert!(can_transition(Open, Open));
    }

    #[test]
    fn completed_at_stays_null_while_open() {
        assert_eq!(resolve_completed_at(InProgress, None, ts(9)), None);
    }

    #[test]
    fn completed_at_set_on_entering_terminal() {
        assert_eq!(resolve_completed_at(Completed, None, ts(9)), Some(ts(9)));
        assert_eq!(resolve_completed_at(Cancelled, None, ts(10)), Some(ts(10)));
    }

    #[test]
    fn completed_at_never_overwritten() {
        assert_eq!(
            resolve_completed_at(Completed, Some(ts(9)), ts(12)),
            Some(ts(9))
        );
    }

    #[test]
    fn overdue_only_for_outstanding_orders() {
        let today = date(2024, 4, 10);
        assert!(is_overdue(Open, Some(date(2024, 4, 9)), today));
        assert!(!is_overdue(Open, Some(today), today));
        assert!(!is_overdue(Completed, Some(date(2024, 4, 1)), today));
        assert!(!is_overdue(InProgress, None, today));
    }

    #[test]
    fn status_filter_groups() {
        let active: StatusFilter = "active".parse().unwrap();
        assert_eq!(active.statuses(), vec!["open", "assigned", "in_progress"]);
        let exact: StatusFilter = "completed".parse().unwrap();
        assert_eq!(exact.statuses(), vec!["completed"]);
        assert_eq!("all".parse::<StatusFilter>().unwrap().statuses().len(), 5);
        assert!("done".parse::<StatusFilter>().is_err());
    }

    #[test]
    fn priorities_order_by_severity() {
        assert!(Priority::Critical > Priority::High);
        assert_eq!("high".parse::<Priority>().unwrap(), Priority::High);
    }
}
