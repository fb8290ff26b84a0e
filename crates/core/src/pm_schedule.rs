//! Derived PM schedule status and list filters.
//!
//! The status is never stored; it is computed from `is_active`,
//! `next_due_date` and the current date every time a schedule is read.

use std::str::FromStr;

use chrono::Days;
use serde::Serialize;

use crate::error::CoreError;
use crate::types::Date;

/// A schedule due within this many days is "due soon".
pub const DUE_SOON_HORIZON_DAYS: u64 = 7;

/// Display status of a PM schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PmStatus {
    Inactive,
    NoDate,
    Overdue,
    DueSoon,
    OnTrack,
}

impl PmStatus {
    /// Derive the status for a schedule as of `today`.
    ///
    /// A schedule due today is not overdue; it becomes overdue the next day.
    pub fn derive(is_active: bool, next_due_date: Option<Date>, today: Date) -> Self {
        if !is_active {
            return Self::Inactive;
        }
        let Some(due) = next_due_date else {
            return Self::NoDate;
        };
        if due < today {
            Self::Overdue
        } else if due <= due_soon_limit(today) {
            Self::DueSoon
        } else {
            Self::OnTrack
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Inactive => "Inactive",
            Self::NoDate => "No date set",
            Self::Overdue => "Overdue",
            Self::DueSoon => "Due Soon",
            Self::OnTrack => "On Track",
        }
    }
}

fn due_soon_limit(today: Date) -> Date {
    today
        .checked_add_days(Days::new(DUE_SOON_HORIZON_DAYS))
        .unwrap_or(Date::MAX)
}

/// Filter applied by the PM schedule list endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PmFilter {
    #[default]
    All,
    /// Active schedules whose due date has passed.
    Overdue,
    /// Active schedules due between today and the due-soon horizon.
    Upcoming,
    /// Deactivated schedules.
    Inactive,
}

impl PmFilter {
    /// Whether a schedule passes this filter as of `today`.
    pub fn matches(self, is_active: bool, next_due_date: Option<Date>, today: Date) -> bool {
        match self {
            Self::All => true,
            Self::Inactive => !is_active,
            Self::Overdue => {
                PmStatus::derive(is_active, next_due_date, today) == PmStatus::Overdue
            }
            Self::Upcoming => {
                PmStatus::derive(is_active, next_due_date, today) == PmStatus::DueSoon
            }
        }
    }
}

impl FromStr for PmFilter {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "overdue" => Ok(Self::Overdue),
            "upcoming" => Ok(Self::Upcoming),
            "inactive" => Ok(Self::Inactive),
            other => Err(CoreError::Validation(format!(
                "Unknown PM filter: '{other}'. Valid filters: all, overdue, upcoming, inactive"
            ))),
        }
    }
}

/// Number of active schedules that are overdue as of `today`.
pub fn count_overdue<I>(schedules: I, today: Date) -> usize
where
    I: IntoIterator<Item = (bool, Option<Date>)>,
{
    schedules
        .into_iter()
        .filter(|&(active, due)| PmStatus::derive(active, due, today) == PmStatus::Overdue)
        .count()
}
