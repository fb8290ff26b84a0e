//! Preventive-maintenance recurrence.
//!
//! [`compute_next_due`] adds a fixed calendar offset to the completion date.
//! The anchor is always the day the task was completed, never the previous
//! due date, so a late completion shifts the whole future schedule.
//!
//! Month-based offsets clamp to the last valid day of the target month
//! (`2024-01-31 + 1 month = 2024-02-29`), which is chrono's [`Months`]
//! semantics. They never overflow into the following month.

use std::fmt;
use std::str::FromStr;

use chrono::{Days, Months};
use serde::Serialize;

use crate::error::CoreError;
use crate::types::Date;

// ---------------------------------------------------------------------------
// Frequency
// ---------------------------------------------------------------------------

/// Every frequency value accepted in the `pm_schedules.frequency` column.
pub const VALID_FREQUENCIES: &[&str] = &[
    "daily",
    "weekly",
    "monthly",
    "quarterly",
    "semi_annual",
    "annual",
];

/// How often a PM task recurs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    SemiAnnual,
    Annual,
}

/// Calendar offset added by one recurrence step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Days(u64),
    Months(u32),
}

impl Frequency {
    /// All variants, in ascending period order.
    pub const ALL: [Frequency; 6] = [
        Self::Daily,
        Self::Weekly,
        Self::Monthly,
        Self::Quarterly,
        Self::SemiAnnual,
        Self::Annual,
    ];

    /// Return the database string representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::SemiAnnual => "semi_annual",
            Self::Annual => "annual",
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Daily => "Daily",
            Self::Weekly => "Weekly",
            Self::Monthly => "Monthly",
            Self::Quarterly => "Quarterly",
            Self::SemiAnnual => "Semi-Annual",
            Self::Annual => "Annual",
        }
    }

    fn step(self) -> Step {
        match self {
            Self::Daily => Step::Days(1),
            Self::Weekly => Step::Days(7),
            Self::Monthly => Step::Months(1),
            Self::Quarterly => Step::Months(3),
            Self::SemiAnnual => Step::Months(6),
            Self::Annual => Step::Months(12),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Unknown frequency: '{s}'. Valid frequencies: {}",
                    VALID_FREQUENCIES.join(", ")
                ))
            })
    }
}

// ---------------------------------------------------------------------------
// Calculator
// ---------------------------------------------------------------------------

/// Compute the next due date for a task completed on `from`.
///
/// Panics if the result falls outside chrono's representable range. Dates
/// that arrive from a client go through [`checked_next_due`] instead.
pub fn compute_next_due(frequency: Frequency, from: Date) -> Date {
    checked_next_due(frequency, from).unwrap_or_else(|e| panic!("{e}"))
}

/// Like [`compute_next_due`], but an unrepresentable result is a
/// `Validation` error.
pub fn checked_next_due(frequency: Frequency, from: Date) -> Result<Date, CoreError> {
    let next = match frequency.step() {
        Step::Days(n) => from.checked_add_days(Days::new(n)),
        Step::Months(n) => from.checked_add_months(Months::new(n)),
    };
    next.ok_or_else(|| {
        CoreError::Validation(format!(
            "Next due date for {from} + {frequency} is out of range"
        ))
    })
}

/// The two columns written when a PM task is marked complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PmCompletion {
    pub last_completed_date: Date,
    pub next_due_date: Date,
}

/// Mark a task with `frequency` complete on `completed_on`.
pub fn complete_pm(frequency: Frequency, completed_on: Date) -> Result<PmCompletion, CoreError> {
    Ok(PmCompletion {
        last_completed_date: completed_on,
        next_due_date: checked_next_due(frequency, completed_on)?,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
