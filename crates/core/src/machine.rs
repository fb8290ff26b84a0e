//! Machine status values and the transition guard.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::CoreError;

pub const STATUS_RUNNING: &str = "running";
pub const STATUS_MAINTENANCE_DUE: &str = "maintenance_due";
pub const STATUS_BREAKDOWN: &str = "breakdown";
pub const STATUS_OFFLINE: &str = "offline";
pub const STATUS_DECOMMISSIONED: &str = "decommissioned";

/// All valid machine statuses.
pub const VALID_STATUSES: &[&str] = &[
    STATUS_RUNNING,
    STATUS_MAINTENANCE_DUE,
    STATUS_BREAKDOWN,
    STATUS_OFFLINE,
    STATUS_DECOMMISSIONED,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MachineStatus {
    Running,
    MaintenanceDue,
    Breakdown,
    Offline,
    Decommissioned,
}

impl MachineStatus {
    /// Return the database string representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Running => STATUS_RUNNING,
            Self::MaintenanceDue => STATUS_MAINTENANCE_DUE,
            Self::Breakdown => STATUS_BREAKDOWN,
            Self::Offline => STATUS_OFFLINE,
            Self::Decommissioned => STATUS_DECOMMISSIONED,
        }
    }

    /// Decommissioned machines never come back.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Decommissioned)
    }

    /// Whether a machine in this status may be moved to `to`.
    ///
    /// Every status may follow every other one, except that nothing follows
    /// `decommissioned`. Staying in the same status is always allowed.
    pub fn can_transition_to(self, to: MachineStatus) -> bool {
        self == to || !self.is_terminal()
    }

    /// Validate a transition, returning a validation error for illegal ones.
    pub fn validate_transition(self, to: MachineStatus) -> Result<(), CoreError> {
        if self.can_transition_to(to) {
            Ok(())
        } else {
            Err(CoreError::Validation(format!(
                "Invalid machine status transition: {self} -> {to}"
            )))
        }
    }
}

impl fmt::Display for MachineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MachineStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            STATUS_RUNNING => Ok(Self::Running),
            STATUS_MAINTENANCE_DUE => Ok(Self::MaintenanceDue),
            STATUS_BREAKDOWN => Ok(Self::Breakdown),
            STATUS_OFFLINE => Ok(Self::Offline),
            STATUS_DECOMMISSIONED => Ok(Self::Decommissioned),
            other => Err(CoreError::Validation(format!(
                "Unknown machine status: '{other}'. Valid statuses: {}",
                VALID_STATUSES.join(", ")
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_statuses_move_freely() {
        assert!(MachineStatus::Running.can_transition_to(MachineStatus::Breakdown));
        assert!(MachineStatus::Breakdown.can_transition_to(MachineStatus::Running));
        assert!(MachineStatus::Offline.can_transition_to(MachineStatus::Decommissioned));
    }

    #[test]
    fn decommissioned_is_terminal() {
        assert!(!MachineStatus::Decommissioned.can_transition_to(MachineStatus::Running));
        assert!(MachineStatus::Decommissioned.can_transition_to(MachineStatus::Decommissioned));
        assert!(MachineStatus::Decommissioned
            .validate_transition(MachineStatus::Breakdown)
            .is_err());
    }

    #[test]
    fn parse_rejects_unknown() {
        assert_eq!(
            "maintenance_due".parse::<MachineStatus>().unwrap(),
            MachineStatus::MaintenanceDue
        );
        assert!("broken".parse::<MachineStatus>().is_err());
    }
}
