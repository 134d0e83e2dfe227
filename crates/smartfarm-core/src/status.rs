//! Robot status machine and its rollup into the four-valued operation state
//! used for daily utilisation accounting.

use std::fmt;

use crate::error::SmartfarmError;

/// Persisted robot status string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RobotStatus {
    Working,
    Return,
    Waiting,
    Done,
    Charging,
    Error,
}

impl RobotStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RobotStatus::Working => "WORKING",
            RobotStatus::Return => "RETURN",
            RobotStatus::Waiting => "WAITING",
            RobotStatus::Done => "DONE",
            RobotStatus::Charging => "CHARGING",
            RobotStatus::Error => "ERROR",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, SmartfarmError> {
        match raw {
            "WORKING" => Ok(RobotStatus::Working),
            "RETURN" => Ok(RobotStatus::Return),
            "WAITING" => Ok(RobotStatus::Waiting),
            "DONE" => Ok(RobotStatus::Done),
            "CHARGING" => Ok(RobotStatus::Charging),
            "ERROR" => Ok(RobotStatus::Error),
            other => Err(SmartfarmError::MalformedPayload(format!(
                "unknown robot status: {other}"
            ))),
        }
    }
}

impl fmt::Display for RobotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The coarse, four-valued rollup of [`RobotStatus`] used for daily
/// utilisation accounting. `ERROR` time is never accumulated — see
/// [`RobotOperationState::from_status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RobotOperationState {
    Working,
    FullChargeIdle,
    Charging,
    Idle,
}

impl RobotOperationState {
    pub fn as_str(self) -> &'static str {
        match self {
            RobotOperationState::Working => "working",
            RobotOperationState::FullChargeIdle => "full_charge_idle",
            RobotOperationState::Charging => "charging",
            RobotOperationState::Idle => "idle",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, SmartfarmError> {
        match raw {
            "working" => Ok(RobotOperationState::Working),
            "full_charge_idle" => Ok(RobotOperationState::FullChargeIdle),
            "charging" => Ok(RobotOperationState::Charging),
            "idle" => Ok(RobotOperationState::Idle),
            other => Err(SmartfarmError::MalformedPayload(format!(
                "unknown operation state: {other}"
            ))),
        }
    }

    /// `WORKING, RETURN → Working`; `CHARGING → Charging`;
    /// `{WAITING, DONE} → FullChargeIdle if battery ≥ 100 else Idle`;
    /// `ERROR → None` (do not accumulate).
    pub fn from_status(status: RobotStatus, battery_state: f32) -> Option<Self> {
        match status {
            RobotStatus::Working | RobotStatus::Return => Some(RobotOperationState::Working),
            RobotStatus::Charging => Some(RobotOperationState::Charging),
            RobotStatus::Waiting | RobotStatus::Done => Some(if battery_state >= 100.0 {
                RobotOperationState::FullChargeIdle
            } else {
                RobotOperationState::Idle
            }),
            RobotStatus::Error => None,
        }
    }
}

impl fmt::Display for RobotOperationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_status_does_not_accumulate() {
        assert_eq!(RobotOperationState::from_status(RobotStatus::Error, 50.0), None);
    }

    #[test]
    fn waiting_splits_on_full_battery() {
        assert_eq!(
            RobotOperationState::from_status(RobotStatus::Waiting, 100.0),
            Some(RobotOperationState::FullChargeIdle)
        );
        assert_eq!(
            RobotOperationState::from_status(RobotStatus::Waiting, 99.9),
            Some(RobotOperationState::Idle)
        );
    }

    #[test]
    fn return_rolls_up_to_working() {
        assert_eq!(
            RobotOperationState::from_status(RobotStatus::Return, 10.0),
            Some(RobotOperationState::Working)
        );
    }

    #[test]
    fn status_string_roundtrips() {
        for s in [
            RobotStatus::Working,
            RobotStatus::Return,
            RobotStatus::Waiting,
            RobotStatus::Done,
            RobotStatus::Charging,
            RobotStatus::Error,
        ] {
            assert_eq!(RobotStatus::parse(s.as_str()).unwrap(), s);
        }
    }
}
