use smartfarm_core::SmartfarmError;
use smartfarm_planner::PlannerError;
use smartfarm_robot::RobotError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BusError {
    #[error(transparent)]
    Smartfarm(#[from] SmartfarmError),

    #[error(transparent)]
    Planner(#[from] PlannerError),

    #[error(transparent)]
    Robot(#[from] RobotError),

    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    #[error("unknown device command: {0}")]
    UnknownCommand(String),

    #[error("unknown operator command type: {0}")]
    UnknownOperatorKind(String),
}

pub type BusResult<T> = Result<T, BusError>;
