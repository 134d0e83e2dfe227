use smartfarm_core::SmartfarmError;
use smartfarm_stats::StatsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RobotError {
    #[error(transparent)]
    Smartfarm(#[from] SmartfarmError),
    #[error(transparent)]
    Stats(#[from] StatsError),
}

pub type RobotResult<T> = Result<T, RobotError>;
