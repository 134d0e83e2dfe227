use smartfarm_core::SmartfarmError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StatsError {
    #[error(transparent)]
    Smartfarm(#[from] SmartfarmError),
}

pub type StatsResult<T> = Result<T, StatsError>;
