use smartfarm_core::SmartfarmError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("node {0} not found")]
    NodeNotFound(u32),

    #[error(transparent)]
    Smartfarm(#[from] SmartfarmError),
}

pub type GraphResult<T> = Result<T, GraphError>;
