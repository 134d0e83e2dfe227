use smartfarm_core::SmartfarmError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlannerError {
    #[error("no route between endpoints")]
    RouteMissing,

    #[error("route blocked by occupancy")]
    RouteBlocked,

    #[error(transparent)]
    Smartfarm(#[from] SmartfarmError),
}

pub type PlannerResult<T> = Result<T, PlannerError>;

impl From<PlannerError> for SmartfarmError {
    fn from(e: PlannerError) -> Self {
        match e {
            PlannerError::RouteMissing => SmartfarmError::RouteMissing,
            PlannerError::RouteBlocked => SmartfarmError::RouteBlocked,
            PlannerError::Smartfarm(inner) => inner,
        }
    }
}
