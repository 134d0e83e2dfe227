//! Shared error type for the fleet controller.
//!
//! Sub-crates may define their own narrower error enums and convert them
//! into [`SmartfarmError`] via `From` impls, or wrap it as one variant —
//! whichever keeps call sites clean (the same latitude `dt-core::DtError`
//! grants its sub-crates).

use thiserror::Error;

/// The error kinds enumerated in the controller's error-handling design.
/// Most are not exceptional in the panic sense — `AdmissionRejected`,
/// `RouteMissing`, `RouteBlocked` are expected, first-class outcomes that
/// ingress handlers log and otherwise swallow.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SmartfarmError {
    #[error("map name rejected by admission rule: {0}")]
    AdmissionRejected(String),

    #[error("no route between endpoints")]
    RouteMissing,

    #[error("route blocked by occupancy")]
    RouteBlocked,

    #[error("lost compare-and-set race for node {0}")]
    AtomicFailure(String),

    #[error("store unavailable")]
    StoreUnavailable,

    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    #[error("broker unavailable")]
    BrokerUnavailable,
}

/// Shorthand result type for all `smartfarm-*` crates.
pub type SmResult<T> = Result<T, SmartfarmError>;
