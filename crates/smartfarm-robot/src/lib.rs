//! `smartfarm-robot` — per-robot position/battery/status state (component C4).
//!
//! # Crate layout
//!
//! | Module     | Contents                                              |
//! |------------|--------------------------------------------------------|
//! | [`record`] | `RobotRecord`, the `robot:state:*` hash shape          |
//! | [`keys`]   | Key and channel name builders                          |
//! | [`engine`] | `RobotEngine`, the derived-status and node-count rules |
//! | [`error`]  | `RobotError`, `RobotResult<T>`                         |

pub mod engine;
pub mod error;
pub mod keys;
pub mod record;

pub use engine::RobotEngine;
pub use error::{RobotError, RobotResult};
pub use record::RobotRecord;
