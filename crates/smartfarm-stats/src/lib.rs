//! `smartfarm-stats` — daily operation-state statistics (component C5) and
//! the daily reset scheduler (component C8).
//!
//! # Crate layout
//!
//! | Module       | Contents                                              |
//! |---------------|-------------------------------------------------------|
//! | [`cursor`]    | `CurrentStateCursor`, the open-interval hash shape    |
//! | [`keys`]      | Redis-shaped key builders shared with other crates    |
//! | [`engine`]    | `StatsEngine`, day-boundary splitting, daily buckets  |
//! | [`scheduler`] | `DailyResetScheduler`, the sleep-until-midnight loop  |
//! | [`error`]     | `StatsError`, `StatsResult<T>`                        |

pub mod cursor;
pub mod engine;
pub mod error;
pub mod keys;
pub mod scheduler;

pub use cursor::CurrentStateCursor;
pub use engine::{StatsEngine, OPERATION_STATES};
pub use error::{StatsError, StatsResult};
pub use scheduler::DailyResetScheduler;
