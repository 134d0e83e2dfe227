//! Breadth-first shortest path, occupancy-aware truncation, sub-position
//! expansion, and path-string encoding (component C3).

mod bfs;
mod cut;
mod error;
mod format;
mod planner;
mod subpos;

pub use bfs::bfs;
pub use cut::cut_path;
pub use error::{PlannerError, PlannerResult};
pub use format::{format_nopath, format_path};
pub use planner::{BfsPlanner, Planner};
pub use subpos::{SubStep, expand_forward, expand_return, format_sub_path};
