//! Core types shared across the `smartfarm-*` crates: identity newtypes,
//! the [`NodeRef`] sum type, the robot status machine, per-map
//! configuration, and the common error type.

mod config;
mod error;
mod ids;
mod node_ref;
mod status;

pub use config::MapConfig;
pub use error::{SmResult, SmartfarmError};
pub use ids::{MapName, NodeId, RobotId};
pub use node_ref::NodeRef;
pub use status::{RobotOperationState, RobotStatus};

/// Validates a map name against the configured admission prefix. Returns
/// `true` iff `map_name` starts with `prefix`. Both messaging and the
/// (out-of-scope) HTTP surface call this; messaging drops silently on
/// `false`, HTTP rejects with an error.
pub fn admits_map_name(map_name: &str, prefix: &str) -> bool {
    map_name.starts_with(prefix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admission_checks_prefix() {
        assert!(admits_map_name("smartfarm_x", "smartfarm_"));
        assert!(!admits_map_name("other_x", "smartfarm_"));
    }
}
