//! Redis-shaped key builders — kept as plain functions so every component
//! that touches a `robot:*` key (stats, robot state, bus handlers) agrees
//! on the exact same layout without importing each other.

use chrono::NaiveDate;

pub fn current_state_key(map: &str, robot: &str) -> String {
    format!("robot:current_state:{map}:{robot}")
}

pub fn daily_stats_key(map: &str, robot: &str, date: NaiveDate) -> String {
    format!("robot:daily_stats:{map}:{robot}:{date}")
}

pub const CURRENT_STATE_SCAN_PATTERN: &str = "robot:current_state:*";

/// Parses `robot:current_state:{map}:{robot}` back into `(map, robot)`.
/// Returns `None` for any key that doesn't have exactly four colon-separated
/// segments, mirroring the source's `len(parts) != 4` skip.
pub fn parse_current_state_key(key: &str) -> Option<(String, String)> {
    let parts: Vec<&str> = key.split(':').collect();
    if parts.len() != 4 {
        return None;
    }
    Some((parts[2].to_string(), parts[3].to_string()))
}
