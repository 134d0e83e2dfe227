//! Identity newtypes shared across the fleet controller.
//!
//! Mirrors the `typed_id!` discipline of the teacher framework — wrap bare
//! strings/ints at the boundary so `map_name` and `robot_id` can never be
//! swapped by argument order at a call site.

use std::fmt;

/// A map name, e.g. `"smartfarm_gangnam"`. Admission (prefix check) happens
/// at ingress; once constructed via [`MapName::new`] the value is assumed
/// valid for the remainder of its life.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MapName(String);

impl MapName {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MapName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for MapName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for MapName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A robot identifier, e.g. `"r1"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RobotId(String);

impl RobotId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RobotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for RobotId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RobotId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A bare node id, unique within a map. `0` is reserved by the source graph
/// format to mean "no neighbour" and is never a valid [`NodeId`] value —
/// constructors reject it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// Returns `None` for `0`, which the wire format reserves for "no neighbour".
    pub fn new(raw: u32) -> Option<Self> {
        if raw == 0 { None } else { Some(Self(raw)) }
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
