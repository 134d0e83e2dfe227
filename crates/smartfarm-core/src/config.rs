//! Per-map configuration. The top-level, environment-sourced [`Config`]
//! lives in `smartfarm-service` (the composition root); this is the slice
//! of it that the graph/planner/robot/stats layers need to reference —
//! passed down explicitly rather than read from a global, per the
//! injected-collaborators design note.

use crate::node_ref::NodeRef;

/// Settings that vary the behaviour of a single map's robot fleet.
///
/// `charging_node` resolves Open Question 1 (divergent charging-node
/// identity across source drafts): the final design names it explicitly
/// rather than hard-coding either of the drafts' literals.
#[derive(Debug, Clone)]
pub struct MapConfig {
    /// The designated home/charging position. Status `CHARGING`/`WAITING`
    /// can only be entered here. Default matches the final source draft:
    /// sub-position `"1-0"`.
    pub charging_node: NodeRef,

    /// Movement deltas larger than this are treated as sensor glitches and
    /// discarded with a warning rather than accumulated into `node_count`.
    pub node_count_glitch_threshold: u32,

    /// Preserves the bare-node-2 draft's quirk (`start_node == 2` forces
    /// status `moving`/`WORKING` on a successful forward path) as an
    /// explicit, off-by-default compatibility flag rather than adopting it
    /// as the default rule. See Open Question 1.
    pub legacy_bare_node_two_triggers_moving: bool,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            charging_node: NodeRef::parse("1-0").expect("literal charging node is valid"),
            node_count_glitch_threshold: 10,
            legacy_bare_node_two_triggers_moving: false,
        }
    }
}
