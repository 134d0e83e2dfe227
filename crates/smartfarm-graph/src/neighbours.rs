//! Four-neighbour adjacency, one entry per direction.

use smartfarm_core::NodeId;

/// A node's four directional neighbours. `None` means "no neighbour in that
/// direction" — the wire format's `0` sentinel, already stripped by
/// [`smartfarm_core::NodeId::new`]. Adjacency is not required to be
/// symmetric: the seed data is a line graph with deliberately asymmetric
/// ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Neighbours {
    pub l: Option<NodeId>,
    pub r: Option<NodeId>,
    pub u: Option<NodeId>,
    pub d: Option<NodeId>,
}

impl Neighbours {
    pub fn new(l: Option<NodeId>, r: Option<NodeId>, u: Option<NodeId>, d: Option<NodeId>) -> Self {
        Self { l, r, u, d }
    }

    /// Neighbours in the fixed, deterministic visit order `l, r, u, d` that
    /// the planner's breadth-first search must reproduce for tie-break
    /// stability — paired with the direction character that reaches it.
    pub fn ordered(&self) -> [(char, Option<NodeId>); 4] {
        [('l', self.l), ('r', self.r), ('u', self.u), ('d', self.d)]
    }

    /// Looks up the neighbour in a single direction by its character code.
    /// Any char outside `l, r, u, d` is treated as "no neighbour".
    pub fn get(&self, dir: char) -> Option<NodeId> {
        match dir {
            'l' => self.l,
            'r' => self.r,
            'u' => self.u,
            'd' => self.d,
            _ => None,
        }
    }
}
