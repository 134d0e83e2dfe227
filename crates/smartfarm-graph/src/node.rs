use smartfarm_core::RobotId;

use crate::neighbours::Neighbours;

/// A node row, mirroring `(map_name, node_id) → Node` of the data model.
#[derive(Debug, Clone)]
pub struct NodeRecord {
    pub neighbours: Neighbours,
    pub occupied_by: Option<RobotId>,
}

impl NodeRecord {
    pub fn new(neighbours: Neighbours) -> Self {
        Self { neighbours, occupied_by: None }
    }
}
