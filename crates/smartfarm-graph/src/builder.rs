//! Incremental construction of a [`MapGraph`], mirroring
//! `dt-spatial::RoadNetworkBuilder`'s add-then-build shape.

use std::collections::HashMap;

use smartfarm_core::NodeId;

use crate::map_graph::MapGraph;
use crate::neighbours::Neighbours;
use crate::node::NodeRecord;

#[derive(Default)]
pub struct MapGraphBuilder {
    nodes: HashMap<NodeId, NodeRecord>,
}

impl MapGraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node with its four raw neighbour ids (`0` = none, per the
    /// wire format). Re-adding the same id overwrites its row.
    pub fn add_node(&mut self, id: u32, l: Option<u32>, r: Option<u32>, u: Option<u32>, d: Option<u32>) -> &mut Self {
        let Some(node_id) = NodeId::new(id) else { return self };
        let neighbours = Neighbours::new(
            l.and_then(NodeId::new),
            r.and_then(NodeId::new),
            u.and_then(NodeId::new),
            d.and_then(NodeId::new),
        );
        self.nodes.insert(node_id, NodeRecord::new(neighbours));
        self
    }

    pub fn build(self) -> MapGraph {
        MapGraph::new(self.nodes)
    }
}
