//! Per-map node table and CAS node-occupancy registry (component C2).

mod builder;
mod error;
mod map_graph;
mod neighbours;
mod node;

use std::sync::Arc;

use dashmap::DashMap;
use smartfarm_core::MapName;

pub use builder::MapGraphBuilder;
pub use error::{GraphError, GraphResult};
pub use map_graph::MapGraph;
pub use neighbours::Neighbours;
pub use node::NodeRecord;

/// Registry of every map's graph, owned by the composition root and shared
/// across bus handlers. Maps are seeded once at startup from static data
/// (out of scope per §1) and persist for the process lifetime.
#[derive(Default)]
pub struct Graph {
    maps: DashMap<MapName, Arc<MapGraph>>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_map(&self, name: MapName, graph: MapGraph) {
        self.maps.insert(name, Arc::new(graph));
    }

    pub fn map(&self, name: &MapName) -> Option<Arc<MapGraph>> {
        self.maps.get(name).map(|entry| entry.value().clone())
    }
}

/// Seeds a single-row line graph identical to the source's
/// `init_node_data` default seed: nodes `1..=count`, node `1` at the
/// right-hand end, `count` at the left-hand end (`[count] ← … ← [2] ← [1]`).
/// Used by integration tests and as a reference seeding routine for the
/// composition root.
pub fn seed_line_graph(count: u32) -> MapGraph {
    let mut builder = MapGraphBuilder::new();
    for id in 1..=count {
        let l = if id < count { Some(id + 1) } else { None };
        let r = if id > 1 { Some(id - 1) } else { None };
        builder.add_node(id, l, r, None, None);
    }
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use smartfarm_core::{NodeId, RobotId};

    #[test]
    fn registry_looks_up_by_map_name() {
        let registry = Graph::new();
        registry.insert_map(MapName::new("smartfarm_x"), seed_line_graph(10));
        let g = registry.map(&MapName::new("smartfarm_x")).unwrap();
        assert!(g.contains(NodeId::new(5).unwrap()));
        assert!(registry.map(&MapName::new("smartfarm_y")).is_none());
    }

    #[test]
    fn seeded_line_graph_has_asymmetric_ends() {
        let g = seed_line_graph(10);
        let (n1, _) = g.get_node(NodeId::new(1).unwrap()).unwrap();
        assert_eq!(n1.r, None);
        assert_eq!(n1.l, NodeId::new(2));
        let (n10, _) = g.get_node(NodeId::new(10).unwrap()).unwrap();
        assert_eq!(n10.l, None);
        assert_eq!(n10.r, NodeId::new(9));
    }

    #[test]
    fn occupancy_roundtrip_through_registry() {
        let registry = Graph::new();
        registry.insert_map(MapName::new("smartfarm_x"), seed_line_graph(10));
        let g = registry.map(&MapName::new("smartfarm_x")).unwrap();
        let r1 = RobotId::new("r1");
        let n5 = NodeId::new(5).unwrap();
        assert!(g.occupy(n5, &r1).unwrap());
        assert_eq!(g.list_occupied().get(&n5), Some(&r1));
    }
}
