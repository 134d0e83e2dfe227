//! A single map's node table plus its CAS occupancy registry.

use std::collections::HashMap;

use parking_lot::Mutex;
use smartfarm_core::{NodeId, RobotId};

use crate::error::GraphError;
use crate::node::NodeRecord;

/// One map's node table. All occupancy mutations go through the single
/// internal lock — matching the Store contract's requirement that
/// concurrent `occupy` calls on the same node resolve to exactly one
/// winner. A per-map (rather than per-node) lock mirrors `dt-spatial`'s
/// one-struct-per-network granularity; contention is low since occupancy
/// writes are the only hot path and they're already serialised per robot
/// upstream of this layer.
pub struct MapGraph {
    nodes: Mutex<HashMap<NodeId, NodeRecord>>,
}

impl MapGraph {
    pub fn new(nodes: HashMap<NodeId, NodeRecord>) -> Self {
        Self { nodes: Mutex::new(nodes) }
    }

    /// Returns a node's neighbours and current occupant, verbatim.
    pub fn get_node(&self, id: NodeId) -> Option<(crate::neighbours::Neighbours, Option<RobotId>)> {
        self.nodes
            .lock()
            .get(&id)
            .map(|rec| (rec.neighbours, rec.occupied_by.clone()))
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.lock().contains_key(&id)
    }

    /// `{id → neighbours, occupied_by}` for every node in the map.
    pub fn get_all_nodes(&self) -> HashMap<NodeId, (crate::neighbours::Neighbours, Option<RobotId>)> {
        self.nodes
            .lock()
            .iter()
            .map(|(id, rec)| (*id, (rec.neighbours, rec.occupied_by.clone())))
            .collect()
    }

    /// Succeeds iff the node exists and is unoccupied; sets `occupied_by`
    /// on success. Two racing `occupy` calls on the same node: exactly one
    /// succeeds (guaranteed by the exclusive lock held across the whole
    /// check-then-set).
    pub fn occupy(&self, id: NodeId, robot: &RobotId) -> Result<bool, GraphError> {
        let mut nodes = self.nodes.lock();
        let rec = nodes.get_mut(&id).ok_or(GraphError::NodeNotFound(id.get()))?;
        if rec.occupied_by.is_some() {
            return Ok(false);
        }
        rec.occupied_by = Some(robot.clone());
        Ok(true)
    }

    /// Clears occupancy if held by `robot` (or if `robot` is `None` — force
    /// release). Returns `false` if the node doesn't exist or is held by a
    /// different robot.
    pub fn release(&self, id: NodeId, robot: Option<&RobotId>) -> bool {
        let mut nodes = self.nodes.lock();
        let Some(rec) = nodes.get_mut(&id) else { return false };
        match (&rec.occupied_by, robot) {
            (Some(held), Some(r)) if held == r => {
                rec.occupied_by = None;
                true
            }
            (Some(_), None) => {
                rec.occupied_by = None;
                true
            }
            _ => false,
        }
    }

    /// Clears every node held by `robot`. Runs under the same lock as
    /// `occupy`, so it cannot race a concurrent `occupy` into clearing an
    /// entry that call just took.
    pub fn release_all(&self, robot: &RobotId) -> usize {
        let mut nodes = self.nodes.lock();
        let mut count = 0;
        for rec in nodes.values_mut() {
            if rec.occupied_by.as_ref() == Some(robot) {
                rec.occupied_by = None;
                count += 1;
            }
        }
        count
    }

    pub fn list_occupied(&self) -> HashMap<NodeId, RobotId> {
        self.nodes
            .lock()
            .iter()
            .filter_map(|(id, rec)| rec.occupied_by.clone().map(|r| (*id, r)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::MapGraphBuilder;

    fn line_graph(n: u32) -> MapGraph {
        let mut b = MapGraphBuilder::new();
        for id in 1..=n {
            let l = if id < n { Some(id + 1) } else { None };
            let r = if id > 1 { Some(id - 1) } else { None };
            b.add_node(id, l, r, None, None);
        }
        b.build()
    }

    #[test]
    fn occupy_then_release() {
        let g = line_graph(5);
        let n3 = NodeId::new(3).unwrap();
        let r1 = RobotId::new("r1");
        assert!(g.occupy(n3, &r1).unwrap());
        assert!(!g.occupy(n3, &RobotId::new("r2")).unwrap());
        assert!(g.release(n3, Some(&r1)));
        assert!(g.occupy(n3, &RobotId::new("r2")).unwrap());
    }

    #[test]
    fn release_all_clears_only_that_robots_nodes() {
        let g = line_graph(5);
        let r1 = RobotId::new("r1");
        let r2 = RobotId::new("r2");
        g.occupy(NodeId::new(1).unwrap(), &r1).unwrap();
        g.occupy(NodeId::new(2).unwrap(), &r1).unwrap();
        g.occupy(NodeId::new(3).unwrap(), &r2).unwrap();
        assert_eq!(g.release_all(&r1), 2);
        assert_eq!(g.list_occupied().len(), 1);
    }

    #[test]
    fn occupy_missing_node_errors() {
        let g = line_graph(5);
        assert!(matches!(
            g.occupy(NodeId::new(99).unwrap(), &RobotId::new("r1")),
            Err(GraphError::NodeNotFound(99))
        ));
    }
}
