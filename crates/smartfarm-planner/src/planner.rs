//! The [`Planner`] trait — pluggable shortest-path strategy, mirroring
//! `dt-spatial::Router`. The grid is unweighted and 4-neighbour, so BFS is
//! the only implementation the controller ships, but keeping the seam
//! lets a future cost-aware variant (e.g. preferring less-congested rows)
//! slot in without touching callers.

use smartfarm_core::NodeId;
use smartfarm_graph::MapGraph;

use crate::bfs::bfs;

pub trait Planner: Send + Sync {
    /// Shortest path from `start` to `end`. See [`crate::bfs::bfs`] for the
    /// exact contract (visit order, empty-on-failure, `bfs(a,a)` shape).
    fn shortest_path(&self, graph: &MapGraph, start: NodeId, end: NodeId) -> (Vec<NodeId>, Vec<char>);
}

/// The only planner the controller ships: unweighted breadth-first search
/// with the fixed `l, r, u, d` visit order.
#[derive(Debug, Default, Clone, Copy)]
pub struct BfsPlanner;

impl Planner for BfsPlanner {
    fn shortest_path(&self, graph: &MapGraph, start: NodeId, end: NodeId) -> (Vec<NodeId>, Vec<char>) {
        bfs(graph, start, end)
    }
}
