//! Breadth-first shortest path over a map's 4-neighbour grid.

use std::collections::{HashSet, VecDeque};

use smartfarm_core::NodeId;
use smartfarm_graph::MapGraph;

/// Breadth-first shortest path from `start` to `end`.
///
/// Neighbours are visited in the fixed, deterministic order `l, r, u, d` —
/// this governs tie-breaks between equally-short paths and must be
/// reproduced exactly. Returns `([], [])` if either endpoint is unknown or
/// no path exists. `bfs(a, a)` returns `([a], [])`.
///
/// `dirs[i]` is the direction taken from `nodes[i]` to `nodes[i+1]`;
/// `dirs.len() == nodes.len() - 1`.
pub fn bfs(graph: &MapGraph, start: NodeId, end: NodeId) -> (Vec<NodeId>, Vec<char>) {
    if !graph.contains(start) || !graph.contains(end) {
        return (Vec::new(), Vec::new());
    }

    let mut visited = HashSet::new();
    visited.insert(start);

    let mut queue = VecDeque::new();
    queue.push_back((start, vec![start], Vec::<char>::new()));

    while let Some((current, path, dirs)) = queue.pop_front() {
        if current == end {
            return (path, dirs);
        }

        let Some((neighbours, _occupied)) = graph.get_node(current) else {
            continue;
        };

        for (dir, next) in neighbours.ordered() {
            let Some(next) = next else { continue };
            if visited.contains(&next) || !graph.contains(next) {
                continue;
            }
            visited.insert(next);
            let mut next_path = path.clone();
            next_path.push(next);
            let mut next_dirs = dirs.clone();
            next_dirs.push(dir);
            queue.push_back((next, next_path, next_dirs));
        }
    }

    (Vec::new(), Vec::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use smartfarm_graph::seed_line_graph;

    #[test]
    fn same_node_returns_singleton_path() {
        let g = seed_line_graph(10);
        let n = NodeId::new(5).unwrap();
        let (nodes, dirs) = bfs(&g, n, n);
        assert_eq!(nodes, vec![n]);
        assert!(dirs.is_empty());
    }

    #[test]
    fn finds_shortest_path_on_a_line() {
        let g = seed_line_graph(10);
        let (nodes, dirs) = bfs(&g, NodeId::new(5).unwrap(), NodeId::new(9).unwrap());
        let expect: Vec<NodeId> = (5..=9).map(|i| NodeId::new(i).unwrap()).collect();
        assert_eq!(nodes, expect);
        assert_eq!(dirs, vec!['l', 'l', 'l', 'l']);
    }

    #[test]
    fn unknown_endpoint_returns_empty() {
        let g = seed_line_graph(10);
        let (nodes, dirs) = bfs(&g, NodeId::new(5).unwrap(), NodeId::new(99).unwrap());
        assert!(nodes.is_empty());
        assert!(dirs.is_empty());
    }
}
