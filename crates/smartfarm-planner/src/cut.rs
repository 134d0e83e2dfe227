//! Occupancy-aware truncation of a computed path.

use smartfarm_core::{NodeId, RobotId};
use smartfarm_graph::MapGraph;

/// Scans `nodes` from index 1 — the start node is never rejected, even if
/// it shows self-occupation by some other robot (preserved quirk, see
/// Open Question 3: the source's `cut_path` does not special-case an
/// occupied start node). Stops at the first index whose node either
/// doesn't exist or is occupied by a robot other than `robot`; returns
/// `nodes[..i]`, `dirs[..i]`. If no blocking node is found, the full path
/// is returned unchanged. A length-≤1 result means "cannot move".
///
/// Pure function of the graph snapshot at call time: applying it twice to
/// the same snapshot yields the same result.
pub fn cut_path(
    graph: &MapGraph,
    nodes: &[NodeId],
    dirs: &[char],
    robot: &RobotId,
) -> (Vec<NodeId>, Vec<char>) {
    let mut stop = nodes.len();
    for (i, &node) in nodes.iter().enumerate().skip(1) {
        let blocked = match graph.get_node(node) {
            None => true,
            Some((_, Some(occupant))) => &occupant != robot,
            Some((_, None)) => false,
        };
        if blocked {
            stop = i;
            break;
        }
    }
    (nodes[..stop].to_vec(), dirs[..stop.saturating_sub(1).min(dirs.len())].to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use smartfarm_graph::seed_line_graph;

    #[test]
    fn unblocked_path_is_unchanged() {
        let g = seed_line_graph(10);
        let nodes: Vec<NodeId> = (5..=9).map(|i| NodeId::new(i).unwrap()).collect();
        let dirs = vec!['l', 'l', 'l', 'l'];
        let r1 = RobotId::new("r1");
        let (cut_nodes, cut_dirs) = cut_path(&g, &nodes, &dirs, &r1);
        assert_eq!(cut_nodes, nodes);
        assert_eq!(cut_dirs, dirs);
    }

    #[test]
    fn truncates_at_first_occupied_node() {
        let g = seed_line_graph(10);
        g.occupy(NodeId::new(8).unwrap(), &RobotId::new("r2")).unwrap();
        let nodes: Vec<NodeId> = (5..=9).map(|i| NodeId::new(i).unwrap()).collect();
        let dirs = vec!['l', 'l', 'l', 'l'];
        let r1 = RobotId::new("r1");
        let (cut_nodes, cut_dirs) = cut_path(&g, &nodes, &dirs, &r1);
        let expect: Vec<NodeId> = (5..=7).map(|i| NodeId::new(i).unwrap()).collect();
        assert_eq!(cut_nodes, expect);
        assert_eq!(cut_dirs, vec!['l', 'l']);
    }

    #[test]
    fn start_node_occupied_by_other_robot_is_still_allowed_to_egress() {
        // Open Question 3: the start node is never rejected even if it
        // shows self-occupation by another robot.
        let g = seed_line_graph(10);
        g.occupy(NodeId::new(5).unwrap(), &RobotId::new("other")).unwrap();
        let nodes: Vec<NodeId> = (5..=9).map(|i| NodeId::new(i).unwrap()).collect();
        let dirs = vec!['l', 'l', 'l', 'l'];
        let r1 = RobotId::new("r1");
        let (cut_nodes, _) = cut_path(&g, &nodes, &dirs, &r1);
        assert_eq!(cut_nodes, nodes);
    }

    #[test]
    fn own_occupied_node_does_not_block() {
        let g = seed_line_graph(10);
        let r1 = RobotId::new("r1");
        g.occupy(NodeId::new(7).unwrap(), &r1).unwrap();
        let nodes: Vec<NodeId> = (5..=9).map(|i| NodeId::new(i).unwrap()).collect();
        let dirs = vec!['l', 'l', 'l', 'l'];
        let (cut_nodes, _) = cut_path(&g, &nodes, &dirs, &r1);
        assert_eq!(cut_nodes, nodes);
    }

    #[test]
    fn cut_path_is_idempotent() {
        let g = seed_line_graph(10);
        g.occupy(NodeId::new(8).unwrap(), &RobotId::new("r2")).unwrap();
        let nodes: Vec<NodeId> = (5..=9).map(|i| NodeId::new(i).unwrap()).collect();
        let dirs = vec!['l', 'l', 'l', 'l'];
        let r1 = RobotId::new("r1");
        let once = cut_path(&g, &nodes, &dirs, &r1);
        let twice = cut_path(&g, &once.0, &once.1, &r1);
        assert_eq!(once, twice);
    }
}
