//! Sub-position expansion and return-home shaping — the fine-grained
//! variant of the planner used when either endpoint carries a
//! sub-position.

use smartfarm_core::{NodeId, NodeRef, RobotId};
use smartfarm_graph::MapGraph;

use crate::bfs::bfs;
use crate::cut::cut_path;
use crate::error::PlannerError;

/// One emitted step: a node, the sub-position stop within it, and the
/// direction this step travels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubStep {
    pub node: NodeId,
    pub sub: u8,
    pub dir: char,
}

impl SubStep {
    fn display(&self) -> String {
        format!("{}-{}", self.node, self.sub)
    }
}

fn sub_range(from: u8, to: u8) -> Vec<u8> {
    if to >= from {
        (from..=to).collect()
    } else {
        (to..=from).rev().collect()
    }
}

/// Picks a direction when `current` and `target` share the same base node
/// (algorithm step 1 of §4.3's sub-position expansion): prefer the first
/// leg of a route toward the robot's stored `final_node` if one is set and
/// differs from the current node; otherwise the first non-zero outgoing
/// neighbour in `l, r, u, d` order; otherwise `'l'`.
fn choose_direction(graph: &MapGraph, current_base: NodeId, final_node: Option<NodeRef>) -> char {
    if let Some(final_ref) = final_node {
        if final_ref.base() != current_base {
            let (nodes, dirs) = bfs(graph, current_base, final_ref.base());
            if nodes.len() > 1 {
                return dirs[0];
            }
        }
    }
    if let Some((neighbours, _)) = graph.get_node(current_base) {
        for (dir, next) in neighbours.ordered() {
            if next.is_some() {
                return dir;
            }
        }
    }
    'l'
}

/// Forward sub-position expansion (§4.3 algorithm, non-return case).
///
/// When `current` and `target` share a base node, emits a straight run of
/// sub-position stops on that one node. Otherwise runs `bfs` + `cut_path`
/// on the base node ids and expands each surviving node into its sub-stops:
/// the first node from the caller's current sub-position to `4`,
/// intermediate nodes `0..=4`, the last node `0..=target.sub()` (or `0` if
/// the path was truncated before reaching the true target).
pub fn expand_forward(
    graph: &MapGraph,
    current: NodeRef,
    target: NodeRef,
    final_node: Option<NodeRef>,
    robot: &RobotId,
) -> Result<Vec<SubStep>, PlannerError> {
    if current.base() == target.base() {
        let dir = choose_direction(graph, current.base(), final_node);
        let from = current.sub().unwrap_or(0);
        let to = target.sub().unwrap_or(4);
        return Ok(sub_range(from, to)
            .into_iter()
            .map(|sub| SubStep { node: current.base(), sub, dir })
            .collect());
    }

    let (nodes, dirs) = bfs(graph, current.base(), target.base());
    if nodes.len() < 2 {
        return Err(PlannerError::RouteMissing);
    }
    let (nodes, dirs) = cut_path(graph, &nodes, &dirs, robot);
    if nodes.len() < 2 {
        return Err(PlannerError::RouteBlocked);
    }

    let reached_target = nodes.last() == Some(&target.base());
    let last_idx = nodes.len() - 1;
    let mut steps = Vec::new();
    for (i, &node) in nodes.iter().enumerate() {
        let dir = if i < dirs.len() { dirs[i] } else { *dirs.last().unwrap() };
        let (from, to) = if i == 0 {
            (current.sub().unwrap_or(0), 4)
        } else if i == last_idx {
            let to = if reached_target { target.sub().unwrap_or(0) } else { 0 };
            (0, to)
        } else {
            (0, 4)
        };
        for sub in sub_range(from, to) {
            steps.push(SubStep { node, sub, dir });
        }
    }
    Ok(steps)
}

/// Return-home shaping (§4.3). From a sub-position `s > 0`, the first
/// segment counts down `s-1 .. 0` on the current node (same direction),
/// then proceeds node-by-node with sub-position `0` only — sub-positions
/// `1..=4` are skipped on intermediate and destination nodes. From `s == 0`
/// the whole return is emitted as a `0`-only sequence directly.
pub fn expand_return(
    graph: &MapGraph,
    current: NodeRef,
    home: NodeId,
    robot: &RobotId,
) -> Result<Vec<SubStep>, PlannerError> {
    let (nodes, dirs) = bfs(graph, current.base(), home);
    if nodes.len() < 2 {
        return Err(PlannerError::RouteMissing);
    }
    let (nodes, dirs) = cut_path(graph, &nodes, &dirs, robot);
    if nodes.len() < 2 {
        return Err(PlannerError::RouteBlocked);
    }

    let return_dir = dirs[0];
    let mut steps = Vec::new();

    let current_sub = current.sub().unwrap_or(0);
    if current_sub != 0 {
        for sub in (0..current_sub).rev() {
            steps.push(SubStep { node: current.base(), sub, dir: return_dir });
        }
    }
    for &node in nodes.iter().skip(1) {
        steps.push(SubStep { node, sub: 0, dir: return_dir });
    }

    if steps.is_empty() {
        return Err(PlannerError::RouteBlocked);
    }
    Ok(steps)
}

/// Renders a sub-position step sequence into the `SUB` grammar:
/// `"{final_display}/{last_dir}~{end_display}!{start_display},{first_dir}/{n-s,d}/.../"`.
///
/// `target` is the true intended destination (rendered at sub `0` unless it
/// itself carries a sub-position) — it may differ from the last emitted
/// step when occupancy truncated the path short of the real goal.
pub fn format_sub_path(steps: &[SubStep], target: NodeRef) -> String {
    debug_assert!(!steps.is_empty());
    let first = steps[0];
    let last = steps[steps.len() - 1];
    let final_display = format!("{}-{}", target.base(), target.sub().unwrap_or(0));

    let mut out = format!(
        "{}/{}~{}!{},{}/",
        final_display,
        last.dir,
        last.display(),
        first.display(),
        first.dir
    );
    for step in &steps[1..steps.len().saturating_sub(1)] {
        out.push_str(&format!("{},{}/", step.display(), step.dir));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use smartfarm_graph::seed_line_graph;

    #[test]
    fn return_from_sub_position_skips_interior_subpositions() {
        // r1 at "5-3" returns toward node 1 on a 10-node line.
        let g = seed_line_graph(10);
        let r1 = RobotId::new("r1");
        let current = NodeRef::parse("5-3").unwrap();
        let home = NodeId::new(1).unwrap();
        let steps = expand_return(&g, current, home, &r1).unwrap();
        let expect: Vec<(u32, u8)> = vec![
            (5, 2),
            (5, 1),
            (5, 0),
            (4, 0),
            (3, 0),
            (2, 0),
            (1, 0),
        ];
        let got: Vec<(u32, u8)> = steps.iter().map(|s| (s.node.get(), s.sub)).collect();
        assert_eq!(got, expect);
        assert!(steps.iter().all(|s| s.dir == 'r'));
    }

    #[test]
    fn return_from_sub_zero_is_direct() {
        let g = seed_line_graph(10);
        let r1 = RobotId::new("r1");
        let current = NodeRef::parse("5-0").unwrap();
        let home = NodeId::new(1).unwrap();
        let steps = expand_return(&g, current, home, &r1).unwrap();
        let got: Vec<(u32, u8)> = steps.iter().map(|s| (s.node.get(), s.sub)).collect();
        assert_eq!(got, vec![(4, 0), (3, 0), (2, 0), (1, 0)]);
    }

    #[test]
    fn format_sub_path_matches_grammar_shape() {
        let g = seed_line_graph(10);
        let r1 = RobotId::new("r1");
        let current = NodeRef::parse("5-3").unwrap();
        let home = NodeId::new(1).unwrap();
        let steps = expand_return(&g, current, home, &r1).unwrap();
        let target = NodeRef::parse("1").unwrap();
        let s = format_sub_path(&steps, target);
        assert!(s.starts_with("1-0/r~1-0!5-2,r/"));
        assert!(s.ends_with('/'));
    }
}
