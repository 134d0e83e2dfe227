//! Path-string grammar: `NORMAL | SUB | NOPATH`.

use smartfarm_core::NodeId;

/// `"{end}!{start},{dirs[0]}/{nodes[1]},{dirs[1]}/.../{nodes[-2]},{dirs[-2]}/"`.
///
/// The final node is intentionally **not** emitted — the device infers
/// arrival from the leading `"{end}!"`. Trailing slash is part of the
/// format. Requires `nodes.len() >= 2` (a single-node path means "don't
/// move" and is never encoded).
pub fn format_path(end: NodeId, start: NodeId, nodes: &[NodeId], dirs: &[char]) -> String {
    debug_assert!(nodes.len() >= 2, "format_path requires at least one hop");
    debug_assert_eq!(dirs.len(), nodes.len() - 1);

    let mut out = format!("{end}!{start},{}/", dirs[0]);
    for i in 1..nodes.len() - 1 {
        out.push_str(&format!("{},{}/", nodes[i], dirs[i]));
    }
    out
}

/// `"{end}!/d~{start}"` — no route, face down, you are at `start`.
pub fn format_nopath(end: NodeId, start: NodeId) -> String {
    format!("{end}!/d~{start}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_excluding_final_node() {
        let nodes: Vec<NodeId> = (5..=9).map(|i| NodeId::new(i).unwrap()).collect();
        let dirs = vec!['l', 'l', 'l', 'l'];
        let s = format_path(NodeId::new(9).unwrap(), NodeId::new(5).unwrap(), &nodes, &dirs);
        assert_eq!(s, "9!5,l/6,l/7,l/8,l/");
    }

    #[test]
    fn nopath_sentinel() {
        let s = format_nopath(NodeId::new(10).unwrap(), NodeId::new(5).unwrap());
        assert_eq!(s, "10!/d~5");
    }

    #[test]
    fn two_node_path_has_no_interior() {
        let nodes = vec![NodeId::new(5).unwrap(), NodeId::new(6).unwrap()];
        let dirs = vec!['l'];
        let s = format_path(NodeId::new(6).unwrap(), NodeId::new(5).unwrap(), &nodes, &dirs);
        assert_eq!(s, "6!5,l/");
    }
}
