//! [`NodeRef`] — the sum type replacing ad-hoc `"node_id"` / `"node_id-sub"`
//! string parsing scattered through the source. Convert at ingress/egress
//! only; everything between should pass `NodeRef` values around.

use std::fmt;

use crate::ids::NodeId;
use crate::error::SmartfarmError;

/// A robot position reference: either a bare node id, or a sub-position
/// `node_id-s` with `s` one of the five stops `0..=4` along the node's
/// outgoing edge. `0` is the node centre.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeRef {
    Base(NodeId),
    Sub(NodeId, u8),
}

impl NodeRef {
    pub fn base(self) -> NodeId {
        match self {
            NodeRef::Base(n) => n,
            NodeRef::Sub(n, _) => n,
        }
    }

    /// `Some(s)` if this is a sub-position reference, `None` for a bare node.
    pub fn sub(self) -> Option<u8> {
        match self {
            NodeRef::Base(_) => None,
            NodeRef::Sub(_, s) => Some(s),
        }
    }

    /// Parse either `"7"` or `"7-3"`. Rejects sub-positions outside `0..=4`
    /// and a bare `"0"`/`"0-s"` (node id `0` means "no neighbour" and is
    /// never addressable).
    pub fn parse(raw: &str) -> Result<Self, SmartfarmError> {
        if let Some((node_part, sub_part)) = raw.split_once('-') {
            let node_num: u32 = node_part
                .parse()
                .map_err(|_| SmartfarmError::MalformedPayload(format!("bad node ref: {raw}")))?;
            let sub: u8 = sub_part
                .parse()
                .map_err(|_| SmartfarmError::MalformedPayload(format!("bad node ref: {raw}")))?;
            if sub > 4 {
                return Err(SmartfarmError::MalformedPayload(format!(
                    "sub-position out of range 0..=4: {raw}"
                )));
            }
            let node = NodeId::new(node_num)
                .ok_or_else(|| SmartfarmError::MalformedPayload(format!("bad node ref: {raw}")))?;
            Ok(NodeRef::Sub(node, sub))
        } else {
            let node_num: u32 = raw
                .parse()
                .map_err(|_| SmartfarmError::MalformedPayload(format!("bad node ref: {raw}")))?;
            let node = NodeId::new(node_num)
                .ok_or_else(|| SmartfarmError::MalformedPayload(format!("bad node ref: {raw}")))?;
            Ok(NodeRef::Base(node))
        }
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeRef::Base(n) => write!(f, "{n}"),
            NodeRef::Sub(n, s) => write!(f, "{n}-{s}"),
        }
    }
}
