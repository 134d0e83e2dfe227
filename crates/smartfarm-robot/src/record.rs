//! [`RobotRecord`] — the `robot:state:{map}:{robot}` hash shape: identity,
//! position, battery, and derived status.

use std::collections::HashMap;

use chrono::{DateTime, Local};
use smartfarm_core::{NodeRef, RobotStatus};

use crate::error::RobotError;

pub const TRACK_NO: &str = "1";

#[derive(Debug, Clone, PartialEq)]
pub struct RobotRecord {
    pub map_name: String,
    pub robot_id: String,
    pub current_node: Option<NodeRef>,
    pub final_node: Option<NodeRef>,
    pub battery_state: f32,
    pub charging_state: bool,
    pub status: Option<RobotStatus>,
    pub updated_at: DateTime<Local>,
}

impl RobotRecord {
    pub fn new(map_name: impl Into<String>, robot_id: impl Into<String>, now: DateTime<Local>) -> Self {
        Self {
            map_name: map_name.into(),
            robot_id: robot_id.into(),
            current_node: None,
            final_node: None,
            battery_state: 0.0,
            charging_state: false,
            status: None,
            updated_at: now,
        }
    }

    pub(crate) fn to_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("map_name", self.map_name.clone()),
            ("track_no", TRACK_NO.to_string()),
            ("robot_id", self.robot_id.clone()),
            ("battery_state", self.battery_state.to_string()),
            ("charging_state", (self.charging_state as u8).to_string()),
            ("updated_at", self.updated_at.to_rfc3339()),
        ];
        if let Some(node) = self.current_node {
            fields.push(("current_node", node.to_string()));
        }
        if let Some(node) = self.final_node {
            fields.push(("final_node", node.to_string()));
        }
        if let Some(status) = self.status {
            fields.push(("status", status.as_str().to_string()));
        }
        fields
    }

    pub(crate) fn from_fields(
        map_name: &str,
        robot_id: &str,
        fields: &HashMap<String, String>,
    ) -> Result<Option<Self>, RobotError> {
        if fields.is_empty() {
            return Ok(None);
        }
        let current_node = fields.get("current_node").map(|s| NodeRef::parse(s)).transpose()?;
        let final_node = fields.get("final_node").map(|s| NodeRef::parse(s)).transpose()?;
        let battery_state = fields.get("battery_state").and_then(|s| s.parse().ok()).unwrap_or(0.0);
        let charging_state = fields.get("charging_state").map(|s| s != "0").unwrap_or(false);
        let status = fields.get("status").map(|s| RobotStatus::parse(s)).transpose()?;
        let updated_at = fields
            .get("updated_at")
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|t| t.with_timezone(&Local))
            .unwrap_or_else(Local::now);

        Ok(Some(Self {
            map_name: map_name.to_string(),
            robot_id: robot_id.to_string(),
            current_node,
            final_node,
            battery_state,
            charging_state,
            status,
            updated_at,
        }))
    }

    /// JSON snapshot published on the state-change channel. Numeric-looking
    /// bare node ids are emitted as numbers and sub-positions as strings,
    /// mirroring the source's mixed `int`/`str` `current_node` field.
    pub fn to_json(&self) -> serde_json::Value {
        let node_json = |n: NodeRef| match n.sub() {
            Some(_) => serde_json::Value::String(n.to_string()),
            None => serde_json::Value::Number(n.base().get().into()),
        };
        serde_json::json!({
            "map_name": self.map_name,
            "track_no": TRACK_NO,
            "robot_id": self.robot_id,
            "current_node": self.current_node.map(node_json),
            "final_node": self.final_node.map(node_json),
            "battery_state": self.battery_state,
            "charging_state": self.charging_state as u8,
            "status": self.status.map(|s| s.as_str()),
            "updated_at": self.updated_at.to_rfc3339(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_roundtrip() {
        let mut rec = RobotRecord::new("m", "r1", Local::now());
        rec.current_node = Some(NodeRef::parse("5-2").unwrap());
        rec.final_node = Some(NodeRef::parse("1-0").unwrap());
        rec.battery_state = 87.5;
        rec.charging_state = true;
        rec.status = Some(RobotStatus::Working);

        let fields: HashMap<String, String> = rec.to_fields().into_iter().map(|(k, v)| (k.to_string(), v)).collect();
        let parsed = RobotRecord::from_fields("m", "r1", &fields).unwrap().unwrap();
        assert_eq!(parsed.current_node, rec.current_node);
        assert_eq!(parsed.final_node, rec.final_node);
        assert_eq!(parsed.charging_state, rec.charging_state);
        assert_eq!(parsed.status, rec.status);
    }

    #[test]
    fn empty_fields_is_absent() {
        assert_eq!(RobotRecord::from_fields("m", "r1", &HashMap::new()).unwrap(), None);
    }
}
