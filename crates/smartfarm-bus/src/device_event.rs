//! Device→controller topic parsing and payload decoding — the tagged
//! `DeviceEvent` sum type replacing the source's dynamic dict dispatch
//! (§9 design note), grounded on
//! `original_source/app/util/mqtt/handlers/command.py`'s topic shape
//! (`+/+/robot/+`, 4-segment split) and §6's messaging topic table.

use serde::Deserialize;

use crate::error::{BusError, BusResult};

/// A decoded `{map}/{robot}/robot/{command}` topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceTopic {
    pub map_name: String,
    pub robot_id: String,
    pub command: String,
}

/// Splits a device-bus topic into its four segments, requiring the fixed
/// third segment `robot`. Returns `None` for anything else — callers log
/// and drop, per §7's `MalformedPayload` policy.
pub fn parse_topic(topic: &str) -> Option<DeviceTopic> {
    let parts: Vec<&str> = topic.split('/').collect();
    if parts.len() != 4 || parts[2] != "robot" || parts.iter().any(|p| p.is_empty()) {
        return None;
    }
    Some(DeviceTopic {
        map_name: parts[0].to_string(),
        robot_id: parts[1].to_string(),
        command: parts[3].to_string(),
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceEvent {
    PathPlan { current_node: String, final_node: String },
    Battery { battery_state: String, battery_charging_state: i32 },
    Arrive { current_node: String },
    RemovePath { current_node: String },
    Next { current_node: String, sub_position: Option<u8>, direction: char },
    RobotError,
}

#[derive(Deserialize)]
struct PathPlanPayload {
    current_node: String,
    final_node: String,
}

#[derive(Deserialize)]
struct BatteryPayload {
    battery_state: String,
    battery_charging_state: i32,
}

#[derive(Deserialize)]
struct NodePayload {
    current_node: String,
}

#[derive(Deserialize)]
struct NextPayload {
    current_node: String,
    sub_position: Option<u8>,
    direction: String,
}

impl DeviceEvent {
    pub fn decode(command: &str, payload: &str) -> BusResult<Self> {
        match command {
            "path_plan" => {
                let p: PathPlanPayload = serde_json::from_str(payload)
                    .map_err(|e| BusError::MalformedPayload(e.to_string()))?;
                Ok(DeviceEvent::PathPlan { current_node: p.current_node, final_node: p.final_node })
            }
            "battery" => {
                let p: BatteryPayload = serde_json::from_str(payload)
                    .map_err(|e| BusError::MalformedPayload(e.to_string()))?;
                Ok(DeviceEvent::Battery {
                    battery_state: p.battery_state,
                    battery_charging_state: p.battery_charging_state,
                })
            }
            "arrive" => {
                let p: NodePayload = serde_json::from_str(payload)
                    .map_err(|e| BusError::MalformedPayload(e.to_string()))?;
                Ok(DeviceEvent::Arrive { current_node: p.current_node })
            }
            "remove_path" => {
                let p: NodePayload = serde_json::from_str(payload)
                    .map_err(|e| BusError::MalformedPayload(e.to_string()))?;
                Ok(DeviceEvent::RemovePath { current_node: p.current_node })
            }
            "next" => {
                let p: NextPayload = serde_json::from_str(payload)
                    .map_err(|e| BusError::MalformedPayload(e.to_string()))?;
                let direction = p
                    .direction
                    .chars()
                    .next()
                    .ok_or_else(|| BusError::MalformedPayload("empty direction".into()))?;
                Ok(DeviceEvent::Next { current_node: p.current_node, sub_position: p.sub_position, direction })
            }
            "robot_error" => Ok(DeviceEvent::RobotError),
            other => Err(BusError::UnknownCommand(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_topic() {
        let t = parse_topic("smartfarm_x/r1/robot/path_plan").unwrap();
        assert_eq!(t.map_name, "smartfarm_x");
        assert_eq!(t.robot_id, "r1");
        assert_eq!(t.command, "path_plan");
    }

    #[test]
    fn rejects_wrong_segment_count_or_marker() {
        assert!(parse_topic("smartfarm_x/r1/robot").is_none());
        assert!(parse_topic("smartfarm_x/r1/server/path_plan").is_none());
    }

    #[test]
    fn decodes_path_plan_payload() {
        let e = DeviceEvent::decode("path_plan", r#"{"current_node":"5","final_node":"9"}"#).unwrap();
        assert_eq!(e, DeviceEvent::PathPlan { current_node: "5".into(), final_node: "9".into() });
    }

    #[test]
    fn decodes_next_payload_with_default_direction_char() {
        let e = DeviceEvent::decode("next", r#"{"current_node":"5-2","sub_position":2,"direction":"l"}"#).unwrap();
        assert_eq!(e, DeviceEvent::Next { current_node: "5-2".into(), sub_position: Some(2), direction: 'l' });
    }

    #[test]
    fn unknown_command_is_rejected() {
        assert!(DeviceEvent::decode("teleport", "{}").is_err());
    }
}
