//! Operator-bus payload decoding. Rides the `Store`'s own pub/sub (the
//! channel `smartfarm`, per §6's topic table categorising it as a *store*
//! channel rather than a device-bus topic), so no custom transport is
//! needed here — only the payload shape.

use serde::Deserialize;

use crate::error::{BusError, BusResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorKind {
    Start,
    Next,
    Return,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorEvent {
    pub kind: OperatorKind,
    pub map_name: String,
    pub robot_id: String,
}

/// Open Question 2: drafts disagree on `mapName` vs `farmName` — accept
/// both spellings at ingress.
#[derive(Deserialize)]
struct RawOperatorPayload {
    #[serde(rename = "type")]
    kind: String,
    #[serde(rename = "mapName", alias = "farmName")]
    map_name: String,
    #[serde(rename = "robotId")]
    robot_id: String,
}

impl OperatorEvent {
    pub fn decode(payload: &str) -> BusResult<Self> {
        let raw: RawOperatorPayload =
            serde_json::from_str(payload).map_err(|e| BusError::MalformedPayload(e.to_string()))?;
        let kind = match raw.kind.as_str() {
            "start" => OperatorKind::Start,
            "next" => OperatorKind::Next,
            "return" => OperatorKind::Return,
            other => return Err(BusError::UnknownOperatorKind(other.to_string())),
        };
        Ok(OperatorEvent { kind, map_name: raw.map_name, robot_id: raw.robot_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_map_name_spelling() {
        let e = OperatorEvent::decode(r#"{"type":"start","mapName":"smartfarm_x","robotId":"r1"}"#).unwrap();
        assert_eq!(e.map_name, "smartfarm_x");
        assert_eq!(e.kind, OperatorKind::Start);
    }

    #[test]
    fn decodes_farm_name_spelling() {
        let e = OperatorEvent::decode(r#"{"type":"return","farmName":"smartfarm_x","robotId":"r1"}"#).unwrap();
        assert_eq!(e.map_name, "smartfarm_x");
        assert_eq!(e.kind, OperatorKind::Return);
    }

    #[test]
    fn unknown_type_is_rejected() {
        assert!(OperatorEvent::decode(r#"{"type":"teleport","mapName":"m","robotId":"r1"}"#).is_err());
    }
}
