//! Topic and key builders for the device-bus handler and connection tracker.

pub fn path_key(map: &str, robot: &str) -> String {
    format!("robot:path:{map}:{robot}")
}

pub fn arrive_marker_key(map: &str, robot: &str) -> String {
    format!("robot:arrive:{map}:{robot}")
}

pub fn connection_key(device: &str, map: &str, device_id: &str) -> String {
    format!("mqtt:connection:{device}:{map}:{device_id}")
}

pub fn server_response_topic(map: &str, robot: &str, kind: &str) -> String {
    format!("{map}/{robot}/server/{kind}")
}

pub const ROBOT_EVENTS_CHANNEL: &str = "smartfarm:robot";
pub const CONNECTED_TOPIC: &str = "events/client/connected";
pub const DISCONNECTED_TOPIC: &str = "events/client/disconnected";
