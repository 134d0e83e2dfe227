pub fn robot_state_key(map: &str, robot: &str) -> String {
    format!("robot:state:{map}:{robot}")
}

pub fn state_change_channel(map: &str, robot: &str) -> String {
    format!("{map}/robot/{robot}/state")
}
