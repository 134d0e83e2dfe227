//! Voltage-to-percent conversion for the `battery` device event, grounded
//! on `path_service.py`'s battery plumbing.

use crate::error::{BusError, BusResult};

const MAX_V: f32 = 16.5;
const MIN_V: f32 = 13.5;

/// Converts a raw voltage reading to a `0..=100` battery percentage.
/// While charging, the reading is nudged upward toward `max_v` before the
/// conversion — the source's compensation for the higher resting voltage a
/// charging battery shows. Clamped to `0..=100` at the edges.
pub fn voltage_to_percent(battery_state: &str, charging: bool) -> BusResult<u8> {
    let mut v: f32 = battery_state
        .parse()
        .map_err(|_| BusError::MalformedPayload(format!("bad battery_state: {battery_state}")))?;
    if charging {
        v -= (MAX_V - v) * 0.07;
    }
    let percent = ((v - MIN_V) / (MAX_V - MIN_V) * 100.0).round();
    Ok(percent.clamp(0.0, 100.0) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn charging_sample_matches_reference_conversion() {
        // Scenario 5: v = 15 - (16.5-15)*0.07 = 14.895 -> round(46.5) = 47.
        assert_eq!(voltage_to_percent("15.0", true).unwrap(), 47);
    }

    #[test]
    fn not_charging_uses_raw_voltage() {
        assert_eq!(voltage_to_percent("16.5", false).unwrap(), 100);
        assert_eq!(voltage_to_percent("13.5", false).unwrap(), 0);
    }

    #[test]
    fn out_of_range_voltage_clamps() {
        assert_eq!(voltage_to_percent("20.0", false).unwrap(), 100);
        assert_eq!(voltage_to_percent("0.0", false).unwrap(), 0);
    }

    #[test]
    fn malformed_voltage_is_rejected() {
        assert!(voltage_to_percent("not-a-number", false).is_err());
    }
}
