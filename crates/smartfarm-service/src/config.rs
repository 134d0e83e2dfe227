//! Environment-sourced configuration, in the shape of the source's
//! `Settings`/`MQTTSettings`/`RedisSettings` (`pydantic_settings`,
//! `env_prefix="SMARTFARM_"`). `envy` fills a plain-string [`RawConfig`]
//! from the process environment; [`Config::from_env`] then parses and
//! validates the typed fields `envy` itself can't express (`NodeRef`,
//! `Duration`), following `dt_core::SimConfig`'s construct-then-validate
//! split.

use std::time::Duration;

use serde::Deserialize;
use smartfarm_core::{MapConfig, NodeRef};

/// Mirrors every field `Config` exposes, but as the plain strings/numbers
/// `envy` can deserialize directly from `SMARTFARM_*` environment
/// variables.
#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(default = "default_map_name_prefix")]
    map_name_prefix: String,
    #[serde(default = "default_charging_node")]
    charging_node: String,
    #[serde(default = "default_glitch_threshold")]
    node_count_glitch_threshold: u32,
    #[serde(default)]
    legacy_bare_node_two_triggers_moving: bool,
    #[serde(default = "default_operator_channel")]
    operator_channel: String,
    #[serde(default)]
    legacy_operator_channel_enabled: bool,
    #[serde(default = "default_daily_stats_ttl_days")]
    daily_stats_ttl_days: u64,
    #[serde(default = "default_arrive_marker_ttl_secs")]
    arrive_marker_ttl_secs: u64,
    #[serde(default = "default_bus_capacity")]
    device_bus_capacity: usize,
    #[serde(default = "default_bus_capacity")]
    broker_bus_capacity: usize,
}

fn default_map_name_prefix() -> String {
    "smartfarm_".to_string()
}
fn default_charging_node() -> String {
    "1-0".to_string()
}
fn default_glitch_threshold() -> u32 {
    10
}
fn default_operator_channel() -> String {
    "smartfarm".to_string()
}
fn default_daily_stats_ttl_days() -> u64 {
    30
}
fn default_arrive_marker_ttl_secs() -> u64 {
    180
}
fn default_bus_capacity() -> usize {
    1024
}

/// Top-level configuration for the controller process. Built once at
/// startup and shared read-only across every component.
#[derive(Debug, Clone)]
pub struct Config {
    /// Admission-rule prefix: device-bus topics whose map name doesn't
    /// start with this are dropped silently (§6's admission rule).
    pub map_name_prefix: String,
    /// Per-map behaviour settings, handed down to graph/planner/robot/stats.
    pub map: MapConfig,
    pub operator_channel: String,
    pub legacy_operator_channel_enabled: bool,
    pub daily_stats_ttl: Duration,
    pub arrive_marker_ttl: Duration,
    pub device_bus_capacity: usize,
    pub broker_bus_capacity: usize,
}

impl Config {
    /// Reads `SMARTFARM_*` environment variables, falling back to defaults
    /// for anything unset, then parses/validates the typed fields.
    pub fn from_env() -> anyhow::Result<Self> {
        let raw: RawConfig = envy::prefixed("SMARTFARM_").from_env()?;
        let charging_node = NodeRef::parse(&raw.charging_node)
            .map_err(|e| anyhow::anyhow!("invalid SMARTFARM_CHARGING_NODE: {e}"))?;
        Ok(Self {
            map_name_prefix: raw.map_name_prefix,
            map: MapConfig {
                charging_node,
                node_count_glitch_threshold: raw.node_count_glitch_threshold,
                legacy_bare_node_two_triggers_moving: raw.legacy_bare_node_two_triggers_moving,
            },
            operator_channel: raw.operator_channel,
            legacy_operator_channel_enabled: raw.legacy_operator_channel_enabled,
            daily_stats_ttl: Duration::from_secs(raw.daily_stats_ttl_days * 24 * 60 * 60),
            arrive_marker_ttl: Duration::from_secs(raw.arrive_marker_ttl_secs),
            device_bus_capacity: raw.device_bus_capacity,
            broker_bus_capacity: raw.broker_bus_capacity,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            map_name_prefix: default_map_name_prefix(),
            map: MapConfig::default(),
            operator_channel: default_operator_channel(),
            legacy_operator_channel_enabled: false,
            daily_stats_ttl: Duration::from_secs(default_daily_stats_ttl_days() * 24 * 60 * 60),
            arrive_marker_ttl: Duration::from_secs(default_arrive_marker_ttl_secs()),
            device_bus_capacity: default_bus_capacity(),
            broker_bus_capacity: default_bus_capacity(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_map_config_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.map_name_prefix, "smartfarm_");
        assert_eq!(cfg.map.charging_node, NodeRef::parse("1-0").unwrap());
        assert_eq!(cfg.daily_stats_ttl, Duration::from_secs(30 * 24 * 60 * 60));
        assert_eq!(cfg.arrive_marker_ttl, Duration::from_secs(180));
    }

    #[test]
    fn from_env_honours_overrides() {
        // SAFETY: test runs single-threaded within this process; no other
        // test reads these particular keys.
        unsafe {
            std::env::set_var("SMARTFARM_MAP_NAME_PREFIX", "farm_");
            std::env::set_var("SMARTFARM_CHARGING_NODE", "3-2");
        }
        let cfg = Config::from_env().unwrap();
        assert_eq!(cfg.map_name_prefix, "farm_");
        assert_eq!(cfg.map.charging_node, NodeRef::parse("3-2").unwrap());
        unsafe {
            std::env::remove_var("SMARTFARM_MAP_NAME_PREFIX");
            std::env::remove_var("SMARTFARM_CHARGING_NODE");
        }
    }
}
