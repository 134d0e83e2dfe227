//! `RobotEngine` — component C4. Position/battery/status mutators, the
//! derived-status rules, and the node-count movement accumulator, grounded
//! in `robot_state_service.py::update_position`/`update_battery`/
//! `_calculate_node_movement` in full.

use std::sync::Arc;

use chrono::{DateTime, Local};
use smartfarm_core::{MapConfig, NodeRef, RobotOperationState, RobotStatus};
use smartfarm_stats::StatsEngine;
use smartfarm_store::Store;
use tracing::warn;

use crate::error::RobotResult;
use crate::keys::{robot_state_key, state_change_channel};
use crate::record::RobotRecord;

pub struct RobotEngine<S: Store> {
    store: Arc<S>,
    stats: Arc<StatsEngine<S>>,
    config: MapConfig,
}

impl<S: Store> RobotEngine<S> {
    pub fn new(store: Arc<S>, stats: Arc<StatsEngine<S>>, config: MapConfig) -> Self {
        Self { store, stats, config }
    }

    pub async fn get(&self, map: &str, robot: &str) -> RobotResult<Option<RobotRecord>> {
        let key = robot_state_key(map, robot);
        let Some(fields) = self.store.hgetall(&key).await else { return Ok(None) };
        Ok(RobotRecord::from_fields(map, robot, &fields)?)
    }

    async fn set_identity(&self, key: &str, map: &str, robot: &str) {
        self.store.hset(key, "map_name", map.to_string()).await;
        self.store.hset(key, "track_no", crate::record::TRACK_NO.to_string()).await;
        self.store.hset(key, "robot_id", robot.to_string()).await;
    }

    /// Distance in sub-node steps between `prev` and `curr`: the difference
    /// in sub-index within one node, a flat `5` for a whole-node skip on a
    /// `X-0 -> Y-0` return hop, and `1` for any other node-to-node move.
    fn node_movement(prev: NodeRef, curr: NodeRef) -> u32 {
        let prev_sub = prev.sub().unwrap_or(0);
        let curr_sub = curr.sub().unwrap_or(0);
        if prev.base() == curr.base() {
            return (curr_sub as i32 - prev_sub as i32).unsigned_abs();
        }
        if prev_sub == 0 && curr_sub == 0 {
            return 5;
        }
        1
    }

    async fn accumulate_node_count(&self, map: &str, robot: &str, prev: Option<NodeRef>, curr: NodeRef) -> RobotResult<()> {
        match prev {
            None => self.stats.set_node_count(map, robot, 0).await?,
            Some(prev) if prev != curr => {
                let movement = Self::node_movement(prev, curr);
                if movement > self.config.node_count_glitch_threshold {
                    warn!(robot, %prev, %curr, movement, "abnormal movement, ignoring node_count update");
                } else {
                    let new_count = self.stats.node_count(map, robot).await? + movement;
                    self.stats.set_node_count(map, robot, new_count).await?;
                }
            }
            Some(_) => {}
        }
        Ok(())
    }

    /// Resolves `status` from `current_node`/`final_node`/`charging_state`
    /// per the source's branch: charging-node presence drives
    /// `CHARGING`/`WAITING`, otherwise the requested destination drives
    /// `RETURN`/`WORKING`. The bare-node-2 legacy draft is an explicit,
    /// off-by-default override — see `MapConfig::legacy_bare_node_two_triggers_moving`.
    fn derive_status(&self, current_node: NodeRef, final_node: Option<NodeRef>, charging_state: bool) -> RobotStatus {
        if self.config.legacy_bare_node_two_triggers_moving
            && current_node.sub().is_none()
            && current_node.base().get() == 2
        {
            return RobotStatus::Working;
        }

        if current_node == self.config.charging_node {
            return if charging_state { RobotStatus::Charging } else { RobotStatus::Waiting };
        }

        match final_node {
            Some(target) if target == self.config.charging_node => RobotStatus::Return,
            _ => RobotStatus::Working,
        }
    }

    async fn sync_operation_state(&self, map: &str, robot: &str, status: RobotStatus, battery_state: f32, now: DateTime<Local>) -> RobotResult<()> {
        let Some(operation_state) = RobotOperationState::from_status(status, battery_state) else { return Ok(()) };
        let unchanged = self
            .stats
            .current_state(map, robot)
            .await?
            .is_some_and(|cursor| cursor.state == operation_state);
        if !unchanged {
            self.stats.start_state(map, robot, operation_state, now).await?;
        }
        Ok(())
    }

    async fn publish_state_change(&self, map: &str, robot: &str) -> RobotResult<()> {
        if let Some(record) = self.get(map, robot).await? {
            let channel = state_change_channel(map, robot);
            self.store.publish(&channel, record.to_json().to_string()).await;
        }
        Ok(())
    }

    /// Updates `current_node`/`final_node`, accumulates `node_count`,
    /// re-derives `status`, and syncs daily-stats/pub-sub side effects.
    pub async fn update_position(
        &self,
        map: &str,
        robot: &str,
        current_node: NodeRef,
        final_node: Option<NodeRef>,
        now: DateTime<Local>,
    ) -> RobotResult<()> {
        let key = robot_state_key(map, robot);
        let prev = self.get(map, robot).await?;
        let prev_node = prev.as_ref().and_then(|r| r.current_node);

        self.set_identity(&key, map, robot).await;
        self.store.hset(&key, "current_node", current_node.to_string()).await;
        self.store.hset(&key, "updated_at", now.to_rfc3339()).await;
        self.accumulate_node_count(map, robot, prev_node, current_node).await?;

        if let Some(target) = final_node {
            self.store.hset(&key, "final_node", target.to_string()).await;
        }
        let effective_final = final_node.or_else(|| prev.as_ref().and_then(|r| r.final_node));
        let charging_state = prev.as_ref().map(|r| r.charging_state).unwrap_or(false);
        let status = self.derive_status(current_node, effective_final, charging_state);
        self.store.hset(&key, "status", status.as_str().to_string()).await;

        let battery_state = prev.as_ref().map(|r| r.battery_state).unwrap_or(0.0);
        self.sync_operation_state(map, robot, status, battery_state, now).await?;
        self.publish_state_change(map, robot).await?;
        Ok(())
    }

    /// Updates `battery_state`/`charging_state`. Re-derives status only when
    /// the robot is currently at the charging node.
    pub async fn update_battery(
        &self,
        map: &str,
        robot: &str,
        battery_state: f32,
        charging_state: bool,
        now: DateTime<Local>,
    ) -> RobotResult<()> {
        let key = robot_state_key(map, robot);
        self.set_identity(&key, map, robot).await;
        self.store.hset(&key, "battery_state", battery_state.to_string()).await;
        self.store.hset(&key, "charging_state", (charging_state as u8).to_string()).await;
        self.store.hset(&key, "updated_at", now.to_rfc3339()).await;

        if let Some(record) = self.get(map, robot).await? {
            if let Some(current_node) = record.current_node {
                if current_node == self.config.charging_node {
                    let status = if charging_state { RobotStatus::Charging } else { RobotStatus::Waiting };
                    self.store.hset(&key, "status", status.as_str().to_string()).await;
                    self.sync_operation_state(map, robot, status, battery_state, now).await?;
                }
            }
        }
        self.publish_state_change(map, robot).await?;
        Ok(())
    }

    /// Directly sets `status` (and optionally `current_node`) — used by
    /// ingress handlers that already know the target status, bypassing the
    /// derivation rules in [`Self::update_position`].
    pub async fn update_status(
        &self,
        map: &str,
        robot: &str,
        status: RobotStatus,
        node: Option<NodeRef>,
        now: DateTime<Local>,
    ) -> RobotResult<()> {
        let key = robot_state_key(map, robot);
        self.set_identity(&key, map, robot).await;
        self.store.hset(&key, "status", status.as_str().to_string()).await;
        self.store.hset(&key, "updated_at", now.to_rfc3339()).await;
        if let Some(node) = node {
            self.store.hset(&key, "current_node", node.to_string()).await;
        }

        let battery_state = self.get(map, robot).await?.map(|r| r.battery_state).unwrap_or(0.0);
        self.sync_operation_state(map, robot, status, battery_state, now).await?;
        self.publish_state_change(map, robot).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smartfarm_store::MemoryStore;
    use std::time::Duration;

    fn engine() -> RobotEngine<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        let stats = Arc::new(StatsEngine::new(store.clone(), Duration::from_secs(30 * 24 * 60 * 60)));
        RobotEngine::new(store, stats, MapConfig::default())
    }

    fn node(raw: &str) -> NodeRef {
        NodeRef::parse(raw).unwrap()
    }

    #[tokio::test]
    async fn arriving_at_charging_node_while_charging_sets_charging_status() {
        let e = engine();
        e.update_battery("m", "r1", 40.0, true, Local::now()).await.unwrap();
        e.update_position("m", "r1", node("1-0"), None, Local::now()).await.unwrap();
        let rec = e.get("m", "r1").await.unwrap().unwrap();
        assert_eq!(rec.status, Some(RobotStatus::Charging));
    }

    #[tokio::test]
    async fn arriving_at_charging_node_while_not_charging_sets_waiting_status() {
        let e = engine();
        e.update_position("m", "r1", node("1-0"), None, Local::now()).await.unwrap();
        let rec = e.get("m", "r1").await.unwrap().unwrap();
        assert_eq!(rec.status, Some(RobotStatus::Waiting));
    }

    #[tokio::test]
    async fn moving_toward_charging_node_sets_return_status() {
        let e = engine();
        e.update_position("m", "r1", node("5-0"), Some(node("1-0")), Local::now()).await.unwrap();
        let rec = e.get("m", "r1").await.unwrap().unwrap();
        assert_eq!(rec.status, Some(RobotStatus::Return));
    }

    #[tokio::test]
    async fn moving_toward_other_destination_sets_working_status() {
        let e = engine();
        e.update_position("m", "r1", node("5-0"), Some(node("9")), Local::now()).await.unwrap();
        let rec = e.get("m", "r1").await.unwrap().unwrap();
        assert_eq!(rec.status, Some(RobotStatus::Working));
    }

    #[tokio::test]
    async fn node_count_accumulates_sub_position_steps() {
        let e = engine();
        let t0 = Local::now();
        e.update_position("m", "r1", node("5-1"), Some(node("9")), t0).await.unwrap();
        e.update_position("m", "r1", node("5-2"), Some(node("9")), t0).await.unwrap();
        assert_eq!(e.stats.node_count("m", "r1").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn whole_node_skip_on_return_counts_as_five() {
        let e = engine();
        let t0 = Local::now();
        e.update_position("m", "r1", node("5-0"), Some(node("1-0")), t0).await.unwrap();
        e.update_position("m", "r1", node("4-0"), Some(node("1-0")), t0).await.unwrap();
        assert_eq!(e.stats.node_count("m", "r1").await.unwrap(), 5);
    }

    #[tokio::test]
    async fn abnormal_movement_is_discarded() {
        let e = engine();
        let t0 = Local::now();
        e.update_position("m", "r1", node("5-1"), Some(node("9")), t0).await.unwrap();
        // node 5 sub 1 -> node 60 sub 3: not same node, not both sub 0 -> movement = 1, fine.
        // Force an actual glitch via same-node large sub delta is impossible (sub <= 4),
        // so exercise the threshold directly through a tiny custom config instead.
        let store = Arc::new(MemoryStore::new());
        let stats = Arc::new(StatsEngine::new(store.clone(), std::time::Duration::from_secs(60)));
        let mut cfg = MapConfig::default();
        cfg.node_count_glitch_threshold = 0;
        let strict = RobotEngine::new(store, stats, cfg);
        strict.update_position("m", "r2", node("5-0"), Some(node("9")), t0).await.unwrap();
        strict.update_position("m", "r2", node("6-0"), Some(node("9")), t0).await.unwrap();
        assert_eq!(strict.stats.node_count("m", "r2").await.unwrap(), 0);
    }
}
