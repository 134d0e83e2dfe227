//! [`DeviceBusHandler`] — component C6. Subscribes to the device bus
//! (`{map}/{robot}/robot/{command}`), dispatches per §4.6, and publishes
//! path responses on `{map}/{robot}/server/*`. Grounded on
//! `original_source/app/util/mqtt/handlers/command.py` (topic shape and
//! dispatch) and `path_service.py` (path computation and persistence —
//! the distilled spec's §4.6 is the authority for the exact per-command
//! behaviour the source draft left as `# TODO` stubs).

use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use serde_json::json;
use smartfarm_core::{MapConfig, MapName, NodeId, NodeRef, RobotId, RobotStatus};
use smartfarm_graph::{Graph, MapGraph};
use smartfarm_planner::{Planner, cut_path, expand_forward, expand_return, format_nopath, format_path, format_sub_path};
use smartfarm_robot::RobotEngine;
use smartfarm_store::Store;
use tracing::{info, warn};

use crate::device_event::{DeviceEvent, parse_topic};
use crate::error::BusResult;
use crate::keys::{ROBOT_EVENTS_CHANNEL, arrive_marker_key, path_key, server_response_topic};
use crate::transport::{InboundBus, OutboundBus};

pub struct DeviceBusHandler<S: Store, P: Planner> {
    graph: Arc<Graph>,
    planner: P,
    robot: Arc<RobotEngine<S>>,
    store: Arc<S>,
    config: MapConfig,
    admission_prefix: String,
    arrive_marker_ttl: Duration,
}

impl<S: Store, P: Planner> DeviceBusHandler<S, P> {
    pub fn new(
        graph: Arc<Graph>,
        planner: P,
        robot: Arc<RobotEngine<S>>,
        store: Arc<S>,
        config: MapConfig,
        admission_prefix: impl Into<String>,
        arrive_marker_ttl: Duration,
    ) -> Self {
        Self {
            graph,
            planner,
            robot,
            store,
            config,
            admission_prefix: admission_prefix.into(),
            arrive_marker_ttl,
        }
    }

    /// The device-bus receive loop (§5: one receiver task per ingress bus).
    pub async fn run<B: InboundBus>(&self, mut inbound: B, outbound: Arc<dyn OutboundBus>) {
        info!("device bus handler started");
        while let Some(envelope) = inbound.recv().await {
            self.dispatch(&envelope.topic, &envelope.payload, &outbound).await;
        }
    }

    async fn dispatch(&self, topic: &str, payload: &str, outbound: &Arc<dyn OutboundBus>) {
        let Some(parsed) = parse_topic(topic) else {
            warn!(topic, "unrecognised device-bus topic, dropping");
            return;
        };
        if !smartfarm_core::admits_map_name(&parsed.map_name, &self.admission_prefix) {
            warn!(map = parsed.map_name, "map name rejected by admission rule, dropping");
            return;
        }
        let event = match DeviceEvent::decode(&parsed.command, payload) {
            Ok(event) => event,
            Err(err) => {
                warn!(%err, topic, "malformed device-bus payload, dropping");
                return;
            }
        };
        if let Err(err) = self.handle(&parsed.map_name, &parsed.robot_id, event, outbound).await {
            warn!(%err, map = parsed.map_name, robot = parsed.robot_id, "device event handling failed");
        }
    }

    async fn handle(
        &self,
        map: &str,
        robot: &str,
        event: DeviceEvent,
        outbound: &Arc<dyn OutboundBus>,
    ) -> BusResult<()> {
        match event {
            DeviceEvent::PathPlan { current_node, final_node } => {
                self.handle_path_plan(map, robot, &current_node, &final_node, outbound).await
            }
            DeviceEvent::Battery { battery_state, battery_charging_state } => {
                self.handle_battery(map, robot, &battery_state, battery_charging_state).await
            }
            DeviceEvent::Arrive { current_node } => {
                self.handle_arrive(map, robot, &current_node, outbound).await
            }
            DeviceEvent::RemovePath { current_node } => {
                self.handle_remove_path(map, robot, &current_node).await
            }
            DeviceEvent::Next { current_node, sub_position, direction } => {
                self.handle_next(map, robot, &current_node, sub_position, direction, outbound).await
            }
            DeviceEvent::RobotError => self.handle_robot_error(map, robot).await,
        }
    }

    fn resolve_destination(&self, final_raw: &str) -> BusResult<(NodeId, bool)> {
        if final_raw == "0" {
            return Ok((self.config.charging_node.base(), true));
        }
        let final_ref = NodeRef::parse(final_raw)?;
        if final_ref.base() == self.config.charging_node.base() {
            Ok((self.config.charging_node.base(), true))
        } else {
            Ok((final_ref.base(), false))
        }
    }

    async fn handle_path_plan(
        &self,
        map: &str,
        robot: &str,
        current_raw: &str,
        final_raw: &str,
        outbound: &Arc<dyn OutboundBus>,
    ) -> BusResult<()> {
        let current = NodeRef::parse(current_raw)?;
        let robot_id = RobotId::new(robot);
        let now = Local::now();

        let Some(graph) = self.graph.map(&MapName::new(map)) else {
            warn!(map, "path_plan for unknown map, dropping");
            return Ok(());
        };

        if final_raw.contains('-') {
            let target = NodeRef::parse(final_raw)?;
            self.store.hset(&path_key(map, robot), "requested_final", target.to_string()).await;
            return self
                .plan_sub(&graph, map, robot, &robot_id, current, target, Some(target), now, outbound)
                .await;
        }

        let (destination, is_return) = self.resolve_destination(final_raw)?;
        let final_for_record = if is_return { self.config.charging_node } else { NodeRef::Base(destination) };
        self.robot.update_position(map, robot, current, Some(final_for_record), now).await?;

        if current.sub().is_some() && !is_return {
            let target = NodeRef::Sub(destination, 4);
            return self
                .plan_sub(&graph, map, robot, &robot_id, current, target, Some(final_for_record), now, outbound)
                .await;
        }
        if is_return {
            return self.plan_return(&graph, map, robot, &robot_id, current, destination, now, outbound).await;
        }
        self.plan_normal(&graph, map, robot, &robot_id, current, destination, now, outbound).await
    }

    async fn plan_sub(
        &self,
        graph: &MapGraph,
        map: &str,
        robot: &str,
        robot_id: &RobotId,
        current: NodeRef,
        target: NodeRef,
        final_hint: Option<NodeRef>,
        now: chrono::DateTime<Local>,
        outbound: &Arc<dyn OutboundBus>,
    ) -> BusResult<()> {
        match expand_forward(graph, current, target, final_hint, robot_id) {
            Ok(steps) if !steps.is_empty() => {
                let path = format_sub_path(&steps, target);
                self.finish_path(map, robot, &path, "success", current.base(), target.base(), false, now, outbound)
                    .await
            }
            _ => {
                let path = format_nopath(target.base(), current.base());
                self.finish_path(map, robot, &path, "blocked", current.base(), target.base(), false, now, outbound)
                    .await
            }
        }
    }

    async fn plan_return(
        &self,
        graph: &MapGraph,
        map: &str,
        robot: &str,
        robot_id: &RobotId,
        current: NodeRef,
        home: NodeId,
        now: chrono::DateTime<Local>,
        outbound: &Arc<dyn OutboundBus>,
    ) -> BusResult<()> {
        match expand_return(graph, current, home, robot_id) {
            Ok(steps) => {
                let target = NodeRef::Base(home);
                let path = format_sub_path(&steps, target);
                self.finish_path(map, robot, &path, "success", current.base(), home, true, now, outbound).await
            }
            Err(_) => {
                let path = format_nopath(home, current.base());
                self.finish_path(map, robot, &path, "blocked", current.base(), home, true, now, outbound).await
            }
        }
    }

    async fn plan_normal(
        &self,
        graph: &MapGraph,
        map: &str,
        robot: &str,
        robot_id: &RobotId,
        current: NodeRef,
        end: NodeId,
        now: chrono::DateTime<Local>,
        outbound: &Arc<dyn OutboundBus>,
    ) -> BusResult<()> {
        let (nodes, dirs) = self.planner.shortest_path(graph, current.base(), end);
        if nodes.len() < 2 {
            let path = format_nopath(end, current.base());
            return self.finish_path(map, robot, &path, "blocked", current.base(), end, false, now, outbound).await;
        }
        let (nodes, dirs) = cut_path(graph, &nodes, &dirs, robot_id);
        if nodes.len() < 2 {
            let path = format_nopath(end, current.base());
            return self.finish_path(map, robot, &path, "blocked", current.base(), end, false, now, outbound).await;
        }

        let actual_end = *nodes.last().unwrap();
        if actual_end != end {
            info!(robot, actual_end = actual_end.get(), destination = end.get(), "path cut at node {actual_end}");
        }
        let path = format_path(actual_end, current.base(), &nodes, &dirs);
        self.finish_path(map, robot, &path, "success", current.base(), actual_end, false, now, outbound).await
    }

    #[allow(clippy::too_many_arguments)]
    async fn finish_path(
        &self,
        map: &str,
        robot: &str,
        path: &str,
        status: &str,
        start_node: NodeId,
        end_node: NodeId,
        is_return: bool,
        _now: chrono::DateTime<Local>,
        outbound: &Arc<dyn OutboundBus>,
    ) -> BusResult<()> {
        let key = path_key(map, robot);
        self.store.hset(&key, "path", path.to_string()).await;
        self.store.hset(&key, "status", status.to_string()).await;
        self.store.hset(&key, "start_node", start_node.to_string()).await;
        self.store.hset(&key, "end_node", end_node.to_string()).await;
        self.store.hset(&key, "is_return", (is_return as u8).to_string()).await;

        outbound
            .publish(&server_response_topic(map, robot, "path_plan"), json!({"path": path}).to_string())
            .await;
        Ok(())
    }

    async fn handle_battery(&self, map: &str, robot: &str, battery_state: &str, charging_flag: i32) -> BusResult<()> {
        let charging = charging_flag != 0;
        let percent = crate::battery::voltage_to_percent(battery_state, charging)?;
        self.robot.update_battery(map, robot, percent as f32, charging, Local::now()).await?;
        Ok(())
    }

    async fn handle_arrive(
        &self,
        map: &str,
        robot: &str,
        current_raw: &str,
        outbound: &Arc<dyn OutboundBus>,
    ) -> BusResult<()> {
        let node = NodeRef::parse(current_raw)?;
        self.robot.update_status(map, robot, RobotStatus::Done, Some(node), Local::now()).await?;
        self.store
            .set(&arrive_marker_key(map, robot), current_raw.to_string(), Some(self.arrive_marker_ttl))
            .await;
        if let Some(graph) = self.graph.map(&MapName::new(map)) {
            graph.release_all(&RobotId::new(robot));
        }
        outbound
            .publish(&server_response_topic(map, robot, "arrive"), json!({"yes_or_no": "yes"}).to_string())
            .await;
        Ok(())
    }

    async fn handle_remove_path(&self, map: &str, robot: &str, current_raw: &str) -> BusResult<()> {
        let node = NodeRef::parse(current_raw)?;
        let robot_id = RobotId::new(robot);
        if let Some(graph) = self.graph.map(&MapName::new(map)) {
            graph.release(node.base(), Some(&robot_id));
        }
        self.store
            .publish(ROBOT_EVENTS_CHANNEL, json!({"event": "REMOVE", "map_name": map, "robot_id": robot}).to_string())
            .await;
        Ok(())
    }

    async fn handle_next(
        &self,
        map: &str,
        robot: &str,
        current_raw: &str,
        sub_position: Option<u8>,
        direction: char,
        outbound: &Arc<dyn OutboundBus>,
    ) -> BusResult<()> {
        let current = NodeRef::parse(current_raw)?;
        let cur_sub = current.sub().unwrap_or(0);
        let sub = sub_position.unwrap_or(cur_sub);

        let (next_node, next_sub) = if sub >= 4 {
            let Some(graph) = self.graph.map(&MapName::new(map)) else {
                warn!(map, "device next for unknown map, dropping");
                return Ok(());
            };
            let Some((neighbours, _)) = graph.get_node(current.base()) else {
                warn!(map, robot, "device next from unknown node, dropping");
                return Ok(());
            };
            let Some(next) = neighbours.get(direction) else {
                let path = format_nopath(current.base(), current.base());
                outbound
                    .publish(&server_response_topic(map, robot, "path_plan"), json!({"path": path}).to_string())
                    .await;
                return Ok(());
            };
            (next, 0)
        } else {
            (current.base(), sub + 1)
        };

        let path = format!(
            "{next_node}/{direction}~{next_node}-{next_sub}!{}-{cur_sub},{direction}/",
            current.base()
        );
        outbound
            .publish(&server_response_topic(map, robot, "path_plan"), json!({"path": path}).to_string())
            .await;
        Ok(())
    }

    async fn handle_robot_error(&self, map: &str, robot: &str) -> BusResult<()> {
        self.robot.update_status(map, robot, RobotStatus::Error, None, Local::now()).await?;
        self.store
            .publish(ROBOT_EVENTS_CHANNEL, json!({"event": "ERROR", "map_name": map, "robot_id": robot}).to_string())
            .await;
        Ok(())
    }
}
