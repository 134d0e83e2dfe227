//! [`OperatorBusHandler`] — component C7. Subscribes to the operator
//! channel (a `Store` pub/sub channel, per §6's topic table) and converts
//! operator commands into `final_node` nudges on the server→robot button
//! topic. Grounded on `original_source/app/domain/redis_command/router.py`
//! for the `{type, mapName, robotId}` payload shape; the HTTP-triggered
//! legacy channel `robot:command` it actually publishes to is Open
//! Question 5 — routed here only under `legacy_operator_channel_enabled`.

use std::sync::Arc;

use chrono::Local;
use smartfarm_core::{MapConfig, MapName, NodeRef};
use smartfarm_graph::Graph;
use smartfarm_robot::RobotEngine;
use smartfarm_store::Store;
use tracing::{info, warn};

use crate::error::BusResult;
use crate::keys::server_response_topic;
use crate::operator_event::{OperatorEvent, OperatorKind};

pub const OPERATOR_CHANNEL: &str = "smartfarm";
/// Open Question 5: the HTTP-triggered legacy draft publishes operator
/// commands on this channel name instead. Off by default.
pub const LEGACY_OPERATOR_CHANNEL: &str = "robot:command";

pub struct OperatorBusHandler<S: Store> {
    graph: Arc<Graph>,
    robot: Arc<RobotEngine<S>>,
    store: Arc<S>,
    config: MapConfig,
}

impl<S: Store> OperatorBusHandler<S> {
    pub fn new(graph: Arc<Graph>, robot: Arc<RobotEngine<S>>, store: Arc<S>, config: MapConfig) -> Self {
        Self { graph, robot, store, config }
    }

    async fn handle(&self, event: OperatorEvent) -> BusResult<()> {
        match event.kind {
            OperatorKind::Start => self.handle_start(&event.map_name, &event.robot_id).await,
            OperatorKind::Next => self.handle_next(&event.map_name, &event.robot_id).await,
            OperatorKind::Return => self.handle_return(&event.map_name, &event.robot_id).await,
        }
    }

    async fn handle_start(&self, map: &str, robot: &str) -> BusResult<()> {
        let Some(record) = self.robot.get(map, robot).await? else {
            warn!(map, robot, "operator start for unknown robot, ignoring");
            return Ok(());
        };
        let Some(current) = record.current_node else {
            warn!(map, robot, "operator start before first position update, ignoring");
            return Ok(());
        };
        let Some(graph) = self.graph.map(&MapName::new(map)) else {
            warn!(map, "operator start for unknown map, ignoring");
            return Ok(());
        };
        let Some((neighbours, _)) = graph.get_node(current.base()) else {
            warn!(map, robot, node = current.base().get(), "operator start from unknown node, ignoring");
            return Ok(());
        };
        let Some(target) = neighbours.l else {
            warn!(map, robot, "no left neighbour for operator start, ignoring");
            return Ok(());
        };
        self.publish_button(map, robot, &target.get().to_string()).await;
        Ok(())
    }

    async fn handle_next(&self, map: &str, robot: &str) -> BusResult<()> {
        let Some(record) = self.robot.get(map, robot).await? else {
            warn!(map, robot, "operator next for unknown robot, ignoring");
            return Ok(());
        };
        let Some(current) = record.current_node else {
            warn!(map, robot, "operator next before first position update, ignoring");
            return Ok(());
        };
        let Some(graph) = self.graph.map(&MapName::new(map)) else {
            warn!(map, "operator next for unknown map, ignoring");
            return Ok(());
        };
        let sub = current.sub().unwrap_or(0);
        let target = match sub {
            0 => format!("{}-1", current.base()),
            1..=3 => format!("{}-{}", current.base(), sub + 1),
            _ => {
                let Some((neighbours, _)) = graph.get_node(current.base()) else {
                    warn!(map, robot, "operator next from unknown node, ignoring");
                    return Ok(());
                };
                let Some(next) = neighbours.l else {
                    warn!(map, robot, "no left neighbour for operator next at sub 4, ignoring");
                    return Ok(());
                };
                format!("{next}-0")
            }
        };
        self.publish_button(map, robot, &target).await;
        Ok(())
    }

    async fn handle_return(&self, map: &str, robot: &str) -> BusResult<()> {
        let Some(record) = self.robot.get(map, robot).await? else {
            warn!(map, robot, "operator return for unknown robot, ignoring");
            return Ok(());
        };
        let Some(current) = record.current_node else {
            warn!(map, robot, "operator return before first position update, ignoring");
            return Ok(());
        };
        let home = self.config.charging_node;
        self.publish_button(map, robot, &home.to_string()).await;
        self.robot.update_position(map, robot, current, Some(home), Local::now()).await?;
        Ok(())
    }

    async fn publish_button(&self, map: &str, robot: &str, final_node: &str) {
        let topic = server_response_topic(map, robot, "button");
        self.store
            .publish(&topic, serde_json::json!({"final_node": final_node}).to_string())
            .await;
    }

    /// Drains the operator channel (plus the legacy compatibility channel,
    /// when enabled) — one receiver task per ingress bus, per §5.
    pub async fn run(&self, legacy_channel_enabled: bool) {
        info!(channel = OPERATOR_CHANNEL, "operator bus handler started");
        let mut primary = self.store.subscribe(OPERATOR_CHANNEL);
        let mut legacy = legacy_channel_enabled.then(|| self.store.subscribe(LEGACY_OPERATOR_CHANNEL));

        loop {
            let payload = if let Some(legacy_rx) = legacy.as_mut() {
                tokio::select! {
                    msg = primary.recv() => msg,
                    msg = legacy_rx.recv() => msg,
                }
            } else {
                primary.recv().await
            };

            let Ok((_, payload)) = payload else { continue };
            match OperatorEvent::decode(&payload) {
                Ok(event) => {
                    if let Err(err) = self.handle(event).await {
                        warn!(%err, "operator event handling failed");
                    }
                }
                Err(err) => warn!(%err, payload, "malformed operator payload, dropping"),
            }
        }
    }
}
