//! The composition root. `App` owns every long-lived collaborator and
//! wires components C1–C9 together exactly as §2's crate-mapping table
//! prescribes; `App::build` / `App::spawn` follow `dt_sim::SimBuilder` /
//! `Sim::run`'s construct-then-run split.

use std::sync::Arc;

use smartfarm_bus::{ConnectionTracker, DeviceBusHandler, InMemoryBus, InMemoryInbound, OperatorBusHandler, OutboundBus};
use smartfarm_graph::Graph;
use smartfarm_planner::BfsPlanner;
use smartfarm_robot::RobotEngine;
use smartfarm_stats::{DailyResetScheduler, StatsEngine};
use smartfarm_store::MemoryStore;
use tokio::task::JoinHandle;
use tracing::info;

use crate::admin::AdminApi;
use crate::config::Config;

/// Owns every long-lived collaborator. The two ingress buses' single-
/// consumer receivers live here as `Option`s until [`App::spawn`] takes
/// them; the producer/observer side (`*_bus_handle`, `device_responses`)
/// stays usable for the life of the process either way.
pub struct App {
    config: Config,
    store: Arc<MemoryStore>,
    graph: Arc<Graph>,
    robot: Arc<RobotEngine<MemoryStore>>,
    stats: Arc<StatsEngine<MemoryStore>>,
    admin: AdminApi<MemoryStore>,
    device_bus: Arc<InMemoryBus>,
    device_inbound: Option<InMemoryInbound>,
    broker_bus: Arc<InMemoryBus>,
    broker_inbound: Option<InMemoryInbound>,
}

impl App {
    /// Builds every collaborator from `config`. Grid authoring (seeding
    /// `graph` with real maps) is out of scope — maps register lazily as
    /// `smartfarm-graph::Graph::insert_map` is called by an external
    /// loader; an empty `Graph` is a valid starting state.
    pub fn build(config: Config) -> Self {
        let store = Arc::new(MemoryStore::new());
        let graph = Arc::new(Graph::new());
        let stats = Arc::new(StatsEngine::new(store.clone(), config.daily_stats_ttl));
        let robot = Arc::new(RobotEngine::new(store.clone(), stats.clone(), config.map.clone()));
        let admin = AdminApi::new(graph.clone(), robot.clone(), stats.clone());
        let (device_bus, device_inbound) = InMemoryBus::new(config.device_bus_capacity);
        let (broker_bus, broker_inbound) = InMemoryBus::new(config.broker_bus_capacity);
        Self {
            config,
            store,
            graph,
            robot,
            stats,
            admin,
            device_bus: Arc::new(device_bus),
            device_inbound: Some(device_inbound),
            broker_bus: Arc::new(broker_bus),
            broker_inbound: Some(broker_inbound),
        }
    }

    pub fn admin(&self) -> &AdminApi<MemoryStore> {
        &self.admin
    }

    /// A cloneable handle that pushes raw envelopes onto the device bus —
    /// the seam a real MQTT client bridge would drive.
    pub fn device_bus_handle(&self) -> smartfarm_bus::InMemoryBusHandle {
        self.device_bus.handle()
    }

    /// A cloneable handle that pushes raw envelopes onto the broker-event
    /// bus (`events/client/connected|disconnected`).
    pub fn broker_bus_handle(&self) -> smartfarm_bus::InMemoryBusHandle {
        self.broker_bus.handle()
    }

    /// Observes everything the device-bus handler publishes
    /// (`{map}/{robot}/server/*`).
    pub fn device_responses(&self) -> tokio::sync::broadcast::Receiver<smartfarm_bus::Envelope> {
        self.device_bus.subscribe_outbound()
    }

    /// Spawns one task per ingress bus (§5's scheduling model). Panics if
    /// called twice — the ingress receivers are single-consumer and are
    /// taken the first time.
    pub fn spawn(&mut self) -> Vec<JoinHandle<()>> {
        let device_inbound = self.device_inbound.take().expect("App::spawn called more than once");
        let broker_inbound = self.broker_inbound.take().expect("App::spawn called more than once");

        let device_outbound: Arc<dyn OutboundBus> = self.device_bus.clone();
        let device_handler = Arc::new(DeviceBusHandler::new(
            self.graph.clone(),
            BfsPlanner,
            self.robot.clone(),
            self.store.clone(),
            self.config.map.clone(),
            self.config.map_name_prefix.clone(),
            self.config.arrive_marker_ttl,
        ));
        let operator_handler = Arc::new(OperatorBusHandler::new(
            self.graph.clone(),
            self.robot.clone(),
            self.store.clone(),
            self.config.map.clone(),
        ));
        let connection_tracker = Arc::new(ConnectionTracker::new(self.store.clone()));
        let scheduler = Arc::new(DailyResetScheduler::new(self.stats.clone()));

        let mut handles = Vec::new();

        handles.push(tokio::spawn(async move {
            device_handler.run(device_inbound, device_outbound).await;
        }));
        {
            let legacy = self.config.legacy_operator_channel_enabled;
            handles.push(tokio::spawn(async move {
                operator_handler.run(legacy).await;
            }));
        }
        handles.push(tokio::spawn(async move {
            connection_tracker.run(broker_inbound).await;
        }));
        handles.push(tokio::spawn(async move {
            if let Err(err) = scheduler.run().await {
                tracing::error!(%err, "daily reset scheduler exited");
            }
        }));

        info!(tasks = handles.len(), "controller started");
        handles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smartfarm_bus::Envelope;
    use std::time::Duration;

    #[tokio::test]
    async fn spawn_starts_every_ingress_task() {
        let mut app = App::build(Config::default());
        let handles = app.spawn();
        assert_eq!(handles.len(), 4);

        let mut responses = app.device_responses();
        let device_in = app.device_bus_handle();
        device_in
            .send(Envelope::new("smartfarm_x/r1/robot/arrive", r#"{"current_node":"5"}"#))
            .await;

        let envelope = tokio::time::timeout(Duration::from_secs(1), responses.recv())
            .await
            .expect("response within timeout")
            .unwrap();
        assert_eq!(envelope.topic, "smartfarm_x/r1/server/arrive");
        assert_eq!(envelope.payload, r#"{"yes_or_no":"yes"}"#);

        for handle in handles {
            handle.abort();
        }
    }
}
