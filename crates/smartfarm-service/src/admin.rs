//! Component C10 — the admin/query surface. Per §1's non-goals this stops
//! at thin read wrappers over C2 (graph/occupancy), C4 (robot state) and
//! C5 (daily stats); no HTTP framework is wired in, only the contract an
//! HTTP layer would call into, in the shape of `ConfigService`'s
//! thin-wrapper-over-a-port pattern in `echo-app-core`.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Local, NaiveDate};
use smartfarm_core::{MapName, NodeId, RobotId};
use smartfarm_graph::Graph;
use smartfarm_robot::{RobotEngine, RobotRecord};
use smartfarm_stats::StatsEngine;
use smartfarm_store::Store;

/// Read-only view over the running controller's state. Every method here
/// is a direct pass-through to the collaborator that owns the data —
/// this type holds no state of its own.
pub struct AdminApi<S: Store> {
    graph: Arc<Graph>,
    robot: Arc<RobotEngine<S>>,
    stats: Arc<StatsEngine<S>>,
}

impl<S: Store> AdminApi<S> {
    pub fn new(graph: Arc<Graph>, robot: Arc<RobotEngine<S>>, stats: Arc<StatsEngine<S>>) -> Self {
        Self { graph, robot, stats }
    }

    /// C4 read: the current snapshot for one robot, if it has ever reported.
    pub async fn robot(&self, map: &str, robot_id: &str) -> smartfarm_robot::RobotResult<Option<RobotRecord>> {
        self.robot.get(map, robot_id).await
    }

    /// C2 read: every occupied node on `map`, keyed by node id.
    pub fn occupied_nodes(&self, map: &str) -> Option<HashMap<NodeId, RobotId>> {
        self.graph.map(&MapName::new(map)).map(|g| g.list_occupied())
    }

    /// C5 read: the accumulated per-state durations for `robot` on `date`
    /// (today if `None`), including its still-open interval.
    pub async fn daily_stats(
        &self,
        map: &str,
        robot_id: &str,
        date: Option<NaiveDate>,
        now: DateTime<Local>,
    ) -> smartfarm_stats::StatsResult<HashMap<&'static str, f64>> {
        self.stats.get_daily_stats(map, robot_id, date, now).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smartfarm_core::MapConfig;
    use smartfarm_graph::seed_line_graph;
    use smartfarm_store::MemoryStore;
    use std::time::Duration;

    fn setup() -> AdminApi<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        let stats = Arc::new(StatsEngine::new(store.clone(), Duration::from_secs(30 * 24 * 60 * 60)));
        let robot = Arc::new(RobotEngine::new(store.clone(), stats.clone(), MapConfig::default()));
        let graph = Arc::new(Graph::new());
        graph.insert_map(MapName::new("smartfarm_x"), seed_line_graph(10));
        AdminApi::new(graph, robot, stats)
    }

    #[tokio::test]
    async fn unknown_robot_reads_as_none() {
        let api = setup();
        assert!(api.robot("smartfarm_x", "r1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn occupied_nodes_reflects_graph_state() {
        let api = setup();
        let graph = api.graph.map(&MapName::new("smartfarm_x")).unwrap();
        graph.occupy(NodeId::new(5).unwrap(), &RobotId::new("r1")).unwrap();
        let occupied = api.occupied_nodes("smartfarm_x").unwrap();
        assert_eq!(occupied.get(&NodeId::new(5).unwrap()), Some(&RobotId::new("r1")));
    }

    #[tokio::test]
    async fn daily_stats_defaults_to_zeroed_buckets() {
        let api = setup();
        let stats = api.daily_stats("smartfarm_x", "r1", None, Local::now()).await.unwrap();
        assert_eq!(stats.values().sum::<f64>(), 0.0);
    }
}
