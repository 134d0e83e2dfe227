//! `StatsEngine` — component C5 (Daily Stats) and the scan-and-reopen logic
//! behind component C8 (Daily Reset Scheduler).

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Local, NaiveDate, NaiveTime};
use smartfarm_core::RobotOperationState;
use smartfarm_store::Store;
use tracing::{info, warn};

use crate::cursor::CurrentStateCursor;
use crate::error::StatsResult;
use crate::keys::{CURRENT_STATE_SCAN_PATTERN, current_state_key, daily_stats_key, parse_current_state_key};

pub const OPERATION_STATES: [RobotOperationState; 4] = [
    RobotOperationState::Working,
    RobotOperationState::FullChargeIdle,
    RobotOperationState::Charging,
    RobotOperationState::Idle,
];

pub struct StatsEngine<S: Store> {
    store: Arc<S>,
    daily_stats_ttl: StdDuration,
}

impl<S: Store> StatsEngine<S> {
    pub fn new(store: Arc<S>, daily_stats_ttl: StdDuration) -> Self {
        Self { store, daily_stats_ttl }
    }

    pub async fn current_state(&self, map: &str, robot: &str) -> StatsResult<Option<CurrentStateCursor>> {
        let key = current_state_key(map, robot);
        let Some(fields) = self.store.hgetall(&key).await else { return Ok(None) };
        CurrentStateCursor::from_fields(&fields).map_err(Into::into)
    }

    pub async fn node_count(&self, map: &str, robot: &str) -> StatsResult<u32> {
        Ok(self.current_state(map, robot).await?.map(|c| c.node_count).unwrap_or(0))
    }

    pub async fn set_node_count(&self, map: &str, robot: &str, count: u32) -> StatsResult<()> {
        self.store
            .hset(&current_state_key(map, robot), "node_count", count.to_string())
            .await;
        Ok(())
    }

    /// Closes the currently-open interval (if any) and opens a new one
    /// under `new_state` at `t`. Callers must guard against no-op churn —
    /// `start_state` is only idempotent on equal `(state, started_at)`.
    pub async fn start_state(
        &self,
        map: &str,
        robot: &str,
        new_state: RobotOperationState,
        t: DateTime<Local>,
    ) -> StatsResult<()> {
        let key = current_state_key(map, robot);
        let node_count = self.node_count(map, robot).await?;

        if let Some(cursor) = self.current_state(map, robot).await? {
            self.split_and_add_duration(map, robot, cursor.state, cursor.started_at, t).await?;
        }

        let cursor = CurrentStateCursor { state: new_state, started_at: t, node_count };
        for (field, value) in cursor.to_fields() {
            self.store.hset(&key, field, value).await;
        }
        info!(robot, state = new_state.as_str(), "state started");
        Ok(())
    }

    /// Recovery path for missed midnight ticks: splits `[started_at, ended_at)`
    /// at every date boundary it spans and accumulates each segment into its
    /// own day's bucket.
    async fn split_and_add_duration(
        &self,
        map: &str,
        robot: &str,
        state: RobotOperationState,
        started_at: DateTime<Local>,
        ended_at: DateTime<Local>,
    ) -> StatsResult<()> {
        let start_date = started_at.date_naive();
        let end_date = ended_at.date_naive();

        if start_date == end_date {
            let duration = (ended_at - started_at).num_milliseconds() as f64 / 1000.0;
            self.add_duration(map, robot, state, duration, start_date).await;
            return Ok(());
        }

        warn!(robot, %start_date, %end_date, "state spans multiple days, daily reset may have failed");

        let mut current_date = start_date;
        let mut current_time = started_at;
        loop {
            let end_of_day = current_date
                .and_time(NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap())
                .and_local_timezone(Local)
                .single()
                .unwrap_or(ended_at);
            let segment_end = if current_date == end_date { ended_at } else { end_of_day };
            let duration = (segment_end - current_time).num_milliseconds() as f64 / 1000.0;
            self.add_duration(map, robot, state, duration, current_date).await;

            if current_date == end_date {
                break;
            }
            current_date = current_date.succ_opt().expect("date overflow");
            current_time = current_date
                .and_time(NaiveTime::MIN)
                .and_local_timezone(Local)
                .single()
                .unwrap_or(ended_at);
        }
        Ok(())
    }

    async fn add_duration(&self, map: &str, robot: &str, state: RobotOperationState, duration: f64, date: NaiveDate) {
        let key = daily_stats_key(map, robot, date);
        let field = state.as_str();
        let current: f64 = self.store.hget(&key, field).await.and_then(|s| s.parse().ok()).unwrap_or(0.0);
        self.store.hset(&key, field, (current + duration).to_string()).await;
        self.store.expire(&key, self.daily_stats_ttl).await;
    }

    /// Reads the day bucket for `date` (today if `None`) and, if the cursor's
    /// open interval started on that same date, folds in its still-running
    /// duration.
    pub async fn get_daily_stats(
        &self,
        map: &str,
        robot: &str,
        date: Option<NaiveDate>,
        now: DateTime<Local>,
    ) -> StatsResult<HashMap<&'static str, f64>> {
        let target_date = date.unwrap_or_else(|| now.date_naive());
        let key = daily_stats_key(map, robot, target_date);

        let mut result: HashMap<&'static str, f64> = OPERATION_STATES.iter().map(|s| (s.as_str(), 0.0)).collect();
        if let Some(stored) = self.store.hgetall(&key).await {
            for state in OPERATION_STATES {
                if let Some(v) = stored.get(state.as_str()).and_then(|s| s.parse().ok()) {
                    result.insert(state.as_str(), v);
                }
            }
        }

        if let Some(cursor) = self.current_state(map, robot).await? {
            if cursor.started_at.date_naive() == target_date {
                let ongoing = (now - cursor.started_at).num_milliseconds() as f64 / 1000.0;
                *result.entry(cursor.state.as_str()).or_insert(0.0) += ongoing;
            }
        }

        Ok(result)
    }

    /// Component C8: scans every open cursor and re-calls `start_state` with
    /// its own current state — closing yesterday's interval into
    /// yesterday's bucket and opening today's under the same state.
    pub async fn reset_all(&self, now: DateTime<Local>) -> StatsResult<usize> {
        let keys = self.store.scan(CURRENT_STATE_SCAN_PATTERN).await;
        let mut reset_count = 0;
        for key in keys {
            let Some((map, robot)) = parse_current_state_key(&key) else { continue };
            let Some(cursor) = self.current_state(&map, &robot).await? else { continue };
            self.start_state(&map, &robot, cursor.state, now).await?;
            reset_count += 1;
        }
        info!(reset_count, "daily reset completed");
        Ok(reset_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use smartfarm_store::MemoryStore;

    fn engine() -> StatsEngine<MemoryStore> {
        StatsEngine::new(Arc::new(MemoryStore::new()), StdDuration::from_secs(30 * 24 * 60 * 60))
    }

    #[tokio::test]
    async fn start_state_is_additive_across_calls() {
        let e = engine();
        let t0 = Local.with_ymd_and_hms(2024, 5, 10, 8, 0, 0).unwrap();
        let t1 = t0 + chrono::Duration::seconds(30);
        e.start_state("m", "r1", RobotOperationState::Working, t0).await.unwrap();
        e.start_state("m", "r1", RobotOperationState::Idle, t1).await.unwrap();

        let stats = e.get_daily_stats("m", "r1", Some(t0.date_naive()), t1).await.unwrap();
        assert_eq!(stats[RobotOperationState::Working.as_str()], 30.0);
    }

    #[tokio::test]
    async fn daily_boundary_split_credits_both_days() {
        let e = engine();
        let started = Local.with_ymd_and_hms(2024, 5, 10, 23, 59, 40, ).unwrap();
        let ended = Local.with_ymd_and_hms(2024, 5, 11, 0, 0, 20).unwrap();
        e.start_state("m", "r1", RobotOperationState::Working, started).await.unwrap();
        e.start_state("m", "r1", RobotOperationState::Idle, ended).await.unwrap();

        let day1 = e.get_daily_stats("m", "r1", Some(started.date_naive()), ended).await.unwrap();
        let day2 = e.get_daily_stats("m", "r1", Some(ended.date_naive()), ended).await.unwrap();
        assert_eq!(day1[RobotOperationState::Working.as_str()], 20.0);
        assert_eq!(day2[RobotOperationState::Working.as_str()], 20.0);
    }

    #[tokio::test]
    async fn ongoing_interval_is_included_for_current_date() {
        let e = engine();
        let t0 = Local.with_ymd_and_hms(2024, 5, 10, 8, 0, 0).unwrap();
        e.start_state("m", "r1", RobotOperationState::Working, t0).await.unwrap();
        let now = t0 + chrono::Duration::seconds(90);
        let stats = e.get_daily_stats("m", "r1", None, now).await.unwrap();
        assert_eq!(stats[RobotOperationState::Working.as_str()], 90.0);
    }

    #[tokio::test]
    async fn reset_all_reopens_every_cursor_under_same_state() {
        let e = engine();
        let t0 = Local.with_ymd_and_hms(2024, 5, 10, 23, 0, 0).unwrap();
        e.start_state("m", "r1", RobotOperationState::Working, t0).await.unwrap();
        e.start_state("m", "r2", RobotOperationState::Idle, t0).await.unwrap();

        let midnight = Local.with_ymd_and_hms(2024, 5, 11, 0, 0, 0).unwrap();
        let count = e.reset_all(midnight).await.unwrap();
        assert_eq!(count, 2);

        let c1 = e.current_state("m", "r1").await.unwrap().unwrap();
        assert_eq!(c1.state, RobotOperationState::Working);
        assert_eq!(c1.started_at, midnight);
    }
}
