//! `DailyResetScheduler` — component C8. A deterministic sleep-until-midnight
//! loop, the async analogue of the source's APScheduler cron job, grounded in
//! the fixed-interval tick loop shape used elsewhere in this stack.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{Local, NaiveTime};
use smartfarm_store::Store;
use tracing::{error, info, instrument};

use crate::engine::StatsEngine;
use crate::error::StatsResult;

pub struct DailyResetScheduler<S: Store> {
    engine: Arc<StatsEngine<S>>,
}

impl<S: Store + 'static> DailyResetScheduler<S> {
    pub fn new(engine: Arc<StatsEngine<S>>) -> Self {
        Self { engine }
    }

    /// Runs forever, firing [`StatsEngine::reset_all`] at local midnight.
    /// Never returns under normal operation — callers spawn this as its own
    /// task and let it run for the lifetime of the process.
    #[instrument(skip(self))]
    pub async fn run(&self) -> StatsResult<()> {
        info!("daily reset scheduler started");
        loop {
            let sleep_for = duration_until_next_midnight();
            info!(sleep_secs = sleep_for.as_secs(), "sleeping until next midnight");
            tokio::time::sleep(sleep_for).await;

            let now = Local::now();
            match self.engine.reset_all(now).await {
                Ok(count) => info!(count, "daily reset fired"),
                Err(err) => error!(%err, "daily reset failed"),
            }
        }
    }
}

/// Wall-clock distance to the next local `00:00:00`. Always strictly
/// positive so a tick fired exactly at midnight still sleeps a full day
/// rather than spinning.
fn duration_until_next_midnight() -> StdDuration {
    let now = Local::now();
    let today_midnight = now.date_naive().and_time(NaiveTime::MIN).and_local_timezone(Local).single();
    let next_midnight = match today_midnight {
        Some(t) if t > now => t,
        _ => {
            let tomorrow = now.date_naive().succ_opt().expect("date overflow");
            tomorrow
                .and_time(NaiveTime::MIN)
                .and_local_timezone(Local)
                .single()
                .unwrap_or(now)
        }
    };
    (next_midnight - now).to_std().unwrap_or(StdDuration::from_secs(86400))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_until_midnight_is_always_positive_and_bounded() {
        let d = duration_until_next_midnight();
        assert!(d.as_secs() > 0);
        assert!(d.as_secs() <= 86400);
    }
}
