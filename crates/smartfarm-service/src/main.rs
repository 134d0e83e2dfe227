//! Process entry point for the smartfarm fleet controller. Wiring follows
//! the teacher's `examples/xsmall` binary shape — a numbered sequence of
//! build steps ending in a run call — generalized from a one-shot
//! simulation run to a long-lived service with a signal-driven shutdown.

mod admin;
mod app;
mod config;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use app::App;
use config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Logging: env-filter controlled, defaulting to info, one target per
    //    component module (`smartfarm_bus`, `smartfarm_stats`, ...).
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // 2. Configuration.
    let config = Config::from_env()?;
    tracing::info!(
        map_name_prefix = %config.map_name_prefix,
        charging_node = %config.map.charging_node,
        "loaded configuration"
    );

    // 3. Build every collaborator.
    let mut app = App::build(config);

    // 4. Spawn one task per ingress bus plus the daily reset scheduler.
    let handles = app.spawn();

    // 5. Run until interrupted.
    tokio::signal::ctrl_c().await?;
    tracing::info!("shutdown signal received, stopping controller");
    for handle in handles {
        handle.abort();
    }

    Ok(())
}
