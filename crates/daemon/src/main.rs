// SPDX-License-Identifier: MIT

//! `msd`: the leader-lifecycle core as a standalone process.
//!
//! Loads configuration, wires every collaborator, then drives the
//! service lifecycle shell until Ctrl+C (or a future signal handler)
//! triggers shutdown.

use ms_core::Config;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let config_path =
        std::env::var("MS_CONFIG_PATH").map(PathBuf::from).unwrap_or_else(|_| PathBuf::from("ms-scheduler.toml"));
    let config = Config::load(&config_path)?;
    let master_url = std::env::var("MS_MASTER_URL").unwrap_or_else(|_| "ws://127.0.0.1:5050/master/events".to_string());

    let mut daemon = ms_daemon::wire(config, master_url).await?;
    daemon.shell.start_up();
    let state_machine = daemon.shell.state_machine().clone();

    let shell = daemon.shell;
    let run_handle = tokio::spawn(async move { shell.run().await });

    tokio::signal::ctrl_c().await?;
    tracing::info!("received interrupt, triggering shutdown");
    state_machine.trigger_shutdown().await;

    run_handle.await?;
    daemon.scheduler_actor_task.abort();

    Ok(())
}
