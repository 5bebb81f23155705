//! pipeguardd - pipeguard node daemon

use anyhow::Result;
use clap::Parser;
use pipeguard_daemon::{Cli, Daemon, logging, settings};
use pipeguard_tasks::EventCategory;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.json)?;

    let config = settings::resolve(&cli)?;
    tracing::info!(
        category = EventCategory::Bootstrap.as_str(),
        version = env!("CARGO_PKG_VERSION"),
        node = %config.node_id,
        capacity = config.channel_capacity,
        restart_mode = ?cli.restart_mode,
        "starting pipeguardd"
    );

    let report = Daemon::new(config, cli.restart_mode)
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
        })
        .await?;

    tracing::info!(
        category = EventCategory::Bootstrap.as_str(),
        generations = report.generations,
        restarts = report.faults.len(),
        "pipeguardd stopped"
    );
    Ok(())
}
