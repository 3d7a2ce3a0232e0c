//! dmsg daemon Entry Point

use clap::Parser;
use dmsg_daemon::bootstrap::{self, EXIT_FATAL};
use dmsg_daemon::cli::Cli;
use dmsg_daemon::health::SchedulerExit;
use dmsg_daemon::logging;
use dmsg_daemon::shutdown::{watch_os_signals, ShutdownController};
use std::process::ExitCode;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = logging::init() {
        eprintln!("Failed to initialize logging: {}", e);
        return ExitCode::from(EXIT_FATAL);
    }

    info!(version = env!("CARGO_PKG_VERSION"), "dmsg-daemon starting");

    let config = match cli.into_config() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return ExitCode::from(EXIT_FATAL);
        }
    };

    let shutdown = ShutdownController::default();
    tokio::spawn(watch_os_signals(shutdown.clone()));

    let outcome = bootstrap::run(config, shutdown).await;
    match &outcome {
        Ok(SchedulerExit::Cancelled) => info!("Done."),
        Ok(SchedulerExit::ClientInit(e)) => {
            error!(error = %e, "Cannot create overlay client, exiting")
        }
        Ok(SchedulerExit::PeerLoad(e)) => error!(error = %e, "Cannot load peer list, exiting"),
        Err(e) => error!("{:#}", e),
    }

    ExitCode::from(bootstrap::exit_status(&outcome))
}
