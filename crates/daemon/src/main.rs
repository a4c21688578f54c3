// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Fyreflow Labs

//! Fyreflow Daemon (fyreflowd)
//!
//! Background process owning the pipeline/run store, the secrets vault,
//! the run engine and the cron scheduler behind an HTTP/JSON API.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

use fyreflow_daemon::{router, AppState, DaemonConfig};
use tokio::signal::unix::{signal, SignalKind};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Some(arg) = std::env::args().nth(1) {
        match arg.as_str() {
            "--version" | "-V" | "-v" => {
                println!("fyreflowd {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" | "-h" | "help" => {
                println!("fyreflowd {}", env!("CARGO_PKG_VERSION"));
                println!("Fyreflow daemon - run scheduler, quality gates and secrets vault over HTTP");
                println!();
                println!("USAGE:");
                println!("    fyreflowd");
                println!();
                println!("Configuration is read entirely from the environment:");
                println!("    FYREFLOW_DATA_DIR         pipeline/run store + vault location (default ./data)");
                println!("    FYREFLOW_STORAGE_ROOT     step artifact storage root (default ./storage)");
                println!("    FYREFLOW_BIND_ADDR        HTTP bind address (default 127.0.0.1:4180)");
                println!("    FYREFLOW_RUN_CONCURRENCY  max concurrently dispatching runs (default 8)");
                println!("    FYREFLOW_CRON_POLL_MS     cron poll period in ms (default 15000)");
                println!("    FYREFLOW_LOG_PATH         log file path (default <data-dir>/fyreflowd.log)");
                println!("    DASHBOARD_SECRETS_KEY     vault master key (falls back to a data-dir key file)");
                return Ok(());
            }
            _ => {
                eprintln!("error: unexpected argument '{arg}'");
                eprintln!("Usage: fyreflowd [--help | --version]");
                std::process::exit(1);
            }
        }
    }

    let config = DaemonConfig::load();
    let _log_guard = setup_logging(&config)?;

    info!(bind_addr = %config.bind_addr, "starting fyreflowd");

    let state = AppState::new(&config)?;
    let cron_handle = fyreflow_daemon::spawn_cron_task(state.clone(), config.cron_poll_period);

    let app = router(state);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(addr = %config.bind_addr, "listening");
    println!("READY");

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            tokio::select! {
                _ = sigterm.recv() => info!("received SIGTERM, shutting down"),
                _ = sigint.recv() => info!("received SIGINT, shutting down"),
            }
        })
        .await?;

    cron_handle.abort();
    info!("fyreflowd stopped");
    Ok(())
}

fn setup_logging(
    config: &DaemonConfig,
) -> Result<tracing_appender::non_blocking::WorkerGuard, std::io::Error> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if let Some(parent) = config.log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file_appender = tracing_appender::rolling::never(
        config
            .log_path
            .parent()
            .ok_or_else(|| std::io::Error::other("log path has no parent directory"))?,
        config
            .log_path
            .file_name()
            .ok_or_else(|| std::io::Error::other("log path has no file name"))?,
    );
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking))
        .init();

    Ok(guard)
}
