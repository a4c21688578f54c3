// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Fyreflow Labs

//! Centralized environment variable access for the daemon crate.

use std::path::PathBuf;
use std::time::Duration;

/// Resolve the data directory: `FYREFLOW_DATA_DIR`, default `./data`.
pub fn data_dir() -> PathBuf {
    std::env::var("FYREFLOW_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("./data"))
}

/// Resolve the artifact storage root: `FYREFLOW_STORAGE_ROOT`, default `./storage`.
pub fn storage_root() -> PathBuf {
    std::env::var("FYREFLOW_STORAGE_ROOT")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("./storage"))
}

/// HTTP bind address, default `127.0.0.1:4180`.
pub fn bind_addr() -> String {
    std::env::var("FYREFLOW_BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:4180".to_string())
}

/// How many runs may be actively dispatching at once (§5 "bounded pool...
/// default small, e.g. 8"), overridable via `FYREFLOW_RUN_CONCURRENCY`.
pub fn run_concurrency() -> usize {
    std::env::var("FYREFLOW_RUN_CONCURRENCY")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(8)
}

/// Cron poll period override, default 15s (`FYREFLOW_CRON_POLL_MS`).
pub fn cron_poll_period() -> Duration {
    std::env::var("FYREFLOW_CRON_POLL_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(fyreflow_cron::DEFAULT_POLL_PERIOD)
}

/// Path to the log file `main.rs` appends to.
pub fn log_path() -> PathBuf {
    std::env::var("FYREFLOW_LOG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| data_dir().join("fyreflowd.log"))
}
