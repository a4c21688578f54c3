// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Fyreflow Labs

//! Environment variable access for the CLI, mirroring `fyreflow-daemon::env`'s
//! free-function-with-fallback shape so the two crates read the same knobs
//! consistently (`FYREFLOW_BIND_ADDR`'s default port is this crate's default
//! base URL port).

use std::time::Duration;

/// Base URL of the daemon's HTTP API: `FYREFLOW_BASE_URL`, default
/// `http://127.0.0.1:4180` (matches `fyreflow-daemon::env::bind_addr`'s default).
pub fn base_url() -> String {
    std::env::var("FYREFLOW_BASE_URL").unwrap_or_else(|_| "http://127.0.0.1:4180".to_string())
}

/// Per-request HTTP timeout, default 30s (`FYREFLOW_HTTP_TIMEOUT_MS`).
pub fn http_timeout() -> Duration {
    std::env::var("FYREFLOW_HTTP_TIMEOUT_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_secs(30))
}
