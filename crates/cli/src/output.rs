// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Fyreflow Labs

use clap::ValueEnum;
use serde::Serialize;

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Format a run's `started_at_ms` timestamp as relative time (`"5s"`, `"2m"`, `"1h"`, `"3d"`).
pub fn format_time_ago(epoch_ms: u64) -> String {
    if epoch_ms == 0 {
        return "-".to_string();
    }
    let now_ms = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(epoch_ms);
    fyreflow_core::format_elapsed_ms(now_ms.saturating_sub(epoch_ms))
}

/// Render a `#[serde(rename_all = "snake_case")]` enum (e.g. `RunStatus`) the
/// same way the wire format does, since `{:?}` would print `AwaitingApproval`
/// rather than `awaiting_approval`.
pub fn status_str<T: Serialize>(status: &T) -> String {
    serde_json::to_value(status)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_else(|| "unknown".to_string())
}
