// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Fyreflow Labs

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CronError {
    #[error("unknown IANA timezone: {0}")]
    InvalidTimezone(String),
    #[error("invalid cron expression: {0}")]
    InvalidCron(String),
}
