// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Fyreflow Labs

//! Daemon-wide configuration, resolved once at startup from [`crate::env`]
//! (teacher pattern: `oj-daemon::lifecycle::Config::load`, a small struct
//! bundling free-function env reads rather than a generic config-file
//! format — this workspace has no config file either).

use std::path::PathBuf;
use std::time::Duration;

use crate::env;

#[derive(Debug, Clone)]
pub struct DaemonConfig {
    pub data_dir: PathBuf,
    pub storage_root: PathBuf,
    pub bind_addr: String,
    pub run_concurrency: usize,
    pub cron_poll_period: Duration,
    pub log_path: PathBuf,
}

impl DaemonConfig {
    pub fn load() -> Self {
        Self {
            data_dir: env::data_dir(),
            storage_root: env::storage_root(),
            bind_addr: env::bind_addr(),
            run_concurrency: env::run_concurrency(),
            cron_poll_period: env::cron_poll_period(),
            log_path: env::log_path(),
        }
    }
}
