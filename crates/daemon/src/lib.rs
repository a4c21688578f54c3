// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Fyreflow Labs

//! `fyreflowd`: the long-running process that owns the pipeline/run store,
//! the secrets vault, the run engine and the cron scheduler behind an
//! HTTP/JSON API. Split into a library so integration tests can build an
//! [`AppState`] and an [`http::router`] without a running process.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod config;
mod cron_task;
mod env;
mod error;
mod events;
mod http;
mod lifecycle;
mod state;

pub use config::DaemonConfig;
pub use cron_task::spawn as spawn_cron_task;
pub use error::DaemonError;
pub use events::EventBus;
pub use http::router;
pub use state::AppState;
