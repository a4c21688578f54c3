// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Fyreflow Labs

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! fyreflow-cron: the schedule poll loop (C8). Resolves a [`fyreflow_core::Schedule`]'s
//! next due time in its IANA timezone, skips pipelines that are already
//! active or preflight-dirty, and hands a due, clean pipeline off to a
//! caller-supplied [`poll::RunTrigger`].
//!
//! This crate has no opinion on how pipelines are stored, how an active run
//! is detected, or how a run is actually started — those seams are traits so
//! `fyreflow-daemon` can wire them to `fyreflow-store`/`fyreflow-engine`
//! without this crate depending on either.

pub mod error;
pub mod poll;
pub mod schedule;

pub use error::CronError;
pub use poll::{
    ActiveRunTracker, CronScheduler, PreflightGate, RunTrigger, ScheduleEventSink, ScheduleSource,
    SkipReason, DEFAULT_POLL_PERIOD,
};
pub use schedule::{is_due_now, next_fire_after};
