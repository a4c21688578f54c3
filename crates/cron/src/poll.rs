// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Fyreflow Labs

//! The tick algorithm (§4.8): load schedule-enabled pipelines, resolve due
//! times, and dispatch or skip. Storage, run-activity and run-triggering are
//! traits so this crate stays independent of `fyreflow-store`/`fyreflow-engine`.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fyreflow_core::{Pipeline, PipelineId, RunId};
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::schedule::is_due_now;

/// Default poll period (§4.8: "~15 s").
pub const DEFAULT_POLL_PERIOD: Duration = Duration::from_secs(15);

/// Why a due-or-not-due pipeline was not triggered this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// A run is already active (queued/running/paused/awaiting_approval).
    Busy,
    /// The most recent preflight reports at least one failing check.
    PreflightFailed,
    /// The cron expression or timezone no longer resolves.
    CronInvalid,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::Busy => "busy",
            SkipReason::PreflightFailed => "preflight_failed",
            SkipReason::CronInvalid => "cron_invalid",
        }
    }
}

/// Supplies the set of schedule-enabled pipelines to consider each tick.
pub trait ScheduleSource: Send + Sync {
    fn scheduled_pipelines(&self) -> Vec<Pipeline>;
}

/// Answers whether a pipeline already has an active run.
pub trait ActiveRunTracker: Send + Sync {
    fn has_active_run(&self, pipeline_id: &PipelineId) -> bool;
}

/// Answers whether a pipeline's most recent preflight is clean.
pub trait PreflightGate: Send + Sync {
    fn is_clean(&self, pipeline: &Pipeline, schedule_inputs: &HashMap<String, String>) -> bool;
}

/// Starts a run for a due, clean, non-busy pipeline.
#[async_trait]
pub trait RunTrigger: Send + Sync {
    async fn trigger(&self, pipeline: &Pipeline) -> Result<RunId, String>;
}

/// Observes scheduler decisions for C9.
pub trait ScheduleEventSink: Send + Sync {
    fn skipped(&self, pipeline_id: &PipelineId, reason: SkipReason);
    fn triggered(&self, pipeline_id: &PipelineId, run_id: &RunId);
}

/// Per-tick collaborators. Grouped into one struct so `tick`'s signature
/// doesn't grow a parameter every time a new seam is needed.
pub struct TickContext<'a> {
    pub source: &'a dyn ScheduleSource,
    pub active: &'a dyn ActiveRunTracker,
    pub preflight: &'a dyn PreflightGate,
    pub trigger: &'a dyn RunTrigger,
    pub sink: &'a dyn ScheduleEventSink,
}

/// Tracks, per pipeline, the base time already considered so a tick never
/// re-fires an occurrence it has already acted on. Missed ticks are not
/// backfilled: a pipeline seen for the first time is seeded to `now -
/// poll_period`, so only fires within the last period are caught, never the
/// pipeline's whole history.
pub struct CronScheduler {
    poll_period: Duration,
    last_considered: Mutex<HashMap<PipelineId, DateTime<Utc>>>,
}

impl CronScheduler {
    pub fn new(poll_period: Duration) -> Self {
        Self {
            poll_period,
            last_considered: Mutex::new(HashMap::new()),
        }
    }

    fn baseline(&self, pipeline_id: &PipelineId, now: DateTime<Utc>) -> DateTime<Utc> {
        let mut map = self.last_considered.lock();
        *map.entry(pipeline_id.clone())
            .or_insert_with(|| now - chrono::Duration::from_std(self.poll_period).unwrap_or_default())
    }

    fn advance(&self, pipeline_id: &PipelineId, now: DateTime<Utc>) {
        self.last_considered.lock().insert(pipeline_id.clone(), now);
    }

    /// Runs one full pass over every schedule-enabled pipeline.
    pub async fn tick(&self, now: DateTime<Utc>, ctx: &TickContext<'_>) {
        for pipeline in ctx.source.scheduled_pipelines() {
            let Some(schedule) = pipeline.schedule.clone().filter(|s| s.enabled) else {
                continue;
            };

            let last = self.baseline(&pipeline.id, now);
            let due = match is_due_now(&schedule, last, now) {
                Ok(due) => due,
                Err(err) => {
                    warn!(pipeline_id = %pipeline.id, %err, "schedule no longer resolves");
                    self.advance(&pipeline.id, now);
                    ctx.sink.skipped(&pipeline.id, SkipReason::CronInvalid);
                    continue;
                }
            };
            self.advance(&pipeline.id, now);

            if !due {
                continue;
            }

            if ctx.active.has_active_run(&pipeline.id) {
                debug!(pipeline_id = %pipeline.id, "schedule due but a run is already active");
                ctx.sink.skipped(&pipeline.id, SkipReason::Busy);
                continue;
            }

            if !ctx.preflight.is_clean(&pipeline, &schedule.inputs) {
                ctx.sink.skipped(&pipeline.id, SkipReason::PreflightFailed);
                continue;
            }

            match ctx.trigger.trigger(&pipeline).await {
                Ok(run_id) => ctx.sink.triggered(&pipeline.id, &run_id),
                Err(err) => {
                    warn!(pipeline_id = %pipeline.id, %err, "schedule trigger failed");
                    ctx.sink.skipped(&pipeline.id, SkipReason::Busy);
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "poll_tests.rs"]
mod tests;
