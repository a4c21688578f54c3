// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Fyreflow Labs

//! Wires [`fyreflow_cron::CronScheduler`]'s seam traits to [`AppState`] and
//! spawns the ~15s poll loop (spec §4.8) as its own `tokio::task` — the one
//! scheduler thread the concurrency model calls for (spec §5), alongside
//! the per-run executor tasks [`crate::lifecycle::start_run`] spawns.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use fyreflow_core::{Pipeline, PipelineId, RunId};
use fyreflow_cron::{
    ActiveRunTracker, CronScheduler, PreflightGate, RunTrigger, ScheduleEventSink, ScheduleSource,
    SkipReason, TickContext,
};
use fyreflow_engine::EventSink as _;
use fyreflow_preflight::{build_plan, PlanContext};
use tokio::time::MissedTickBehavior;

use crate::lifecycle;
use crate::state::AppState;

struct StoreScheduleSource(Arc<AppState>);

impl ScheduleSource for StoreScheduleSource {
    fn scheduled_pipelines(&self) -> Vec<Pipeline> {
        self.0.store.list_scheduled_pipelines()
    }
}

struct StoreActiveRunTracker(Arc<AppState>);

impl ActiveRunTracker for StoreActiveRunTracker {
    fn has_active_run(&self, pipeline_id: &PipelineId) -> bool {
        self.0.store.has_active_run(pipeline_id)
    }
}

struct StatePreflightGate(Arc<AppState>);

impl PreflightGate for StatePreflightGate {
    fn is_clean(&self, pipeline: &Pipeline, schedule_inputs: &HashMap<String, String>) -> bool {
        let mut inputs = self.0.vault.read(pipeline.id.as_str()).unwrap_or_default();
        inputs.extend(schedule_inputs.clone());
        let plan = build_plan(
            pipeline,
            &inputs,
            &PlanContext {
                vault: &self.0.vault,
                storage_root: &self.0.storage_root,
                mcp_registry: self.0.mcp_registry.as_ref(),
            },
        );
        plan.is_clean()
    }
}

struct LifecycleRunTrigger(Arc<AppState>);

#[async_trait]
impl RunTrigger for LifecycleRunTrigger {
    async fn trigger(&self, pipeline: &Pipeline) -> Result<RunId, String> {
        let schedule = pipeline
            .schedule
            .clone()
            .ok_or_else(|| "pipeline has no schedule".to_string())?;
        let run = lifecycle::start_run(
            &self.0,
            &pipeline.id,
            schedule.task,
            schedule.inputs,
            schedule.run_mode,
        )
        .await
        .map_err(|e| e.to_string())?;
        Ok(run.id)
    }
}

struct EventBusScheduleSink(Arc<AppState>);

impl ScheduleEventSink for EventBusScheduleSink {
    fn skipped(&self, pipeline_id: &PipelineId, reason: SkipReason) {
        self.0.events.emit(fyreflow_core::Event::ScheduleSkipped {
            pipeline_id: pipeline_id.to_string(),
            reason: reason.as_str().to_string(),
        });
    }

    fn triggered(&self, pipeline_id: &PipelineId, run_id: &RunId) {
        self.0.events.emit(fyreflow_core::Event::ScheduleTriggered {
            pipeline_id: pipeline_id.to_string(),
            run_id: run_id.clone(),
        });
    }
}

/// Spawn the cron poll loop. Runs until the process exits; never backfills
/// missed ticks (spec §4.8).
pub fn spawn(state: Arc<AppState>, poll_period: std::time::Duration) -> tokio::task::JoinHandle<()> {
    let scheduler = CronScheduler::new(poll_period);
    let source = StoreScheduleSource(state.clone());
    let active = StoreActiveRunTracker(state.clone());
    let preflight = StatePreflightGate(state.clone());
    let trigger = LifecycleRunTrigger(state.clone());
    let sink = EventBusScheduleSink(state.clone());

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(poll_period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            let ctx = TickContext {
                source: &source,
                active: &active,
                preflight: &preflight,
                trigger: &trigger,
                sink: &sink,
            };
            scheduler.tick(chrono::Utc::now(), &ctx).await;
        }
    })
}
