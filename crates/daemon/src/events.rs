// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Fyreflow Labs

//! The run log & event bus (C9): an append-only per-run event stream plus a
//! small system-wide stream for events that precede a run (cron skips).
//! Ordering is per-run total order; across-run ordering is not guaranteed
//! (spec §4.9/§5), matching the independent `RunChannel` per run below.

use std::collections::{HashMap, VecDeque};

use fyreflow_core::{Event, RunId};
use fyreflow_engine::EventSink;
use parking_lot::Mutex;
use tokio::sync::broadcast;

/// Per-run events kept beyond live subscribers, for late joiners polling a
/// cursor. Mirrors `fyreflow_engine::dispatch::RUN_LOG_CAPACITY`.
pub const EVENT_LOG_CAPACITY: usize = 500;
const BROADCAST_CAPACITY: usize = 256;
const SYSTEM_LOG_CAPACITY: usize = 200;

struct RunChannel {
    sender: broadcast::Sender<Event>,
    history: VecDeque<Event>,
}

impl RunChannel {
    fn new() -> Self {
        Self {
            sender: broadcast::channel(BROADCAST_CAPACITY).0,
            history: VecDeque::new(),
        }
    }

    fn push(&mut self, event: Event) {
        self.history.push_back(event.clone());
        if self.history.len() > EVENT_LOG_CAPACITY {
            self.history.pop_front();
        }
        let _ = self.sender.send(event);
    }
}

/// The event bus every [`fyreflow_engine::dispatch::RunEngine`] is wired to
/// as its [`EventSink`], and every cron-triggered skip/fire is routed
/// through as well (events with no `run_id`, e.g. `schedule:skipped` before
/// a run exists, land in the system log instead of a per-run channel).
#[derive(Default)]
pub struct EventBus {
    runs: Mutex<HashMap<RunId, RunChannel>>,
    system: Mutex<VecDeque<Event>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Live subscription to one run's events, for an eventual streaming
    /// surface; also used by tests to assert dispatch ordering.
    pub fn subscribe(&self, run_id: &RunId) -> broadcast::Receiver<Event> {
        self.runs
            .lock()
            .entry(run_id.clone())
            .or_insert_with(RunChannel::new)
            .sender
            .subscribe()
    }

    /// Every event recorded for `run_id` so far, oldest first.
    pub fn history(&self, run_id: &RunId) -> Vec<Event> {
        self.runs
            .lock()
            .get(run_id)
            .map(|c| c.history.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// System-level events (schedule skips with no run yet), oldest first.
    pub fn system_log(&self) -> Vec<Event> {
        self.system.lock().iter().cloned().collect()
    }

    /// Drop a run's channel once it has terminated and its final record is
    /// durable — callers keep the terminal `Run` itself in the store, this
    /// bus only needs to retain the live/replay channel while a run exists.
    pub fn forget(&self, run_id: &RunId) {
        self.runs.lock().remove(run_id);
    }
}

impl EventSink for EventBus {
    fn emit(&self, event: Event) {
        match event_run_id(&event) {
            Some(run_id) => {
                self.runs.lock().entry(run_id).or_insert_with(RunChannel::new).push(event);
            }
            None => {
                let mut system = self.system.lock();
                system.push_back(event);
                if system.len() > SYSTEM_LOG_CAPACITY {
                    system.pop_front();
                }
            }
        }
    }
}

fn event_run_id(event: &Event) -> Option<RunId> {
    match event {
        Event::RunStatusChanged { run_id, .. }
        | Event::RunLog { run_id, .. }
        | Event::StepDispatched { run_id, .. }
        | Event::StepStatusChanged { run_id, .. }
        | Event::StepGateEvaluated { run_id, .. }
        | Event::StepOutcome { run_id, .. }
        | Event::StepLoopExhausted { run_id, .. }
        | Event::ApprovalRequested { run_id, .. }
        | Event::ApprovalResolved { run_id, .. }
        | Event::RunInputRequested { run_id, .. }
        | Event::RunInputSubmitted { run_id, .. }
        | Event::ScheduleTriggered { run_id, .. } => Some(run_id.clone()),
        Event::ScheduleSkipped { .. } => None,
    }
}

#[cfg(test)]
#[path = "events_tests.rs"]
mod tests;
