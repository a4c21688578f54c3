// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Fyreflow Labs

//! Events emitted onto a run's event bus (C9) as the state machine advances.
//!
//! Serializes with `{"type": "run:name", ...fields}` so the editor can
//! dispatch on `type` without a separate enum-discovery step.

use crate::id::{ApprovalId, GateId, RunId, StepId};
use crate::run::{GateStatus, RunStatus, StepRunStatus, WorkflowOutcome};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    #[serde(rename = "run:status_changed")]
    RunStatusChanged { run_id: RunId, status: RunStatus },

    #[serde(rename = "run:log")]
    RunLog { run_id: RunId, line: String },

    #[serde(rename = "step:dispatched")]
    StepDispatched {
        run_id: RunId,
        step_id: StepId,
        step_name: String,
        attempt: u32,
    },

    #[serde(rename = "step:status_changed")]
    StepStatusChanged {
        run_id: RunId,
        step_id: StepId,
        status: StepRunStatus,
    },

    #[serde(rename = "step:gate_evaluated")]
    StepGateEvaluated {
        run_id: RunId,
        step_id: StepId,
        gate_id: GateId,
        status: GateStatus,
    },

    #[serde(rename = "step:outcome")]
    StepOutcome {
        run_id: RunId,
        step_id: StepId,
        outcome: WorkflowOutcome,
    },

    #[serde(rename = "step:loop_exhausted")]
    StepLoopExhausted { run_id: RunId, step_id: StepId },

    #[serde(rename = "approval:requested")]
    ApprovalRequested {
        run_id: RunId,
        approval_id: ApprovalId,
        step_id: StepId,
    },

    #[serde(rename = "approval:resolved")]
    ApprovalResolved {
        run_id: RunId,
        approval_id: ApprovalId,
        approved: bool,
    },

    #[serde(rename = "run:input_requested")]
    RunInputRequested { run_id: RunId, step_id: StepId },

    #[serde(rename = "run:input_submitted")]
    RunInputSubmitted { run_id: RunId, keys: Vec<String> },

    #[serde(rename = "schedule:skipped")]
    ScheduleSkipped {
        pipeline_id: String,
        reason: String,
    },

    #[serde(rename = "schedule:triggered")]
    ScheduleTriggered {
        pipeline_id: String,
        run_id: RunId,
    },
}

impl Event {
    /// One-line summary suitable for the bounded run log (never includes
    /// secret plaintext — events only ever carry ids/status/counts).
    pub fn log_summary(&self) -> String {
        match self {
            Event::RunStatusChanged { status, .. } => format!("run status -> {status:?}"),
            Event::RunLog { line, .. } => line.clone(),
            Event::StepDispatched {
                step_name, attempt, ..
            } => format!("dispatch {step_name} (attempt {attempt})"),
            Event::StepStatusChanged {
                step_id, status, ..
            } => format!("step {step_id} -> {status:?}"),
            Event::StepGateEvaluated {
                gate_id, status, ..
            } => format!("gate {gate_id} -> {status:?}"),
            Event::StepOutcome { step_id, outcome, .. } => {
                format!("step {step_id} outcome {outcome:?}")
            }
            Event::StepLoopExhausted { step_id, .. } => {
                format!("loop_exhausted on step {step_id}")
            }
            Event::ApprovalRequested { step_id, .. } => {
                format!("approval requested for step {step_id}")
            }
            Event::ApprovalResolved { approved, .. } => {
                format!("approval resolved: {}", if *approved { "approved" } else { "rejected" })
            }
            Event::RunInputRequested { step_id, .. } => {
                format!("step {step_id} requested more inputs")
            }
            Event::RunInputSubmitted { keys, .. } => {
                format!("inputs submitted: {}", keys.join(", "))
            }
            Event::ScheduleSkipped { pipeline_id, reason } => {
                format!("schedule for {pipeline_id} skipped: {reason}")
            }
            Event::ScheduleTriggered { pipeline_id, run_id } => {
                format!("schedule for {pipeline_id} triggered run {run_id}")
            }
        }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
