// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Fyreflow Labs

//! Run and step-run records: the execution-time counterpart to [`crate::pipeline::Pipeline`].

use crate::id::{ApprovalId, GateId, PipelineId, RunId, StepId};
use crate::pipeline::Pipeline;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Lifecycle state of a [`Run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Queued,
    Running,
    Paused,
    AwaitingApproval,
    Completed,
    Failed,
    Cancelled,
}

impl RunStatus {
    /// Queued/running/paused/awaiting_approval all count as "active" for the
    /// one-active-run-per-pipeline invariant.
    pub fn is_active(self) -> bool {
        matches!(
            self,
            RunStatus::Queued
                | RunStatus::Running
                | RunStatus::Paused
                | RunStatus::AwaitingApproval
        )
    }

    pub fn is_terminal(self) -> bool {
        !self.is_active()
    }
}

/// Lifecycle state of a single step execution within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepRunStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Skipped,
}

/// Derived pass/fail/neutral/unknown outcome of a step after gate evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowOutcome {
    Pass,
    Fail,
    Neutral,
    Unknown,
}

/// Per-gate pass/fail/warn status after evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateStatus {
    Pass,
    Fail,
    Warn,
}

/// Result of evaluating one [`crate::pipeline::QualityGate`] against a step's output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityGateResult {
    pub gate_id: GateId,
    pub gate_name: String,
    pub status: GateStatus,
    pub blocking: bool,
    pub message: String,
    #[serde(default)]
    pub details: Option<serde_json::Value>,
}

/// A recorded reason a step or run failed, paired with the stable error code
/// from the run execution error taxonomy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunError {
    pub code: String,
    pub message: String,
}

/// Record of one step's execution within a run, including its attempt/loop history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRun {
    pub step_id: StepId,
    pub step_name: String,
    pub status: StepRunStatus,
    pub attempts: u32,
    pub workflow_outcome: WorkflowOutcome,
    pub output: String,
    pub quality_gate_results: Vec<QualityGateResult>,
    pub error: Option<RunError>,
    pub started_at_ms: Option<u64>,
    pub finished_at_ms: Option<u64>,
    /// Times this step has been re-entered via a remediation loop, bounding
    /// `attempts` against `maxLoops`.
    #[serde(default)]
    pub loop_count: u32,
}

impl StepRun {
    pub fn new_pending(step_id: StepId, step_name: String) -> Self {
        Self {
            step_id,
            step_name,
            status: StepRunStatus::Pending,
            attempts: 0,
            workflow_outcome: WorkflowOutcome::Unknown,
            output: String::new(),
            quality_gate_results: Vec::new(),
            error: None,
            started_at_ms: None,
            finished_at_ms: None,
            loop_count: 0,
        }
    }
}

/// Status of a manual-approval checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

/// A manual-decision checkpoint produced by a `manual_approval` gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApprovalRequest {
    pub id: ApprovalId,
    pub run_id: RunId,
    pub gate_id: GateId,
    pub gate_name: String,
    pub step_id: StepId,
    pub step_name: String,
    pub message: String,
    pub status: ApprovalStatus,
    #[serde(default)]
    pub note: Option<String>,
    pub created_at_ms: u64,
    #[serde(default)]
    pub resolved_at_ms: Option<u64>,
}

/// An in-flight or completed execution of a [`Pipeline`].
///
/// `cancel_signal` is intentionally `#[serde(skip)]`: cancellation is a live
/// control signal owned by the run's actor task (see `fyreflow-engine`), not
/// part of the durable record. On reload from disk it defaults to a fresh,
/// un-cancelled flag — a reloaded run that was mid-flight is resumed or
/// failed by the engine's startup recovery, not by replaying cancellation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Run {
    pub id: RunId,
    pub pipeline_id: PipelineId,
    pub pipeline_snapshot: Pipeline,
    pub status: RunStatus,
    pub task: String,
    /// Non-secret values verbatim; secret values replaced with [`crate::sensitive::SECURE_SENTINEL`].
    pub inputs: HashMap<String, String>,
    pub steps: Vec<StepRun>,
    pub approvals: Vec<ApprovalRequest>,
    pub logs: Vec<String>,
    pub started_at_ms: u64,
    pub finished_at_ms: Option<u64>,
    #[serde(skip, default)]
    pub cancel_signal: Arc<AtomicBool>,
}

impl Run {
    pub fn new(
        id: RunId,
        pipeline_snapshot: Pipeline,
        task: String,
        inputs: HashMap<String, String>,
        started_at_ms: u64,
    ) -> Self {
        let pipeline_id = pipeline_snapshot.id.clone();
        Self {
            id,
            pipeline_id,
            pipeline_snapshot,
            status: RunStatus::Queued,
            task,
            inputs,
            steps: Vec::new(),
            approvals: Vec::new(),
            logs: Vec::new(),
            started_at_ms,
            finished_at_ms: None,
            cancel_signal: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel_signal.load(Ordering::SeqCst)
    }

    pub fn cancel(&self) {
        self.cancel_signal.store(true, Ordering::SeqCst);
    }

    pub fn find_step_run(&self, step_id: &StepId) -> Option<&StepRun> {
        self.steps.iter().find(|s| &s.step_id == step_id)
    }

    pub fn find_step_run_mut(&mut self, step_id: &StepId) -> Option<&mut StepRun> {
        self.steps.iter_mut().find(|s| &s.step_id == step_id)
    }

    /// Append a log line, truncating the oldest entries beyond `capacity`
    /// Log lines are bounded: keep the last N per run.
    pub fn push_log(&mut self, line: impl Into<String>, capacity: usize) {
        self.logs.push(line.into());
        if self.logs.len() > capacity {
            let overflow = self.logs.len() - capacity;
            self.logs.drain(0..overflow);
        }
    }

    pub fn total_step_executions(&self) -> u32 {
        self.steps.iter().map(|s| s.attempts).sum()
    }
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;
