// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Fyreflow Labs

//! The run state machine (C5): drives a [`Run`] from `queued` to a terminal
//! status one dispatch boundary at a time (spec §4.5). Each run is an actor
//! owning a [`ControlReceiver`]; control messages are applied between steps,
//! except `Stop`, which is raced against the in-flight provider call so it
//! flips the run's cancel signal the moment it arrives rather than waiting
//! for the call to return on its own. Other control messages that arrive
//! mid-call are queued and replayed at the next dispatch boundary.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use fyreflow_core::{
    ApprovalId, ApprovalRequest, ApprovalStatus, Clock, GateKind, GateStatus, IdGen, Link,
    LinkCondition, Pipeline, Run, RunError, RunStatus, StepId, StepRun, StepRunStatus,
    WorkflowOutcome,
};
use fyreflow_gates::{derive_outcome, evaluate_gates, GateEvalContext, StoragePaths};
use fyreflow_provider::{
    execute_with_timeout, is_simulated_sentinel, ExecuteRequest, OutputMode, ProviderConfig, ProviderError, ProviderExecutor,
};
use fyreflow_vault::Vault;

use crate::broker::{detect_input_request, request_signature, RuntimeInputRequest};
use crate::context::{resolve_context, ContextInputs};
use crate::control::{ControlMessage, ControlReceiver};
use crate::error::EngineError;
use crate::persist::RunPersist;
use crate::sink::EventSink;

/// How many log lines a run keeps (spec §3: "bounded, most-recent-first").
pub const RUN_LOG_CAPACITY: usize = 500;

/// Drives one [`Run`] to completion. Owns the run's control-message queue;
/// callers spawn [`RunEngine::drive`] as a task and talk to the run only
/// through the paired [`crate::control::ControlSender`].
pub struct RunEngine<I: IdGen> {
    run: Run,
    pipeline: Pipeline,
    executor: Arc<dyn ProviderExecutor>,
    sink: Arc<dyn EventSink>,
    persist: Arc<dyn RunPersist>,
    vault: Arc<Vault>,
    clock: Arc<dyn Clock>,
    id_gen: I,
    storage: StoragePaths,
    control_rx: ControlReceiver,

    /// Non-secret values verbatim, secret values decrypted to plaintext.
    /// Deliberately kept separate from `run.inputs`, which only ever holds
    /// the masked-for-display copy that gets persisted and shown to callers.
    resolved_inputs: HashMap<String, String>,
    ready: VecDeque<StepId>,
    seen_input_request_signatures: std::collections::HashSet<String>,

    pending_input: Option<(StepId, u32, RuntimeInputRequest)>,
    awaiting_approval_step: Option<StepId>,
    loop_exhausted_step: Option<StepId>,

    /// Control messages received while a provider call was in flight, other
    /// than `Stop` (which is applied on the spot). Replayed at the next
    /// dispatch boundary so they still land strictly between steps.
    deferred_control: VecDeque<ControlMessage>,
}

impl<I: IdGen> RunEngine<I> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        run: Run,
        resolved_inputs: HashMap<String, String>,
        executor: Arc<dyn ProviderExecutor>,
        sink: Arc<dyn EventSink>,
        persist: Arc<dyn RunPersist>,
        vault: Arc<Vault>,
        clock: Arc<dyn Clock>,
        id_gen: I,
        storage: StoragePaths,
        control_rx: ControlReceiver,
    ) -> Self {
        let pipeline = run.pipeline_snapshot.clone();
        Self {
            run,
            pipeline,
            executor,
            sink,
            persist,
            vault,
            clock,
            id_gen,
            storage,
            control_rx,
            resolved_inputs,
            ready: VecDeque::new(),
            seen_input_request_signatures: std::collections::HashSet::new(),
            pending_input: None,
            awaiting_approval_step: None,
            loop_exhausted_step: None,
            deferred_control: VecDeque::new(),
        }
    }

    /// Drive the run to a terminal status (or until the control channel
    /// closes), returning the final [`Run`] record.
    pub async fn drive(mut self) -> Run {
        self.seed();
        self.set_status(RunStatus::Running);

        loop {
            if self.run.status.is_terminal() {
                break;
            }
            if self.run.is_cancelled() {
                self.finish_cancelled();
                break;
            }

            while let Some(msg) = self.deferred_control.pop_front() {
                self.handle_control(msg).await;
            }
            while let Ok(msg) = self.control_rx.try_recv() {
                self.handle_control(msg).await;
            }
            if self.run.is_cancelled() {
                self.finish_cancelled();
                break;
            }

            if matches!(self.run.status, RunStatus::Paused | RunStatus::AwaitingApproval) {
                match self.control_rx.recv().await {
                    Some(msg) => self.handle_control(msg).await,
                    None => break,
                }
                continue;
            }

            let Some(step_id) = self.ready.pop_front() else {
                self.finish();
                break;
            };
            self.dispatch(step_id, true).await;
        }

        self.run
    }

    fn seed(&mut self) {
        for step in &self.pipeline.steps {
            if self.run.find_step_run(&step.id).is_none() {
                self.run
                    .steps
                    .push(StepRun::new_pending(step.id.clone(), step.name.clone()));
            }
        }
        for step in self.pipeline.entry_steps() {
            self.ready.push_back(step.id.clone());
        }
    }

    fn now(&self) -> u64 {
        self.clock.epoch_ms()
    }

    fn set_status(&mut self, status: RunStatus) {
        self.run.status = status;
        self.persist.save(&self.run);
        self.sink.emit(fyreflow_core::Event::RunStatusChanged {
            run_id: self.run.id.clone(),
            status,
        });
    }

    fn log(&mut self, line: impl Into<String>) {
        let line = line.into();
        self.run.push_log(line.clone(), RUN_LOG_CAPACITY);
        self.sink.emit(fyreflow_core::Event::RunLog {
            run_id: self.run.id.clone(),
            line,
        });
    }

    async fn handle_control(&mut self, msg: ControlMessage) {
        match msg {
            ControlMessage::Stop => {
                self.run.cancel();
            }
            ControlMessage::Pause => {
                if self.run.status == RunStatus::Running {
                    self.set_status(RunStatus::Paused);
                }
            }
            ControlMessage::Resume => {
                if self.run.status == RunStatus::Paused && self.pending_input.is_none() {
                    self.set_status(RunStatus::Running);
                }
            }
            ControlMessage::ResolveApproval {
                approval_id,
                approved,
                note,
            } => {
                self.resolve_approval(approval_id, approved, note).await;
            }
            ControlMessage::SubmitInputs { values } => {
                self.submit_inputs(values).await;
            }
        }
    }

    #[allow(clippy::expect_used)]
    async fn dispatch(&mut self, step_id: StepId, increment_attempt: bool) {
        let Some(step) = self.pipeline.find_step(&step_id).cloned() else {
            self.log(format!("dispatch skipped: unknown step {step_id}"));
            return;
        };

        if increment_attempt
            && self.run.total_step_executions() + 1 > self.pipeline.runtime.max_step_executions
        {
            self.log(format!(
                "run failed: total step execution limit {} exhausted at step {}",
                self.pipeline.runtime.max_step_executions, step.name
            ));
            self.run.status = RunStatus::Failed;
            self.finalize(Some(EngineError::LimitExhausted));
            return;
        }

        let attempt = {
            let step_run = self
                .run
                .find_step_run_mut(&step_id)
                .expect("seed() populates a StepRun for every pipeline step");
            if increment_attempt {
                step_run.attempts += 1;
                step_run.started_at_ms = Some(self.now());
            }
            step_run.status = StepRunStatus::Running;
            step_run.attempts
        };
        self.persist.save(&self.run);
        self.sink.emit(fyreflow_core::Event::StepDispatched {
            run_id: self.run.id.clone(),
            step_id: step_id.clone(),
            step_name: step.name.clone(),
            attempt,
        });

        let completed_steps: Vec<StepRun> = self
            .run
            .steps
            .iter()
            .filter(|s| s.step_id != step_id && s.status == StepRunStatus::Completed)
            .cloned()
            .collect();
        let context = resolve_context(&ContextInputs {
            task: &self.run.task,
            step: &step,
            pipeline: &self.pipeline,
            completed_steps: &completed_steps,
            run_inputs: &self.resolved_inputs,
        });

        let request = ExecuteRequest {
            provider: ProviderConfig {
                provider_id: step.provider.provider_id.clone(),
                model: step.provider.model.clone(),
                credential: None,
            },
            step: step.clone(),
            task: self.run.task.clone(),
            context,
            output_mode: match step.output_format {
                fyreflow_core::OutputFormat::Markdown => OutputMode::Text,
                fyreflow_core::OutputFormat::Json => OutputMode::Json,
            },
        };

        let result = self.execute_step(request).await;

        match result {
            Err(provider_err) => {
                let engine_err: EngineError = provider_err.into();
                let cancelled = matches!(engine_err, EngineError::Cancelled);
                self.record_step_failure(&step_id, &engine_err);
                if cancelled {
                    self.run.status = RunStatus::Cancelled;
                    self.finish_cancelled();
                    return;
                }
                self.select_next_steps(&step_id, WorkflowOutcome::Fail);
            }
            Ok(output) => {
                if is_simulated_sentinel(&output) {
                    let engine_err = EngineError::ProviderUnauthenticated;
                    {
                        let step_run = self
                            .run
                            .find_step_run_mut(&step_id)
                            .expect("seeded above");
                        step_run.output = output.clone();
                    }
                    self.record_step_failure(&step_id, &engine_err);
                    self.select_next_steps(&step_id, WorkflowOutcome::Fail);
                    return;
                }

                self.finish_successful_attempt(&step_id, &step, output).await;
            }
        }
    }

    /// Runs the provider call for a dispatch, racing it against the control
    /// channel so a `Stop` received mid-call flips the cancel signal right
    /// away instead of sitting in the channel until the call returns on its
    /// own. The call itself is never abandoned: once `Stop` flips the
    /// signal, a well-behaved [`ProviderExecutor`] observes it and returns
    /// `Cancelled` on its own next poll, and the normal dispatch error path
    /// takes it from there. Non-`Stop` messages observed here are deferred
    /// to the next dispatch boundary.
    async fn execute_step(&mut self, request: ExecuteRequest) -> Result<String, ProviderError> {
        let call = execute_with_timeout(
            self.executor.as_ref(),
            request,
            self.run.cancel_signal.clone(),
            self.pipeline.runtime.stage_timeout_ms,
        );
        tokio::pin!(call);
        loop {
            tokio::select! {
                result = &mut call => return result,
                msg = self.control_rx.recv() => match msg {
                    Some(ControlMessage::Stop) => self.run.cancel(),
                    Some(other) => self.deferred_control.push_back(other),
                    None => {}
                },
            }
        }
    }

    #[allow(clippy::expect_used)]
    fn record_step_failure(&mut self, step_id: &StepId, err: &EngineError) {
        let now = self.now();
        let code = err.code().to_string();
        let message = err.to_string();
        {
            let step_run = self
                .run
                .find_step_run_mut(step_id)
                .expect("seed() populates a StepRun for every pipeline step");
            step_run.status = StepRunStatus::Failed;
            step_run.workflow_outcome = WorkflowOutcome::Fail;
            step_run.error = Some(RunError {
                code: code.clone(),
                message: message.clone(),
            });
            step_run.finished_at_ms = Some(now);
        }
        self.persist.save(&self.run);
        self.sink.emit(fyreflow_core::Event::StepStatusChanged {
            run_id: self.run.id.clone(),
            step_id: step_id.clone(),
            status: StepRunStatus::Failed,
        });
        self.log(format!("step {step_id} failed: {code} ({message})"));
    }

    #[allow(clippy::expect_used)]
    async fn finish_successful_attempt(&mut self, step_id: &StepId, step: &fyreflow_core::Step, output: String) {
        let gates = self.pipeline.gates_for(step_id);
        let ctx = GateEvalContext {
            step,
            output: &output,
            storage: &self.storage,
            run_inputs: &self.resolved_inputs,
        };
        let gate_results = evaluate_gates(&gates, &ctx);
        for result in &gate_results {
            self.sink.emit(fyreflow_core::Event::StepGateEvaluated {
                run_id: self.run.id.clone(),
                step_id: step_id.clone(),
                gate_id: result.gate_id.clone(),
                status: result.status,
            });
        }
        let outcome = derive_outcome(&output, &gate_results);

        {
            let step_run = self
                .run
                .find_step_run_mut(step_id)
                .expect("seed() populates a StepRun for every pipeline step");
            step_run.output = output.clone();
            step_run.status = StepRunStatus::Completed;
            step_run.workflow_outcome = outcome;
            step_run.quality_gate_results = gate_results.clone();
            step_run.finished_at_ms = Some(self.now());
        }
        self.persist.save(&self.run);
        self.sink.emit(fyreflow_core::Event::StepStatusChanged {
            run_id: self.run.id.clone(),
            step_id: step_id.clone(),
            status: StepRunStatus::Completed,
        });
        self.sink.emit(fyreflow_core::Event::StepOutcome {
            run_id: self.run.id.clone(),
            step_id: step_id.clone(),
            outcome,
        });

        let attempt = self
            .run
            .find_step_run(step_id)
            .map(|s| s.attempts)
            .unwrap_or(1);

        if let Some(request) = detect_input_request(&output) {
            let signature = request_signature(self.run.id.as_str(), step_id.as_str(), attempt, &request);
            if self.seen_input_request_signatures.insert(signature) {
                self.pending_input = Some((step_id.clone(), attempt, request));
                self.log(format!("step {step_id} requested additional runtime inputs"));
                self.sink.emit(fyreflow_core::Event::RunInputRequested {
                    run_id: self.run.id.clone(),
                    step_id: step_id.clone(),
                });
                self.set_status(RunStatus::Paused);
                return;
            }
        }

        let manual_gates: Vec<&fyreflow_core::QualityGate> = gates
            .iter()
            .copied()
            .filter(|g| matches!(g.kind, GateKind::ManualApproval))
            .collect();
        if !manual_gates.is_empty() {
            let now = self.now();
            for gate in manual_gates {
                let approval = ApprovalRequest {
                    id: ApprovalId::new(self.id_gen.next()),
                    run_id: self.run.id.clone(),
                    gate_id: gate.id.clone(),
                    gate_name: gate.name.clone(),
                    step_id: step_id.clone(),
                    step_name: step.name.clone(),
                    message: gate
                        .message
                        .clone()
                        .unwrap_or_else(|| "awaiting manual approval".to_string()),
                    status: ApprovalStatus::Pending,
                    note: None,
                    created_at_ms: now,
                    resolved_at_ms: None,
                };
                self.sink.emit(fyreflow_core::Event::ApprovalRequested {
                    run_id: self.run.id.clone(),
                    approval_id: approval.id.clone(),
                    step_id: step_id.clone(),
                });
                self.run.approvals.push(approval);
            }
            self.awaiting_approval_step = Some(step_id.clone());
            self.set_status(RunStatus::AwaitingApproval);
            return;
        }

        self.select_next_steps(step_id, outcome);
    }

    #[allow(clippy::expect_used)]
    async fn resolve_approval(&mut self, approval_id: ApprovalId, approved: bool, note: Option<String>) {
        let now = self.now();
        let Some(approval) = self.run.approvals.iter_mut().find(|a| a.id == approval_id) else {
            self.log(format!("ignored approval resolution for unknown id {approval_id}"));
            return;
        };
        if approval.status != ApprovalStatus::Pending {
            return;
        }
        approval.status = if approved {
            ApprovalStatus::Approved
        } else {
            ApprovalStatus::Rejected
        };
        approval.note = note;
        approval.resolved_at_ms = Some(now);
        let gate_id = approval.gate_id.clone();
        let step_id = approval.step_id.clone();

        self.sink.emit(fyreflow_core::Event::ApprovalResolved {
            run_id: self.run.id.clone(),
            approval_id,
            approved,
        });

        if let Some(step_run) = self.run.find_step_run_mut(&step_id) {
            if let Some(result) = step_run.quality_gate_results.iter_mut().find(|r| r.gate_id == gate_id) {
                result.status = if approved { GateStatus::Pass } else { GateStatus::Fail };
                result.message = if approved {
                    "approved".to_string()
                } else {
                    "rejected".to_string()
                };
            }
        }

        let still_pending = self
            .run
            .approvals
            .iter()
            .any(|a| a.step_id == step_id && a.status == ApprovalStatus::Pending);
        if still_pending {
            self.persist.save(&self.run);
            return;
        }

        let outcome = {
            let step_run = self
                .run
                .find_step_run(&step_id)
                .expect("seed() populates a StepRun for every pipeline step");
            derive_outcome(&step_run.output, &step_run.quality_gate_results)
        };
        if let Some(step_run) = self.run.find_step_run_mut(&step_id) {
            step_run.workflow_outcome = outcome;
        }
        self.awaiting_approval_step = None;
        self.set_status(RunStatus::Running);
        self.select_next_steps(&step_id, outcome);
    }

    async fn submit_inputs(&mut self, values: HashMap<String, String>) {
        let Some((step_id, attempt, _request)) = self.pending_input.take() else {
            self.log("ignored submitted inputs: no step is awaiting input".to_string());
            return;
        };

        let mut secret_values = HashMap::new();
        for (key, value) in &values {
            self.resolved_inputs.insert(key.clone(), value.clone());
            if fyreflow_core::is_sensitive_key(key) {
                secret_values.insert(key.clone(), value.clone());
                self.run
                    .inputs
                    .insert(key.clone(), fyreflow_core::SECURE_SENTINEL.to_string());
            } else {
                self.run.inputs.insert(key.clone(), value.clone());
            }
        }
        if !secret_values.is_empty() {
            let pipeline_id = self.run.pipeline_id.clone();
            if let Err(e) = self.vault.save(pipeline_id.as_str(), &secret_values) {
                self.log(format!("failed to persist submitted secrets: {e}"));
            }
        }

        self.sink.emit(fyreflow_core::Event::RunInputSubmitted {
            run_id: self.run.id.clone(),
            keys: values.keys().cloned().collect(),
        });
        self.set_status(RunStatus::Running);

        let _ = attempt;
        self.dispatch(step_id, false).await;
    }

    /// Select outbound links to traverse after a step's outcome is known
    /// (spec §4.5 step 8). A `neutral` outcome only traverses `always`
    /// links; it is neither a pass nor a fail.
    fn select_next_steps(&mut self, from: &StepId, outcome: WorkflowOutcome) {
        let links: Vec<Link> = self.pipeline.outbound_links(from).into_iter().cloned().collect();
        for link in links {
            let should_traverse = match link.condition {
                LinkCondition::Always => true,
                LinkCondition::OnPass => outcome == WorkflowOutcome::Pass,
                LinkCondition::OnFail => outcome == WorkflowOutcome::Fail,
            };
            if !should_traverse {
                continue;
            }
            self.enqueue(link.target_step_id.clone());
        }
    }

    #[allow(clippy::expect_used)]
    fn enqueue(&mut self, target: StepId) {
        let already_executed = self
            .run
            .find_step_run(&target)
            .map(|s| s.attempts > 0)
            .unwrap_or(false);

        if already_executed {
            let max_loops = self.pipeline.runtime.max_loops;
            let loop_count = {
                let step_run = self
                    .run
                    .find_step_run_mut(&target)
                    .expect("seed() populates a StepRun for every pipeline step");
                step_run.loop_count += 1;
                step_run.loop_count
            };
            if loop_count > max_loops {
                self.loop_exhausted_step = Some(target.clone());
                self.sink.emit(fyreflow_core::Event::StepLoopExhausted {
                    run_id: self.run.id.clone(),
                    step_id: target.clone(),
                });
                self.log(format!("loop_exhausted on step {target}"));
                return;
            }
        }

        if !self.ready.contains(&target) {
            self.ready.push_back(target);
        }
    }

    fn finish_cancelled(&mut self) {
        self.run.status = RunStatus::Cancelled;
        self.run.finished_at_ms = Some(self.now());
        self.log("run cancelled".to_string());
        self.persist.save(&self.run);
        self.sink.emit(fyreflow_core::Event::RunStatusChanged {
            run_id: self.run.id.clone(),
            status: RunStatus::Cancelled,
        });
    }

    /// Ready queue has drained: decide the final run status (spec §4.5 step 9).
    fn finish(&mut self) {
        for step_run in self.run.steps.iter_mut() {
            if step_run.status == StepRunStatus::Pending {
                step_run.status = StepRunStatus::Skipped;
            }
        }

        if let Some(failed_step) = self
            .run
            .steps
            .iter()
            .find(|s| s.status == StepRunStatus::Failed)
            .cloned()
        {
            let code = failed_step
                .error
                .as_ref()
                .map(|e| e.code.clone())
                .unwrap_or_else(|| "provider_error".to_string());
            self.run.status = RunStatus::Failed;
            self.log(format!(
                "run failed: step {} ended in error ({code})",
                failed_step.step_name
            ));
        } else if let Some(step_id) = self.loop_exhausted_step.clone() {
            self.run.status = RunStatus::Failed;
            self.log(format!("run failed: loop_exhausted on step {step_id}"));
        } else {
            let any_blocking_failed = self.run.steps.iter().any(|s| {
                s.quality_gate_results
                    .iter()
                    .any(|g| g.blocking && g.status == GateStatus::Fail)
            });
            if any_blocking_failed {
                self.run.status = RunStatus::Failed;
                self.log("run failed: a blocking gate failed with no remediation path".to_string());
            } else {
                self.run.status = RunStatus::Completed;
            }
        }

        self.run.finished_at_ms = Some(self.now());
        self.persist.save(&self.run);
        self.sink.emit(fyreflow_core::Event::RunStatusChanged {
            run_id: self.run.id.clone(),
            status: self.run.status,
        });
    }

    /// Used by the total-step-execution-limit path, which bypasses the
    /// normal `finish()` flow because it must stop immediately rather than
    /// let the ready queue keep draining.
    fn finalize(&mut self, err: Option<EngineError>) {
        if let Some(err) = err {
            self.log(format!("run failed: {} ({})", err.code(), err));
        }
        self.run.finished_at_ms = Some(self.now());
        self.persist.save(&self.run);
        self.sink.emit(fyreflow_core::Event::RunStatusChanged {
            run_id: self.run.id.clone(),
            status: self.run.status,
        });
        self.ready.clear();
    }
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
