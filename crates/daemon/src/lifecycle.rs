// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Fyreflow Labs

//! Starting and controlling runs: the seam between the HTTP layer (and the
//! cron task) and [`fyreflow_engine::RunEngine`]. Every run is spawned as
//! its own `tokio::task` (spec §5: "one executor task per active Run,
//! bounded pool sized to a configurable concurrency cap"), registered in
//! [`AppState::controls`] so external stop/pause/resume/approve/submit-input
//! actions reach it through its [`fyreflow_engine::ControlSender`].

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use fyreflow_core::{
    is_sensitive_key, ApprovalId, Clock, PipelineId, Run, RunId, RunMode, UuidIdGen,
    SECURE_SENTINEL,
};
use fyreflow_engine::{control_channel, ControlMessage, RunEngine, RunPersist};
use fyreflow_gates::StoragePaths;
use fyreflow_preflight::{build_plan, PlanContext};
use fyreflow_store::Store;
use tracing::{info, warn};

use crate::error::DaemonError;
use crate::state::AppState;

struct StorePersist(Arc<Store>);

impl RunPersist for StorePersist {
    fn save(&self, run: &Run) {
        if let Err(err) = self.0.put_run(run.clone()) {
            warn!(run_id = %run.id, %err, "failed to persist run snapshot");
        }
    }
}

fn storage_paths_for(storage_root: &PathBuf, pipeline_id: &PipelineId, run_id: &RunId) -> StoragePaths {
    StoragePaths {
        shared: Some(storage_root.join("shared").join(pipeline_id.as_str())),
        isolated: Some(storage_root.join("isolated").join(pipeline_id.as_str())),
        run: storage_root.join("runs").join(run_id.as_str()),
    }
}

/// Merge explicit caller-supplied inputs with the pipeline's stored secrets,
/// returning (a) the resolved plaintext map the engine will substitute into
/// context templates and (b) the masked map persisted on the `Run` record.
fn resolve_inputs(
    state: &AppState,
    pipeline_id: &PipelineId,
    explicit: &HashMap<String, String>,
) -> (HashMap<String, String>, HashMap<String, String>) {
    let mut resolved = state.vault.read(pipeline_id.as_str()).unwrap_or_default();
    let mut masked = HashMap::new();
    for (key, value) in explicit {
        resolved.insert(key.clone(), value.clone());
    }
    for (key, value) in &resolved {
        if is_sensitive_key(key) {
            masked.insert(key.clone(), SECURE_SENTINEL.to_string());
        } else {
            masked.insert(key.clone(), value.clone());
        }
    }
    (resolved, masked)
}

/// Start a run for `pipeline`. `run_mode == Smart` enforces every required
/// `input:<key>` preflight check passes before dispatch begins (spec
/// glossary: "smart run enforces preflight required-inputs"); `Quick` skips
/// that gate but still lets the pipeline dispatch with whatever inputs are
/// resolved. Returns the freshly `queued` [`Run`]; dispatch proceeds in a
/// spawned background task.
pub async fn start_run(
    state: &Arc<AppState>,
    pipeline_id: &PipelineId,
    task: String,
    inputs: HashMap<String, String>,
    run_mode: RunMode,
) -> Result<Run, DaemonError> {
    let pipeline = state
        .store
        .get_pipeline(pipeline_id)
        .ok_or_else(|| DaemonError::UnknownPipeline(pipeline_id.to_string()))?;

    if state.store.has_active_run(pipeline_id) {
        return Err(DaemonError::PipelineBusy(pipeline_id.to_string()));
    }

    let (resolved_inputs, masked_inputs) = resolve_inputs(state, pipeline_id, &inputs);

    if run_mode == RunMode::Smart {
        let plan = build_plan(
            &pipeline,
            &resolved_inputs,
            &PlanContext {
                vault: &state.vault,
                storage_root: &state.storage_root,
                mcp_registry: state.mcp_registry.as_ref(),
            },
        );
        let missing: Vec<String> = plan
            .checks
            .iter()
            .filter(|c| c.id.starts_with("input:") && c.status == fyreflow_core::CheckStatus::Fail)
            .map(|c| c.id.trim_start_matches("input:").to_string())
            .collect();
        if !missing.is_empty() {
            return Err(DaemonError::MissingRequiredInputs(missing));
        }
    }

    let run_id = RunId::new(uuid::Uuid::new_v4().to_string());
    let run = Run::new(run_id.clone(), pipeline.clone(), task, masked_inputs, state.clock.epoch_ms());
    state.store.put_run(run.clone())?;

    let (control_tx, control_rx) = control_channel();
    state.register_control(run_id.clone(), control_tx);

    let storage = storage_paths_for(&state.storage_root, pipeline_id, &run_id);
    let engine = RunEngine::new(
        run.clone(),
        resolved_inputs,
        state.executor.clone(),
        state.events.clone(),
        Arc::new(StorePersist(state.store.clone())),
        state.vault.clone(),
        state.clock.clone(),
        UuidIdGen,
        storage,
        control_rx,
    );

    let spawned_state = state.clone();
    let spawned_run_id = run_id.clone();
    let semaphore = state.run_semaphore.clone();
    tokio::spawn(async move {
        let _permit = match semaphore.acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => return,
        };
        info!(run_id = %spawned_run_id, "run dispatch starting");
        let final_run = engine.drive().await;
        info!(run_id = %spawned_run_id, status = ?final_run.status, "run dispatch finished");
        spawned_state.forget_control(&spawned_run_id);
    });

    Ok(run)
}

/// Send a control message to a run's actor, failing if the run is unknown
/// or has already terminated (its control sender is dropped on exit).
fn send_control(state: &AppState, run_id: &RunId, msg: ControlMessage) -> Result<(), DaemonError> {
    let sender = state
        .control_sender(run_id)
        .ok_or_else(|| DaemonError::UnknownRun(run_id.to_string()))?;
    // A full/closed channel means the run just terminated; treat as a no-op
    // rather than an error, matching "cancellation is best-effort once a
    // run's actor has already wound down" (spec §5).
    let _ = sender.try_send(msg);
    Ok(())
}

pub fn stop_run(state: &AppState, run_id: &RunId) -> Result<(), DaemonError> {
    send_control(state, run_id, ControlMessage::Stop)
}

pub fn pause_run(state: &AppState, run_id: &RunId) -> Result<(), DaemonError> {
    send_control(state, run_id, ControlMessage::Pause)
}

pub fn resume_run(state: &AppState, run_id: &RunId) -> Result<(), DaemonError> {
    send_control(state, run_id, ControlMessage::Resume)
}

pub fn resolve_approval(
    state: &AppState,
    run_id: &RunId,
    approval_id: ApprovalId,
    approved: bool,
    note: Option<String>,
) -> Result<(), DaemonError> {
    send_control(
        state,
        run_id,
        ControlMessage::ResolveApproval {
            approval_id,
            approved,
            note,
        },
    )
}

pub fn submit_inputs(
    state: &AppState,
    run_id: &RunId,
    values: HashMap<String, String>,
) -> Result<(), DaemonError> {
    send_control(state, run_id, ControlMessage::SubmitInputs { values })
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
