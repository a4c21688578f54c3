// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Fyreflow Labs

//! Run lifecycle endpoints (spec §6): start, list, inspect, stop/pause/
//! resume, resolve an approval, submit runtime-requested inputs, and poll a
//! run's event log.
//!
//! JSON field names follow the snake_case the rest of this crate already
//! serializes `fyreflow_core` types with (`pipeline_id`, not `pipelineId`)
//! rather than spec §6's illustrative camelCase, so a client never has to
//! juggle two casings across the same API.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use fyreflow_core::{ApprovalId, Event, PipelineId, Run, RunId, RunMode};
use serde::{Deserialize, Serialize};

use crate::error::DaemonError;
use crate::lifecycle;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct StartRunRequest {
    pub pipeline_id: String,
    #[serde(default)]
    pub task: String,
    #[serde(default)]
    pub inputs: HashMap<String, String>,
    #[serde(default = "default_run_mode")]
    pub run_mode: RunMode,
}

fn default_run_mode() -> RunMode {
    RunMode::Quick
}

pub async fn start_run(
    State(state): State<Arc<AppState>>,
    Json(req): Json<StartRunRequest>,
) -> Result<Json<Run>, DaemonError> {
    let pipeline_id = PipelineId::new(req.pipeline_id);
    let run = lifecycle::start_run(&state, &pipeline_id, req.task, req.inputs, req.run_mode).await?;
    Ok(Json(run))
}

#[derive(Debug, Deserialize)]
pub struct ListRunsQuery {
    pub pipeline_id: Option<String>,
    pub limit: Option<usize>,
}

pub async fn list_runs(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListRunsQuery>,
) -> Json<Vec<Run>> {
    let pipeline_id = query.pipeline_id.map(PipelineId::new);
    let runs = state.store.list_runs(pipeline_id.as_ref(), query.limit);
    Json(runs)
}

pub async fn get_run(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Run>, DaemonError> {
    let run_id = RunId::new(id);
    state
        .store
        .get_run(&run_id)
        .map(Json)
        .ok_or_else(|| DaemonError::UnknownRun(run_id.to_string()))
}

pub async fn stop_run(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<axum::http::StatusCode, DaemonError> {
    lifecycle::stop_run(&state, &RunId::new(id))?;
    Ok(axum::http::StatusCode::ACCEPTED)
}

pub async fn pause_run(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<axum::http::StatusCode, DaemonError> {
    lifecycle::pause_run(&state, &RunId::new(id))?;
    Ok(axum::http::StatusCode::ACCEPTED)
}

pub async fn resume_run(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<axum::http::StatusCode, DaemonError> {
    lifecycle::resume_run(&state, &RunId::new(id))?;
    Ok(axum::http::StatusCode::ACCEPTED)
}

#[derive(Debug, Deserialize)]
pub struct SubmitInputsRequest {
    pub values: HashMap<String, String>,
}

pub async fn submit_inputs(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<SubmitInputsRequest>,
) -> Result<axum::http::StatusCode, DaemonError> {
    lifecycle::submit_inputs(&state, &RunId::new(id), req.values)?;
    Ok(axum::http::StatusCode::ACCEPTED)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalDecision {
    Approved,
    Rejected,
}

#[derive(Debug, Deserialize)]
pub struct ResolveApprovalRequest {
    pub decision: ApprovalDecision,
    #[serde(default)]
    pub note: Option<String>,
}

pub async fn resolve_approval(
    State(state): State<Arc<AppState>>,
    Path((id, approval_id)): Path<(String, String)>,
    Json(req): Json<ResolveApprovalRequest>,
) -> Result<axum::http::StatusCode, DaemonError> {
    let approved = matches!(req.decision, ApprovalDecision::Approved);
    lifecycle::resolve_approval(&state, &RunId::new(id), ApprovalId::new(approval_id), approved, req.note)?;
    Ok(axum::http::StatusCode::ACCEPTED)
}

#[derive(Debug, Serialize)]
pub struct RunEventsResponse {
    pub events: Vec<Event>,
}

/// `GET /runs/:id/events`: the replay-from-cursor surface C9 exists for —
/// every event recorded for this run so far, oldest first. A true streaming
/// subscription (`EventBus::subscribe`) is left to a transport the
/// out-of-scope editor negotiates (SSE/WebSocket); this endpoint gives a
/// polling client the same ordering guarantee without one.
pub async fn run_events(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Json<RunEventsResponse> {
    let run_id = RunId::new(id);
    Json(RunEventsResponse {
        events: state.events.history(&run_id),
    })
}
