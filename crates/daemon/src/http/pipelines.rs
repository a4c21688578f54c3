// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Fyreflow Labs

//! Pipeline CRUD plus the two read-only preflight endpoints (spec §6):
//! `smart-run-plan` and `startup-check`.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use fyreflow_core::{Pipeline, PipelineId};
use fyreflow_preflight::{build_plan, PlanContext};
use serde::{Deserialize, Serialize};

use crate::error::DaemonError;
use crate::state::AppState;

pub async fn create_pipeline(
    State(state): State<Arc<AppState>>,
    Json(pipeline): Json<Pipeline>,
) -> Result<Json<Pipeline>, DaemonError> {
    let created = state.store.create_pipeline(pipeline)?;
    Ok(Json(created))
}

pub async fn update_pipeline(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(mut pipeline): Json<Pipeline>,
) -> Result<Json<Pipeline>, DaemonError> {
    pipeline.id = PipelineId::new(id);
    let updated = state.store.update_pipeline(pipeline)?;
    Ok(Json(updated))
}

pub async fn delete_pipeline(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<axum::http::StatusCode, DaemonError> {
    let pipeline_id = PipelineId::new(id);
    state.store.delete_pipeline(&pipeline_id)?;
    let _ = state.vault.purge(pipeline_id.as_str());
    Ok(axum::http::StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct InputsQuery {
    /// `key=value` pairs, `&`-joined, URL-decoded by axum's `Query` extractor.
    #[serde(flatten)]
    pub inputs: HashMap<String, String>,
}

pub async fn smart_run_plan(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<InputsQuery>,
) -> Result<Json<fyreflow_core::SmartRunPlan>, DaemonError> {
    let pipeline_id = PipelineId::new(id);
    let pipeline = state
        .store
        .get_pipeline(&pipeline_id)
        .ok_or_else(|| DaemonError::UnknownPipeline(pipeline_id.to_string()))?;

    let mut inputs = state.vault.read(pipeline_id.as_str()).unwrap_or_default();
    inputs.extend(query.inputs);

    let plan = build_plan(
        &pipeline,
        &inputs,
        &PlanContext {
            vault: &state.vault,
            storage_root: &state.storage_root,
            mcp_registry: state.mcp_registry.as_ref(),
        },
    );
    Ok(Json(plan))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StartupStatus {
    Pass,
    NeedsInput,
    Blocked,
}

#[derive(Debug, Serialize)]
pub struct StartupCheckResponse {
    pub status: StartupStatus,
    pub requests: Vec<fyreflow_core::RunInputRequest>,
    pub blockers: Vec<String>,
    pub summary: String,
}

#[derive(Debug, Deserialize)]
pub struct StartupCheckQuery {
    #[serde(default)]
    pub task: String,
    #[serde(default, flatten)]
    pub inputs: HashMap<String, String>,
}

/// `GET /pipelines/:id/startup-check`: the same preflight derivation as
/// `smart-run-plan`, reshaped into the `{status, requests, blockers,
/// summary}` contract the editor's start-run modal renders directly.
pub async fn startup_check(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(mut query): Query<StartupCheckQuery>,
) -> Result<Json<StartupCheckResponse>, DaemonError> {
    query.inputs.remove("task");
    let pipeline_id = PipelineId::new(id);
    let pipeline = state
        .store
        .get_pipeline(&pipeline_id)
        .ok_or_else(|| DaemonError::UnknownPipeline(pipeline_id.to_string()))?;

    let mut inputs = state.vault.read(pipeline_id.as_str()).unwrap_or_default();
    inputs.extend(query.inputs);

    let plan = build_plan(
        &pipeline,
        &inputs,
        &PlanContext {
            vault: &state.vault,
            storage_root: &state.storage_root,
            mcp_registry: state.mcp_registry.as_ref(),
        },
    );

    let missing: Vec<fyreflow_core::RunInputRequest> = plan
        .fields
        .iter()
        .filter(|f| {
            f.required
                && plan
                    .checks
                    .iter()
                    .any(|c| c.id == format!("input:{}", f.key) && c.status == fyreflow_core::CheckStatus::Fail)
        })
        .cloned()
        .collect();

    let blockers: Vec<String> = plan
        .checks
        .iter()
        .filter(|c| !c.id.starts_with("input:") && c.status == fyreflow_core::CheckStatus::Fail)
        .map(|c| c.message.clone())
        .collect();

    let status = if !blockers.is_empty() {
        StartupStatus::Blocked
    } else if !missing.is_empty() {
        StartupStatus::NeedsInput
    } else {
        StartupStatus::Pass
    };

    let summary = match status {
        StartupStatus::Pass => "ready to run".to_string(),
        StartupStatus::NeedsInput => format!("{} input(s) needed before this pipeline can run", missing.len()),
        StartupStatus::Blocked => format!("{} blocking check(s) failed", blockers.len()),
    };

    Ok(Json(StartupCheckResponse {
        status,
        requests: missing,
        blockers,
        summary,
    }))
}
