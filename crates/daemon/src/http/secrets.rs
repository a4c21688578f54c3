// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Fyreflow Labs

//! `PUT`/`DELETE /pipelines/:id/secure-inputs` (spec §6): write or forget
//! per-pipeline secret inputs in the vault (C1). Values never round-trip
//! back through this API in plaintext — callers write-only.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use fyreflow_core::PipelineId;
use serde::Deserialize;

use crate::error::DaemonError;
use crate::state::AppState;

pub async fn save_secure_inputs(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(values): Json<HashMap<String, String>>,
) -> Result<axum::http::StatusCode, DaemonError> {
    let pipeline_id = PipelineId::new(id);
    state
        .store
        .get_pipeline(&pipeline_id)
        .ok_or_else(|| DaemonError::UnknownPipeline(pipeline_id.to_string()))?;
    state.vault.save(pipeline_id.as_str(), &values)?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct ForgetSecureInputsRequest {
    pub keys: Vec<String>,
}

pub async fn forget_secure_inputs(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<ForgetSecureInputsRequest>,
) -> Result<axum::http::StatusCode, DaemonError> {
    let pipeline_id = PipelineId::new(id);
    state.vault.forget(pipeline_id.as_str(), &req.keys)?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}
