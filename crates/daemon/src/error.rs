// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Fyreflow Labs

//! The daemon's single error type: every failure mode from `fyreflow-store`,
//! `fyreflow-engine` and `fyreflow-vault` collapses here so the HTTP layer
//! has one place to map to the `{code, message}` shape of spec §6/§7.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use fyreflow_core::{ApiError, ErrorCode};
use fyreflow_engine::EngineError;
use fyreflow_store::StoreError;
use fyreflow_vault::VaultStoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("unknown pipeline: {0}")]
    UnknownPipeline(String),
    #[error("unknown run: {0}")]
    UnknownRun(String),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Vault(#[from] VaultStoreError),
    #[error("pipeline {0} already has an active run")]
    PipelineBusy(String),
    #[error("smart run is missing required inputs: {0:?}")]
    MissingRequiredInputs(Vec<String>),
}

impl DaemonError {
    pub fn code(&self) -> ErrorCode {
        match self {
            DaemonError::UnknownPipeline(_) | DaemonError::UnknownRun(_) => ErrorCode::ValidationError,
            DaemonError::Store(StoreError::Validation(_)) => ErrorCode::ValidationError,
            DaemonError::Store(StoreError::InvalidTimezone(_)) => ErrorCode::ValidationError,
            DaemonError::Store(StoreError::UnknownPipeline(_)) => ErrorCode::ValidationError,
            DaemonError::Store(StoreError::UnknownRun(_)) => ErrorCode::ValidationError,
            DaemonError::Store(StoreError::PipelineHasActiveRun(_)) => ErrorCode::ValidationError,
            DaemonError::Store(StoreError::Io(_)) | DaemonError::Store(StoreError::Json(_)) => {
                ErrorCode::ValidationError
            }
            DaemonError::Engine(e) => e.code(),
            DaemonError::Vault(_) => ErrorCode::SecretsUnavailable,
            DaemonError::PipelineBusy(_) => ErrorCode::ValidationError,
            DaemonError::MissingRequiredInputs(_) => ErrorCode::ValidationError,
        }
    }

    pub fn to_api_error(&self) -> ApiError {
        ApiError::new(self.code(), self.to_string())
    }

    fn status(&self) -> StatusCode {
        match self {
            DaemonError::UnknownPipeline(_) | DaemonError::UnknownRun(_) => StatusCode::NOT_FOUND,
            DaemonError::PipelineBusy(_) => StatusCode::CONFLICT,
            DaemonError::Vault(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for DaemonError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(self.to_api_error())).into_response()
    }
}
