// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Fyreflow Labs

use fyreflow_core::PipelineValidationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("pipeline validation failed: {0}")]
    Validation(#[from] PipelineValidationError),
    #[error("invalid timezone: {0}")]
    InvalidTimezone(String),
    #[error("unknown pipeline: {0}")]
    UnknownPipeline(String),
    #[error("pipeline {0} has an active run and cannot be deleted")]
    PipelineHasActiveRun(String),
    #[error("unknown run: {0}")]
    UnknownRun(String),
}
