// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Fyreflow Labs

//! Engine-level error kinds, each paired with the stable [`ErrorCode`] from
//! `fyreflow-core` that the daemon's HTTP layer and the cron scheduler
//! branch on (spec §7).

use fyreflow_core::ErrorCode;
use fyreflow_provider::ProviderError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("provider unauthenticated")]
    ProviderUnauthenticated,
    #[error("provider call timed out")]
    ProviderTimeout,
    #[error("provider error: {0}")]
    ProviderUpstream(String),
    #[error("blocking gate failed with no remediation path")]
    GateBlockingFailed,
    #[error("loop exhausted on step {0}")]
    LoopExhausted(String),
    #[error("total step execution limit exhausted")]
    LimitExhausted,
    #[error("run cancelled")]
    Cancelled,
    #[error("secrets unavailable: {0}")]
    SecretsUnavailable(String),
    #[error("run not found: {0}")]
    RunNotFound(String),
    #[error("step not found: {0}")]
    StepNotFound(String),
    #[error("approval not found: {0}")]
    ApprovalNotFound(String),
    #[error("run is not awaiting approval")]
    NotAwaitingApproval,
    #[error("run is not paused")]
    NotPaused,
    #[error("pipeline already has an active run: {0}")]
    PipelineBusy(String),
}

impl EngineError {
    pub fn code(&self) -> ErrorCode {
        match self {
            EngineError::ProviderUnauthenticated => ErrorCode::ProviderUnauthenticated,
            EngineError::ProviderTimeout => ErrorCode::ProviderTimeout,
            EngineError::ProviderUpstream(_) => ErrorCode::ProviderError,
            EngineError::GateBlockingFailed => ErrorCode::GateBlockingFailed,
            EngineError::LoopExhausted(_) => ErrorCode::LoopExhausted,
            EngineError::LimitExhausted => ErrorCode::LimitExhausted,
            EngineError::Cancelled => ErrorCode::Cancelled,
            EngineError::SecretsUnavailable(_) => ErrorCode::SecretsUnavailable,
            EngineError::RunNotFound(_)
            | EngineError::StepNotFound(_)
            | EngineError::ApprovalNotFound(_)
            | EngineError::NotAwaitingApproval
            | EngineError::NotPaused
            | EngineError::PipelineBusy(_) => ErrorCode::ValidationError,
        }
    }
}

impl From<ProviderError> for EngineError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Unauthenticated => EngineError::ProviderUnauthenticated,
            ProviderError::Timeout(_) => EngineError::ProviderTimeout,
            ProviderError::Upstream(msg) => EngineError::ProviderUpstream(msg),
            ProviderError::Cancelled => EngineError::Cancelled,
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
