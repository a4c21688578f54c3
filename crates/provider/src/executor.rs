// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Fyreflow Labs

//! The provider step executor (C3): given a resolved step + context, produce
//! raw textual output from an LLM provider. Opaque from the engine's point
//! of view — concurrency across steps is the run state machine's job, not
//! this trait's.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use fyreflow_core::Step;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Output shape the caller asked the provider to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputMode {
    Text,
    Json,
}

/// Credential/auth material resolved for a provider. The real adapter
/// internals behind this are out of scope here — only the shape a caller
/// hands to [`ProviderExecutor::execute`] is specified.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub provider_id: String,
    pub model: String,
    /// `None` means "no credentials resolved" — the sentinel/simulated path.
    pub credential: Option<String>,
}

/// A fully-resolved request to execute one step against one provider call.
#[derive(Debug, Clone)]
pub struct ExecuteRequest {
    pub provider: ProviderConfig,
    pub step: Step,
    pub task: String,
    /// Fully placeholder-substituted context string (§4.5 step 3).
    pub context: String,
    pub output_mode: OutputMode,
}

/// Sentinel prefix marking "provider unauthenticated / CLI fallback
/// missing". Callers treat any output starting with this as auth failure.
pub const SIMULATED_PREFIX: &str = "[Simulated ";

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider unauthenticated")]
    Unauthenticated,
    #[error("provider call timed out after {0:?}")]
    Timeout(Duration),
    #[error("provider error: {0}")]
    Upstream(String),
    #[error("cancelled")]
    Cancelled,
}

/// Produces raw textual output from an LLM provider for one step.
///
/// Implementations must honor `cancel`: if it flips to `true` mid-call the
/// call should return [`ProviderError::Cancelled`] as soon as practical
/// rather than running to completion.
#[async_trait]
pub trait ProviderExecutor: Send + Sync {
    async fn execute(
        &self,
        request: ExecuteRequest,
        cancel: Arc<AtomicBool>,
    ) -> Result<String, ProviderError>;
}

/// Run `request` against `executor`, racing the timeout and the cancel
/// signal. This is the one place §4.5 step 4's `stageTimeoutMs` enforcement
/// and cancellation are wired together, so every caller gets identical
/// semantics regardless of which `ProviderExecutor` is plugged in.
pub async fn execute_with_timeout(
    executor: &dyn ProviderExecutor,
    request: ExecuteRequest,
    cancel: Arc<AtomicBool>,
    stage_timeout_ms: u64,
) -> Result<String, ProviderError> {
    if cancel.load(Ordering::SeqCst) {
        return Err(ProviderError::Cancelled);
    }
    let timeout = Duration::from_millis(stage_timeout_ms);
    let call = executor.execute(request, cancel.clone());
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result,
        Err(_) => Err(ProviderError::Timeout(timeout)),
    }
}

/// True if `output` carries the "[Simulated ..." auth-failure sentinel.
pub fn is_simulated_sentinel(output: &str) -> bool {
    output.starts_with(SIMULATED_PREFIX)
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
