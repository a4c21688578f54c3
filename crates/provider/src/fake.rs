// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Fyreflow Labs

//! Test-only executors: a scripted sequence of canned outputs per step, and
//! one that always fails. Used by this crate's own tests plus the engine
//! crate's dispatch-loop tests (`test-support` feature).

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::executor::{ExecuteRequest, ProviderError, ProviderExecutor};

/// Returns queued outputs per step name, one per call; once a step's queue
/// is drained, its last output repeats. Lets a test script E2-style
/// "attempt 1 fails, attempt 2 passes" sequences without re-wiring a mock
/// framework per scenario.
#[derive(Default)]
pub struct ScriptedExecutor {
    scripts: Mutex<HashMap<String, Vec<String>>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `outputs` to be returned in order for calls to `step_name`.
    pub fn script(self, step_name: impl Into<String>, outputs: Vec<String>) -> Self {
        self.scripts.lock().insert(step_name.into(), outputs);
        self
    }

    /// Step names in call order, for asserting dispatch counts in tests.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl ProviderExecutor for ScriptedExecutor {
    async fn execute(
        &self,
        request: ExecuteRequest,
        cancel: Arc<AtomicBool>,
    ) -> Result<String, ProviderError> {
        if cancel.load(Ordering::SeqCst) {
            return Err(ProviderError::Cancelled);
        }
        self.calls.lock().push(request.step.name.clone());
        let mut scripts = self.scripts.lock();
        let queue = scripts.entry(request.step.name.clone()).or_default();
        if queue.is_empty() {
            return Ok(format!("WORKFLOW_STATUS: PASS (no script for {})", request.step.name));
        }
        let output = if queue.len() > 1 {
            queue.remove(0)
        } else {
            queue[0].clone()
        };
        Ok(output)
    }
}

/// Always fails with the given kind, for exercising `provider_timeout` /
/// `provider_error` routing without a real timeout elapsing.
pub struct FailingExecutor {
    pub error: fn() -> ProviderError,
}

#[async_trait]
impl ProviderExecutor for FailingExecutor {
    async fn execute(
        &self,
        _request: ExecuteRequest,
        _cancel: Arc<AtomicBool>,
    ) -> Result<String, ProviderError> {
        Err((self.error)())
    }
}
