// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Fyreflow Labs

//! The simulated executor: the only concrete [`ProviderExecutor`] this crate
//! ships. Real provider SDK adapters live outside this workspace's scope
//! (§1 "out of scope: provider SDK wrappers"); this stands in for "no
//! credentials resolved" so the engine always has something to dispatch
//! against.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use async_trait::async_trait;

use crate::executor::{ExecuteRequest, ProviderError, ProviderExecutor, SIMULATED_PREFIX};

#[derive(Debug, Clone, Default)]
pub struct SimulatedExecutor;

#[async_trait]
impl ProviderExecutor for SimulatedExecutor {
    async fn execute(
        &self,
        request: ExecuteRequest,
        _cancel: Arc<AtomicBool>,
    ) -> Result<String, ProviderError> {
        Ok(format!(
            "{SIMULATED_PREFIX}{}/{}] step \"{}\" has no resolved credentials.",
            request.provider.provider_id, request.provider.model, request.step.name,
        ))
    }
}

#[cfg(test)]
#[path = "simulated_tests.rs"]
mod tests;
