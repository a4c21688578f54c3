// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Fyreflow Labs

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! fyreflow-provider: the provider step executor boundary (C3).
//!
//! `ProviderExecutor` is the seam between the run engine and real LLM
//! provider SDKs — this crate only ships [`SimulatedExecutor`], the
//! unauthenticated fallback every other adapter is measured against.

pub mod executor;
pub mod simulated;

#[cfg(any(test, feature = "test-support"))]
pub mod fake;

pub use executor::{
    execute_with_timeout, is_simulated_sentinel, ExecuteRequest, OutputMode, ProviderConfig,
    ProviderError, ProviderExecutor, SIMULATED_PREFIX,
};
pub use simulated::SimulatedExecutor;

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FailingExecutor, ScriptedExecutor};
