// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Fyreflow Labs

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! fyreflow-preflight: the preflight planner (C6).
//!
//! Statically scans a pipeline for `{{input.<key>}}` placeholders and
//! derives a [`fyreflow_core::SmartRunPlan`]: required/optional run-input
//! fields plus a set of pass/warn/fail checks (per-input, cron validity,
//! provider-auth presence, MCP reachability, storage-path existence).

pub mod alias;
pub mod checks;
pub mod mcp;
pub mod plan;
pub mod scan;

pub use alias::canonicalize_key;
pub use mcp::{McpReachability, NoMcpRegistry};
pub use plan::{build_plan, plan_signature, PlanContext};
pub use scan::scan_required_inputs;
