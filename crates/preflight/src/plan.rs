// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Fyreflow Labs

//! Top-level preflight planner (C6): derives a [`SmartRunPlan`] from a
//! pipeline snapshot and the current run-inputs map (secrets already merged
//! in by the caller from [`fyreflow_vault::Vault`]).

use std::collections::HashMap;
use std::path::Path;

use fyreflow_core::{Pipeline, SmartRunPlan};
use fyreflow_vault::Vault;

use crate::checks::{cron_check, input_check, mcp_checks, provider_auth_check, storage_paths_check};
use crate::mcp::McpReachability;
use crate::scan::scan_required_inputs;

/// Everything [`build_plan`] needs beyond the pipeline and current inputs.
pub struct PlanContext<'a> {
    pub vault: &'a Vault,
    pub storage_root: &'a Path,
    pub mcp_registry: &'a dyn McpReachability,
}

/// Derive the [`SmartRunPlan`] for `pipeline` given `current_inputs`
/// (already merged with stored secrets). Deterministic: the same pipeline
/// and inputs always produce a byte-identical plan, since field and check
/// ordering only ever depends on first-encounter order within the pipeline
/// definition and fixed check ordering here.
pub fn build_plan(pipeline: &Pipeline, current_inputs: &HashMap<String, String>, ctx: &PlanContext<'_>) -> SmartRunPlan {
    let fields = scan_required_inputs(pipeline);

    let mut checks = Vec::new();
    for field in &fields {
        if field.required {
            checks.push(input_check(&field.key, current_inputs.get(&field.key)));
        }
    }

    if let Some(check) = cron_check(pipeline) {
        checks.push(check);
    }
    checks.extend(provider_auth_check(pipeline, ctx.vault, pipeline.id.as_str()));
    checks.extend(mcp_checks(pipeline, ctx.mcp_registry));
    if let Some(check) = storage_paths_check(pipeline, ctx.storage_root) {
        checks.push(check);
    }

    SmartRunPlan { fields, checks }
}

/// Cache signature the editor keys its `SmartRunPlan` cache by:
/// `pipelineId + sorted(inputs)`. Secrets are represented by key only, never
/// by value, so the signature never embeds sensitive content.
pub fn plan_signature(pipeline_id: &str, current_inputs: &HashMap<String, String>) -> String {
    let mut keys: Vec<&String> = current_inputs.keys().collect();
    keys.sort();
    let joined = keys
        .into_iter()
        .map(|k| format!("{k}={}", current_inputs[k]))
        .collect::<Vec<_>>()
        .join("&");
    format!("{pipeline_id}?{joined}")
}

#[cfg(test)]
#[path = "plan_tests.rs"]
mod tests;
