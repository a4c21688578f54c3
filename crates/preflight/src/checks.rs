// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Fyreflow Labs

//! Non-input preflight checks: valid-cron-for-scheduled-pipelines,
//! provider-auth-present, MCP-servers-reachable, storage-paths-exist. Ids
//! are never prefixed with `input:` — that namespace is reserved for the
//! per-field checks produced in [`crate::plan`].

use std::collections::BTreeSet;
use std::path::Path;
use std::str::FromStr;

use fyreflow_core::{is_sensitive_key, CheckStatus, Pipeline, PreflightCheck, SECURE_SENTINEL};
use fyreflow_vault::Vault;

use crate::mcp::McpReachability;

/// `valid-cron-for-scheduled-pipelines`: only emitted when a schedule is
/// attached and enabled. Checks the 5-field cron shape actually parses and
/// the timezone is a real IANA zone, independent of [`Pipeline::validate`]'s
/// cheaper shape-only check.
pub fn cron_check(pipeline: &Pipeline) -> Option<PreflightCheck> {
    let schedule = pipeline.schedule.as_ref()?;
    if !schedule.enabled {
        return None;
    }

    let tz_result = chrono_tz::Tz::from_str(&schedule.timezone);
    let cron_result = cron::Schedule::from_str(&format!("0 {}", schedule.cron));

    let (status, message) = match (&tz_result, &cron_result) {
        (Ok(_), Ok(_)) => (CheckStatus::Pass, "cron expression and timezone are valid".to_string()),
        (Err(_), _) => (
            CheckStatus::Fail,
            format!("unknown IANA timezone: {}", schedule.timezone),
        ),
        (_, Err(e)) => (CheckStatus::Fail, format!("invalid cron expression: {e}")),
    };

    Some(PreflightCheck {
        id: "schedule:cron".to_string(),
        title: "Schedule".to_string(),
        message,
        status,
        details: None,
    })
}

/// `provider-auth-present`: for every distinct provider a step selects,
/// looks for a `<provider_id>_api_key` credential in the vault's stored
/// secrets for this pipeline. Missing credentials warn rather than fail —
/// the simulated executor still produces output without one.
pub fn provider_auth_check(pipeline: &Pipeline, vault: &Vault, pipeline_id: &str) -> Vec<PreflightCheck> {
    let stored = vault.stored_keys(pipeline_id).unwrap_or_default();
    let mut providers = BTreeSet::new();
    for step in &pipeline.steps {
        providers.insert(step.provider.provider_id.clone());
    }

    providers
        .into_iter()
        .map(|provider_id| {
            let credential_key = format!("{provider_id}_api_key");
            let present = stored.iter().any(|k| k == &credential_key);
            let status = if present { CheckStatus::Pass } else { CheckStatus::Warn };
            let message = if present {
                format!("credential for `{provider_id}` is stored")
            } else {
                format!("no stored credential `{credential_key}`; steps will use the simulated executor")
            };
            PreflightCheck {
                id: format!("provider:{provider_id}"),
                title: "Provider authentication".to_string(),
                message,
                status,
                details: None,
            }
        })
        .collect()
}

/// `MCP-servers-reachable`: one check per distinct server id referenced by
/// any step's `mcp_server_ids`, only emitted when at least one is configured.
pub fn mcp_checks(pipeline: &Pipeline, registry: &dyn McpReachability) -> Vec<PreflightCheck> {
    let mut server_ids = BTreeSet::new();
    for step in &pipeline.steps {
        for id in &step.mcp_server_ids {
            server_ids.insert(id.clone());
        }
    }

    server_ids
        .into_iter()
        .map(|server_id| {
            let reachable = registry.is_reachable(&server_id);
            PreflightCheck {
                id: format!("mcp:{server_id}"),
                title: "MCP server".to_string(),
                message: if reachable {
                    format!("`{server_id}` is reachable")
                } else {
                    format!("`{server_id}` is not reachable")
                },
                status: if reachable { CheckStatus::Pass } else { CheckStatus::Fail },
                details: None,
            }
        })
        .collect()
}

/// `storage-paths-exist`: only emitted when at least one step declares
/// `isolated_storage` or `shared_storage`. Checks that `storage_root` itself
/// is a usable directory — per-run subfolders are created on demand.
pub fn storage_paths_check(pipeline: &Pipeline, storage_root: &Path) -> Option<PreflightCheck> {
    let needs_storage = pipeline
        .steps
        .iter()
        .any(|s| s.isolated_storage || s.shared_storage);
    if !needs_storage {
        return None;
    }

    let status = if storage_root.is_dir() {
        CheckStatus::Pass
    } else {
        CheckStatus::Fail
    };
    let message = if status == CheckStatus::Pass {
        format!("storage root {} exists", storage_root.display())
    } else {
        format!("storage root {} does not exist", storage_root.display())
    };

    Some(PreflightCheck {
        id: "storage:paths_exist".to_string(),
        title: "Storage paths".to_string(),
        message,
        status,
        details: None,
    })
}

/// A run-input check: `fail` if missing or still the secure sentinel,
/// `pass` otherwise. Ids are always `input:<key>`.
pub fn input_check(key: &str, value: Option<&String>) -> PreflightCheck {
    let status = match value {
        Some(v) if !v.is_empty() && v != SECURE_SENTINEL => CheckStatus::Pass,
        _ => CheckStatus::Fail,
    };
    let message = match status {
        CheckStatus::Pass => format!("`{key}` is set"),
        _ => format!("`{key}` is missing"),
    };
    let details = if is_sensitive_key(key) {
        None
    } else {
        value.map(|v| v.to_string())
    };
    PreflightCheck {
        id: format!("input:{key}"),
        title: key.to_string(),
        message,
        status,
        details,
    }
}

#[cfg(test)]
#[path = "checks_tests.rs"]
mod tests;
