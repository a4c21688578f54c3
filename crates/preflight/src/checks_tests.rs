// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Fyreflow Labs

use super::*;
use crate::mcp::NoMcpRegistry;
use fyreflow_core::{
    OutputContract, OutputFormat, PipelineId, ProviderSelector, RunMode, RuntimeConfig, Schedule, Step, StepId,
    StepRole,
};
use tempfile::tempdir;

fn step_with_provider(provider_id: &str) -> Step {
    Step {
        id: StepId::new("a"),
        name: "a".to_string(),
        role: StepRole::Analysis,
        prompt: String::new(),
        provider: ProviderSelector {
            provider_id: provider_id.to_string(),
            model: "m".to_string(),
            reasoning_effort: None,
            fast_mode: false,
            long_context: false,
            context_window_tokens: None,
        },
        context_template: String::new(),
        delegate: false,
        delegation_count: 1,
        isolated_storage: false,
        shared_storage: false,
        mcp_server_ids: Vec::new(),
        output_format: OutputFormat::Markdown,
        contract: OutputContract::default(),
    }
}

fn base_pipeline(steps: Vec<Step>) -> Pipeline {
    Pipeline {
        id: PipelineId::new("p1"),
        name: "Pipeline One".to_string(),
        description: String::new(),
        steps,
        links: Vec::new(),
        gates: Vec::new(),
        runtime: RuntimeConfig::default(),
        schedule: None,
        version: 1,
    }
}

#[test]
fn cron_check_absent_when_no_schedule() {
    let pl = base_pipeline(vec![step_with_provider("anthropic")]);
    assert!(cron_check(&pl).is_none());
}

#[test]
fn cron_check_passes_for_valid_cron_and_timezone() {
    let mut pl = base_pipeline(vec![step_with_provider("anthropic")]);
    pl.schedule = Some(Schedule {
        enabled: true,
        cron: "0 9 * * *".to_string(),
        timezone: "America/New_York".to_string(),
        task: "daily".to_string(),
        run_mode: RunMode::Smart,
        inputs: Default::default(),
    });
    let check = cron_check(&pl).unwrap();
    assert_eq!(check.status, CheckStatus::Pass);
}

#[test]
fn cron_check_fails_for_unknown_timezone() {
    let mut pl = base_pipeline(vec![step_with_provider("anthropic")]);
    pl.schedule = Some(Schedule {
        enabled: true,
        cron: "0 9 * * *".to_string(),
        timezone: "Nowhere/Imaginary".to_string(),
        task: "daily".to_string(),
        run_mode: RunMode::Smart,
        inputs: Default::default(),
    });
    let check = cron_check(&pl).unwrap();
    assert_eq!(check.status, CheckStatus::Fail);
}

#[test]
fn cron_check_fails_for_malformed_cron() {
    let mut pl = base_pipeline(vec![step_with_provider("anthropic")]);
    pl.schedule = Some(Schedule {
        enabled: true,
        cron: "not a cron".to_string(),
        timezone: "UTC".to_string(),
        task: "daily".to_string(),
        run_mode: RunMode::Smart,
        inputs: Default::default(),
    });
    let check = cron_check(&pl).unwrap();
    assert_eq!(check.status, CheckStatus::Fail);
}

#[test]
fn provider_auth_check_warns_when_credential_missing() {
    let dir = tempdir().unwrap();
    let vault = Vault::open(dir.path()).unwrap();
    let pl = base_pipeline(vec![step_with_provider("anthropic")]);
    let checks = provider_auth_check(&pl, &vault, "p1");
    assert_eq!(checks.len(), 1);
    assert_eq!(checks[0].status, CheckStatus::Warn);
}

#[test]
fn provider_auth_check_passes_when_credential_stored() {
    let dir = tempdir().unwrap();
    let vault = Vault::open(dir.path()).unwrap();
    vault
        .save(
            "p1",
            &[("anthropic_api_key".to_string(), "sk-test".to_string())]
                .into_iter()
                .collect(),
        )
        .unwrap();
    let pl = base_pipeline(vec![step_with_provider("anthropic")]);
    let checks = provider_auth_check(&pl, &vault, "p1");
    assert_eq!(checks[0].status, CheckStatus::Pass);
}

#[test]
fn mcp_checks_empty_when_no_servers_configured() {
    let pl = base_pipeline(vec![step_with_provider("anthropic")]);
    assert!(mcp_checks(&pl, &NoMcpRegistry).is_empty());
}

#[test]
fn mcp_checks_fail_when_registry_reports_unreachable() {
    let mut pl = base_pipeline(vec![step_with_provider("anthropic")]);
    pl.steps[0].mcp_server_ids.push("figma-mcp".to_string());
    let checks = mcp_checks(&pl, &NoMcpRegistry);
    assert_eq!(checks.len(), 1);
    assert_eq!(checks[0].status, CheckStatus::Fail);
}

#[test]
fn storage_paths_check_absent_when_no_step_uses_storage() {
    let pl = base_pipeline(vec![step_with_provider("anthropic")]);
    assert!(storage_paths_check(&pl, Path::new("/nonexistent")).is_none());
}

#[test]
fn storage_paths_check_passes_when_root_exists() {
    let dir = tempdir().unwrap();
    let mut pl = base_pipeline(vec![step_with_provider("anthropic")]);
    pl.steps[0].shared_storage = true;
    let check = storage_paths_check(&pl, dir.path()).unwrap();
    assert_eq!(check.status, CheckStatus::Pass);
}

#[test]
fn storage_paths_check_fails_when_root_missing() {
    let mut pl = base_pipeline(vec![step_with_provider("anthropic")]);
    pl.steps[0].isolated_storage = true;
    let check = storage_paths_check(&pl, Path::new("/definitely/not/here")).unwrap();
    assert_eq!(check.status, CheckStatus::Fail);
}

#[test]
fn input_check_fails_when_value_is_secure_sentinel() {
    let check = input_check("api_token", Some(&SECURE_SENTINEL.to_string()));
    assert_eq!(check.status, CheckStatus::Fail);
}

#[test]
fn input_check_passes_with_a_real_value() {
    let check = input_check("customer_name", Some(&"Acme".to_string()));
    assert_eq!(check.status, CheckStatus::Pass);
}

#[test]
fn input_check_fails_when_missing() {
    let check = input_check("customer_name", None);
    assert_eq!(check.status, CheckStatus::Fail);
}
