// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Fyreflow Labs

use super::*;
use crate::mcp::NoMcpRegistry;
use fyreflow_core::{
    OutputContract, OutputFormat, PipelineId, ProviderSelector, RuntimeConfig, Step, StepId, StepRole,
};
use tempfile::tempdir;

fn sample_pipeline() -> Pipeline {
    Pipeline {
        id: PipelineId::new("p1"),
        name: "Pipeline One".to_string(),
        description: String::new(),
        steps: vec![Step {
            id: StepId::new("a"),
            name: "a".to_string(),
            role: StepRole::Analysis,
            prompt: "Review {{input.customer_name}}".to_string(),
            provider: ProviderSelector {
                provider_id: "anthropic".to_string(),
                model: "claude".to_string(),
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
        }],
        links: Vec::new(),
        gates: Vec::new(),
        runtime: RuntimeConfig::default(),
        schedule: None,
        version: 1,
    }
}

#[test]
fn build_plan_includes_an_input_check_for_the_missing_field() {
    let dir = tempdir().unwrap();
    let vault = Vault::open(dir.path()).unwrap();
    let storage_root = dir.path().join("storage");
    let ctx = PlanContext {
        vault: &vault,
        storage_root: &storage_root,
        mcp_registry: &NoMcpRegistry,
    };
    let plan = build_plan(&sample_pipeline(), &HashMap::new(), &ctx);
    assert_eq!(plan.fields.len(), 1);
    assert_eq!(plan.fields[0].key, "customer_name");
    assert!(!plan.is_clean());
}

#[test]
fn build_plan_is_clean_once_the_input_is_provided() {
    let dir = tempdir().unwrap();
    let vault = Vault::open(dir.path()).unwrap();
    let storage_root = dir.path().join("storage");
    let ctx = PlanContext {
        vault: &vault,
        storage_root: &storage_root,
        mcp_registry: &NoMcpRegistry,
    };
    let mut inputs = HashMap::new();
    inputs.insert("customer_name".to_string(), "Acme".to_string());
    let plan = build_plan(&sample_pipeline(), &inputs, &ctx);
    let input_checks: Vec<_> = plan.checks.iter().filter(|c| c.id == "input:customer_name").collect();
    assert_eq!(input_checks.len(), 1);
    assert_eq!(input_checks[0].status, fyreflow_core::CheckStatus::Pass);
}

#[test]
fn build_plan_is_deterministic() {
    let dir = tempdir().unwrap();
    let vault = Vault::open(dir.path()).unwrap();
    let storage_root = dir.path().join("storage");
    let ctx = PlanContext {
        vault: &vault,
        storage_root: &storage_root,
        mcp_registry: &NoMcpRegistry,
    };
    let mut inputs = HashMap::new();
    inputs.insert("customer_name".to_string(), "Acme".to_string());
    let pipeline = sample_pipeline();
    let plan_a = build_plan(&pipeline, &inputs, &ctx);
    let plan_b = build_plan(&pipeline, &inputs, &ctx);
    assert_eq!(
        serde_json::to_string(&plan_a).unwrap(),
        serde_json::to_string(&plan_b).unwrap()
    );
}

#[test]
fn plan_signature_sorts_input_keys() {
    let mut inputs_a = HashMap::new();
    inputs_a.insert("b".to_string(), "2".to_string());
    inputs_a.insert("a".to_string(), "1".to_string());

    let mut inputs_b = HashMap::new();
    inputs_b.insert("a".to_string(), "1".to_string());
    inputs_b.insert("b".to_string(), "2".to_string());

    assert_eq!(plan_signature("p1", &inputs_a), plan_signature("p1", &inputs_b));
}

#[test]
fn plan_signature_differs_by_pipeline_id() {
    let inputs = HashMap::new();
    assert_ne!(plan_signature("p1", &inputs), plan_signature("p2", &inputs));
}
