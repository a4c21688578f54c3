// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Fyreflow Labs

use super::*;
use fyreflow_core::{
    GateId, OutputContract, OutputFormat, PipelineId, ProviderSelector, QualityGate, RuntimeConfig, StepId,
    StepRole,
};

fn step(id: &str, prompt: &str, context_template: &str) -> fyreflow_core::Step {
    fyreflow_core::Step {
        id: StepId::new(id),
        name: id.to_string(),
        role: StepRole::Analysis,
        prompt: prompt.to_string(),
        provider: ProviderSelector {
            provider_id: "anthropic".to_string(),
            model: "claude".to_string(),
            reasoning_effort: None,
            fast_mode: false,
            long_context: false,
            context_window_tokens: None,
        },
        context_template: context_template.to_string(),
        delegate: false,
        delegation_count: 1,
        isolated_storage: false,
        shared_storage: false,
        mcp_server_ids: Vec::new(),
        output_format: OutputFormat::Markdown,
        contract: OutputContract::default(),
    }
}

fn pipeline(steps: Vec<fyreflow_core::Step>, gates: Vec<QualityGate>) -> Pipeline {
    Pipeline {
        id: PipelineId::new("p1"),
        name: "Pipeline One".to_string(),
        description: String::new(),
        steps,
        links: Vec::new(),
        gates,
        runtime: RuntimeConfig::default(),
        schedule: None,
        version: 1,
    }
}

#[test]
fn finds_a_required_text_field() {
    let pl = pipeline(
        vec![step("a", "Review {{input.customer_name}}", "")],
        Vec::new(),
    );
    let fields = scan_required_inputs(&pl);
    assert_eq!(fields.len(), 1);
    assert_eq!(fields[0].key, "customer_name");
    assert_eq!(fields[0].field_type, InputFieldType::Text);
    assert!(fields[0].required);
}

#[test]
fn infers_url_type_from_key_hint() {
    let pl = pipeline(vec![step("a", "Fetch {{input.figma_link}}", "")], Vec::new());
    let fields = scan_required_inputs(&pl);
    assert_eq!(fields[0].field_type, InputFieldType::Url);
}

#[test]
fn infers_secret_type_from_sensitive_key() {
    let pl = pipeline(vec![step("a", "Use {{input.api_token}}", "")], Vec::new());
    let fields = scan_required_inputs(&pl);
    assert_eq!(fields[0].field_type, InputFieldType::Secret);
}

#[test]
fn alias_keys_merge_to_one_field() {
    let pl = pipeline(
        vec![
            step("a", "{{input.figma_links}}", ""),
            step("b", "{{input.figma_link}}", ""),
        ],
        Vec::new(),
    );
    let fields = scan_required_inputs(&pl);
    assert_eq!(fields.len(), 1);
    assert_eq!(fields[0].key, "figma_link");
}

#[test]
fn default_guarded_placeholder_is_not_required() {
    let pl = pipeline(
        vec![step("a", "{{input.ticket_id|default:\"none\"}}", "")],
        Vec::new(),
    );
    let fields = scan_required_inputs(&pl);
    assert!(!fields[0].required);
}

#[test]
fn same_key_required_elsewhere_overrides_optional() {
    let pl = pipeline(
        vec![
            step("a", "{{input.ticket_id|default:\"none\"}}", ""),
            step("b", "{{input.ticket_id}}", ""),
        ],
        Vec::new(),
    );
    let fields = scan_required_inputs(&pl);
    assert_eq!(fields.len(), 1);
    assert!(fields[0].required);
}

#[test]
fn fields_ordered_by_first_encounter() {
    let pl = pipeline(
        vec![step("a", "{{input.zeta}} then {{input.alpha}}", "")],
        Vec::new(),
    );
    let fields = scan_required_inputs(&pl);
    assert_eq!(fields[0].key, "zeta");
    assert_eq!(fields[1].key, "alpha");
}

#[test]
fn scans_gate_artifact_paths_too() {
    let gate = QualityGate {
        id: GateId::new("g1"),
        name: "artifact".to_string(),
        target_step_id: "a".to_string(),
        kind: GateKind::ArtifactExists {
            artifact_path: "report-{{input.ticket_id}}.md".to_string(),
        },
        blocking: true,
        message: None,
    };
    let pl = pipeline(vec![step("a", "no placeholders here", "")], vec![gate]);
    let fields = scan_required_inputs(&pl);
    assert_eq!(fields.len(), 1);
    assert_eq!(fields[0].key, "ticket_id");
}

#[test]
fn no_placeholders_yields_no_fields() {
    let pl = pipeline(vec![step("a", "nothing to see here", "")], Vec::new());
    assert!(scan_required_inputs(&pl).is_empty());
}
