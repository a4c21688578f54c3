// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Fyreflow Labs

//! The quality-gate evaluator (C4): applies a step's targeted gates to its
//! output and derives a workflow outcome.

use std::collections::HashMap;

use fyreflow_core::{GateKind, GateStatus, OutputFormat, QualityGate, QualityGateResult, Step, WorkflowOutcome};
use regex::RegexBuilder;

use crate::jsonpath::{extract_fenced_json, lookup};
use crate::normalize::{find_status_marker, normalize_status_markers};
use crate::storage_paths::StoragePaths;

/// Everything a gate needs besides the [`QualityGate`] list itself.
pub struct GateEvalContext<'a> {
    pub step: &'a Step,
    pub output: &'a str,
    pub storage: &'a StoragePaths,
    pub run_inputs: &'a HashMap<String, String>,
}

/// Evaluate every gate in `gates` (already filtered to those targeting this
/// step, see [`fyreflow_core::Pipeline::gates_for`]) against `ctx`.
pub fn evaluate_gates(gates: &[&QualityGate], ctx: &GateEvalContext<'_>) -> Vec<QualityGateResult> {
    let normalized = normalize_status_markers(ctx.output);
    gates
        .iter()
        .map(|gate| evaluate_one(gate, ctx, &normalized))
        .collect()
}

fn evaluate_one(gate: &QualityGate, ctx: &GateEvalContext<'_>, normalized_output: &str) -> QualityGateResult {
    let (status, message, details) = match &gate.kind {
        GateKind::RegexMustMatch { pattern, flags } => {
            eval_regex(pattern, flags, normalized_output, true)
        }
        GateKind::RegexMustNotMatch { pattern, flags } => {
            eval_regex(pattern, flags, normalized_output, false)
        }
        GateKind::JsonFieldExists { json_path } => eval_json_field(ctx, json_path),
        GateKind::ArtifactExists { artifact_path } => eval_artifact(ctx, artifact_path),
        GateKind::ManualApproval => (
            GateStatus::Warn,
            gate
                .message
                .clone()
                .unwrap_or_else(|| "awaiting manual approval".to_string()),
            None,
        ),
    };

    QualityGateResult {
        gate_id: gate.id.clone(),
        gate_name: gate.name.clone(),
        status,
        blocking: gate.blocking,
        message,
        details,
    }
}

fn eval_regex(
    pattern: &str,
    flags: &str,
    output: &str,
    must_match: bool,
) -> (GateStatus, String, Option<serde_json::Value>) {
    let regex = match build_regex(pattern, flags) {
        Ok(r) => r,
        Err(e) => {
            return (
                GateStatus::Fail,
                format!("invalid regex pattern: {e}"),
                None,
            )
        }
    };
    let matched = regex.is_match(output);
    let pass = matched == must_match;
    let status = if pass { GateStatus::Pass } else { GateStatus::Fail };
    let verb = if must_match { "must match" } else { "must not match" };
    let message = if pass {
        format!("pattern {verb} `{pattern}`: ok")
    } else {
        format!("pattern {verb} `{pattern}`: {}", if matched { "matched" } else { "did not match" })
    };
    (status, message, None)
}

fn build_regex(pattern: &str, flags: &str) -> Result<regex::Regex, regex::Error> {
    let mut builder = RegexBuilder::new(pattern);
    for flag in flags.chars() {
        match flag {
            'i' => {
                builder.case_insensitive(true);
            }
            'm' => {
                builder.multi_line(true);
            }
            's' => {
                builder.dot_matches_new_line(true);
            }
            'u' => {
                builder.unicode(true);
            }
            _ => {}
        }
    }
    builder.build()
}

fn eval_json_field(ctx: &GateEvalContext<'_>, json_path: &str) -> (GateStatus, String, Option<serde_json::Value>) {
    let parsed = if ctx.step.output_format == OutputFormat::Json {
        serde_json::from_str::<serde_json::Value>(ctx.output).ok()
    } else {
        extract_fenced_json(ctx.output)
    };

    let Some(parsed) = parsed else {
        return (
            GateStatus::Fail,
            format!("output is not valid JSON; cannot evaluate `{json_path}`"),
            None,
        );
    };

    match lookup(&parsed, json_path) {
        Some(value) => (
            GateStatus::Pass,
            format!("field `{json_path}` present"),
            Some(value.clone()),
        ),
        None => (
            GateStatus::Fail,
            format!("field `{json_path}` missing or null"),
            None,
        ),
    }
}

fn eval_artifact(ctx: &GateEvalContext<'_>, artifact_path: &str) -> (GateStatus, String, Option<serde_json::Value>) {
    let substituted = substitute_inputs(artifact_path, ctx.run_inputs);
    if ctx.storage.exists(&substituted) {
        (GateStatus::Pass, format!("artifact `{substituted}` exists"), None)
    } else {
        (
            GateStatus::Fail,
            format!("artifact `{substituted}` not found"),
            None,
        )
    }
}

/// Replace `{{input.<key>}}` placeholders with their resolved run-input
/// values. Unresolved keys are left verbatim so a missing input shows up as
/// a literal, obviously-wrong path rather than silently vanishing.
fn substitute_inputs(template: &str, run_inputs: &HashMap<String, String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{input.") {
        out.push_str(&rest[..start]);
        let after = &rest[start + "{{input.".len()..];
        match after.find("}}") {
            Some(end) => {
                let key = after[..end].trim();
                match run_inputs.get(key) {
                    Some(value) => out.push_str(value),
                    None => out.push_str(&format!("{{{{input.{key}}}}}")),
                }
                rest = &after[end + 2..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
                break;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Derive the step-level workflow outcome per the recognized-marker rules:
/// `pass` on a recognized PASS/COMPLETE marker with no blocking gate
/// failure; `fail` on any blocking gate failure or a FAIL marker; `neutral`
/// on an explicit NEUTRAL marker; `unknown` otherwise.
pub fn derive_outcome(output: &str, results: &[QualityGateResult]) -> WorkflowOutcome {
    let normalized = normalize_status_markers(output);
    let marker_status = find_status_marker(&normalized).map(|(_, status)| status);
    let any_blocking_failed = results.iter().any(|r| r.blocking && r.status == GateStatus::Fail);

    match marker_status.as_deref() {
        Some("FAIL") => WorkflowOutcome::Fail,
        _ if any_blocking_failed => WorkflowOutcome::Fail,
        Some("PASS") => WorkflowOutcome::Pass,
        Some("NEUTRAL") => WorkflowOutcome::Neutral,
        _ => WorkflowOutcome::Unknown,
    }
}

#[cfg(test)]
#[path = "evaluate_tests.rs"]
mod tests;
