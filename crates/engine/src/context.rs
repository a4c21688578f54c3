// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Fyreflow Labs

//! Context template substitution (spec §4.5 step 3): fills in
//! `{{task}}`, `{{previous_output}}`, `{{incoming_outputs}}`,
//! `{{all_outputs}}`, `{{input.<key>}}` and `{{run_inputs}}` placeholders.
//!
//! Secret values are substituted here from their decrypted plaintext and
//! must never be logged — callers pass `run_inputs` already merged with
//! vault-decrypted values, and the substituted string is handed straight to
//! the provider executor, never to [`fyreflow_core::Event`] or a log line.

use std::collections::HashMap;

use fyreflow_core::{Link, Pipeline, Step, StepId, StepRun};

/// Everything needed to resolve one step's context template.
pub struct ContextInputs<'a> {
    pub task: &'a str,
    pub step: &'a Step,
    pub pipeline: &'a Pipeline,
    pub completed_steps: &'a [StepRun],
    /// Non-secret values verbatim, secret values already decrypted to plaintext.
    pub run_inputs: &'a HashMap<String, String>,
}

/// Resolve `step.context_template`'s placeholders against `inputs`.
pub fn resolve_context(inputs: &ContextInputs<'_>) -> String {
    let previous_output = immediately_upstream_output(inputs);
    let incoming_outputs = incoming_outputs_block(inputs);
    let all_outputs = all_outputs_block(inputs);
    let run_inputs_block = run_inputs_block(inputs.run_inputs);

    let mut out = inputs.step.context_template.clone();
    out = out.replace("{{task}}", inputs.task);
    out = out.replace("{{previous_output}}", &previous_output);
    out = out.replace("{{incoming_outputs}}", &incoming_outputs);
    out = out.replace("{{all_outputs}}", &all_outputs);
    out = out.replace("{{run_inputs}}", &run_inputs_block);
    out = substitute_named_inputs(&out, inputs.run_inputs);
    out
}

/// Links whose target is this step, in declaration order — "immediately
/// upstream" per spec §4.5 step 3 ("keyed by link source").
fn upstream_links<'a>(pipeline: &'a Pipeline, step_id: &StepId) -> Vec<&'a Link> {
    pipeline
        .links
        .iter()
        .filter(|l| &l.target_step_id == step_id)
        .collect()
}

fn find_output<'a>(completed_steps: &'a [StepRun], step_id: &StepId) -> Option<&'a str> {
    completed_steps
        .iter()
        .find(|s| &s.step_id == step_id)
        .map(|s| s.output.as_str())
}

/// The single most-recently-completed upstream step's output, or empty
/// string if this is an entry step with no predecessor.
fn immediately_upstream_output(inputs: &ContextInputs<'_>) -> String {
    let upstream = upstream_links(inputs.pipeline, &inputs.step.id);
    upstream
        .last()
        .and_then(|link| find_output(inputs.completed_steps, &link.source_step_id))
        .unwrap_or("")
        .to_string()
}

/// All immediately-upstream outputs, each labeled by source step name.
fn incoming_outputs_block(inputs: &ContextInputs<'_>) -> String {
    let upstream = upstream_links(inputs.pipeline, &inputs.step.id);
    upstream
        .iter()
        .filter_map(|link| {
            let output = find_output(inputs.completed_steps, &link.source_step_id)?;
            let name = inputs
                .pipeline
                .find_step(&link.source_step_id)
                .map(|s| s.name.as_str())
                .unwrap_or(link.source_step_id.as_str());
            Some(format!("### {name}\n{output}"))
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Every step output produced so far in the run, in execution order.
fn all_outputs_block(inputs: &ContextInputs<'_>) -> String {
    inputs
        .completed_steps
        .iter()
        .filter(|s| !s.output.is_empty())
        .map(|s| format!("### {}\n{}", s.step_name, s.output))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// `{{run_inputs}}` renders as a flat `key: value` listing. Secret values
/// are rendered from their already-decrypted plaintext by design (spec
/// §4.5 step 3): the provider call needs the real value, never the
/// `[secure]` sentinel.
fn run_inputs_block(run_inputs: &HashMap<String, String>) -> String {
    let mut keys: Vec<&String> = run_inputs.keys().collect();
    keys.sort();
    keys.into_iter()
        .map(|k| format!("{k}: {}", run_inputs[k]))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Replace `{{input.<key>}}` placeholders with resolved values; unresolved
/// keys are left verbatim (mirrors `fyreflow_gates::evaluate`'s artifact
/// path substitution, kept independent so this crate doesn't need to
/// depend on `fyreflow-gates` for a four-line helper).
fn substitute_named_inputs(template: &str, run_inputs: &HashMap<String, String>) -> String {
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

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
