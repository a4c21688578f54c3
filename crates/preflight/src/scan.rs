// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Fyreflow Labs

//! Scans a pipeline's step prompts, context templates and gate artifact
//! paths for `{{input.<key>}}` placeholders and derives a [`RunInputRequest`]
//! per distinct canonical key, in first-encounter order.

use std::collections::HashSet;
use std::sync::OnceLock;

use fyreflow_core::{is_sensitive_key, GateKind, InputFieldType, Pipeline, RunInputRequest};
use regex::Regex;

use crate::alias::canonicalize_key;

#[allow(clippy::expect_used)]
fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\{\{\s*input\.([a-zA-Z0-9_.\- ]+?)(\|default(?::[^}]*)?)?\s*\}\}")
            .expect("input placeholder pattern is a fixed valid regex")
    })
}

/// One raw placeholder occurrence found while scanning.
struct Occurrence {
    raw_key: String,
    has_default: bool,
}

fn find_occurrences(text: &str) -> Vec<Occurrence> {
    placeholder_pattern()
        .captures_iter(text)
        .map(|caps| Occurrence {
            raw_key: caps[1].to_string(),
            has_default: caps.get(2).is_some(),
        })
        .collect()
}

const URL_HINTS: &[&str] = &["url", "link", "href", "endpoint"];
const MULTILINE_HINTS: &[&str] = &["description", "body", "context", "notes", "summary", "details"];

fn infer_field_type(canonical_key: &str) -> InputFieldType {
    if is_sensitive_key(canonical_key) {
        return InputFieldType::Secret;
    }
    if URL_HINTS.iter().any(|hint| canonical_key.contains(hint)) {
        return InputFieldType::Url;
    }
    if MULTILINE_HINTS.iter().any(|hint| canonical_key.contains(hint)) {
        return InputFieldType::Multiline;
    }
    InputFieldType::Text
}

fn humanize_label(canonical_key: &str) -> String {
    canonical_key
        .split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Scan `pipeline` for required/optional run-input placeholders, in
/// first-encounter order across steps (prompt, then context template, then
/// any gate artifact path targeting that step).
pub fn scan_required_inputs(pipeline: &Pipeline) -> Vec<RunInputRequest> {
    let mut seen = HashSet::new();
    let mut fields = Vec::new();

    let mut visit = |text: &str| {
        for occurrence in find_occurrences(text) {
            let canonical = canonicalize_key(&occurrence.raw_key);
            if canonical.is_empty() {
                continue;
            }
            let required = !occurrence.has_default;
            let existing_index = fields.iter().position(|f: &RunInputRequest| f.key == canonical);
            match existing_index {
                Some(index) => {
                    // Required wins over optional if the same key appears both
                    // guarded and unguarded elsewhere in the pipeline.
                    fields[index].required = fields[index].required || required;
                }
                None if seen.insert(canonical.clone()) => {
                    fields.push(RunInputRequest {
                        key: canonical.clone(),
                        label: humanize_label(&canonical),
                        field_type: infer_field_type(&canonical),
                        required,
                        placeholder: None,
                        description: None,
                        default_value: None,
                    });
                }
                None => {}
            }
        }
    };

    for step in &pipeline.steps {
        visit(&step.prompt);
        visit(&step.context_template);
    }
    for gate in &pipeline.gates {
        if let GateKind::ArtifactExists { artifact_path } = &gate.kind {
            visit(artifact_path);
        }
    }

    fields
}

#[cfg(test)]
#[path = "scan_tests.rs"]
mod tests;
