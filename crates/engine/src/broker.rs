// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Fyreflow Labs

//! The runtime input broker (C7): detects a step output that declares "I
//! need more inputs" and turns it into a [`RunInputRequest`] batch the
//! dispatch loop can pause on.
//!
//! Detection grammar (spec §4.7): a fenced JSON block under an
//! `input-request` heading, tolerant of surrounding prose, declaring one or
//! more fields plus a summary and zero or more blockers. Returns `None`
//! when no such block is present — the common case for every step that
//! just returns its normal output.

use fyreflow_core::{InputFieldType, RunInputRequest};
use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;

/// A parsed runtime input request, one per detected block.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeInputRequest {
    pub summary: String,
    pub blockers: Vec<String>,
    pub fields: Vec<RunInputRequest>,
}

#[derive(Debug, Deserialize)]
struct RawField {
    key: String,
    label: String,
    #[serde(rename = "type", default)]
    field_type: Option<String>,
    #[serde(default)]
    required: bool,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    default_value: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawRequest {
    #[serde(default)]
    summary: String,
    #[serde(default)]
    blockers: Vec<String>,
    #[serde(default)]
    fields: Vec<RawField>,
}

#[allow(clippy::expect_used)]
fn heading_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?is)input-request[^`]*```(?:json)?\s*(\{.*?\})\s*```")
            .expect("input-request detection pattern is a fixed valid regex")
    })
}

fn parse_field_type(raw: Option<&str>, key: &str) -> InputFieldType {
    match raw.map(str::to_ascii_lowercase).as_deref() {
        Some("secret") => InputFieldType::Secret,
        Some("url") => InputFieldType::Url,
        Some("multiline") => InputFieldType::Multiline,
        Some("text") | None => {
            if fyreflow_core::is_sensitive_key(key) {
                InputFieldType::Secret
            } else {
                InputFieldType::Text
            }
        }
        Some(_) => InputFieldType::Text,
    }
}

/// Scan a step's raw output for a runtime input-request block. Lenient:
/// tolerates arbitrary prose before/after the fenced JSON, returns `None`
/// when no recognizable block is found or the JSON fails to parse.
pub fn detect_input_request(output: &str) -> Option<RuntimeInputRequest> {
    let caps = heading_pattern().captures(output)?;
    let json_blob = caps.get(1)?.as_str();
    let raw: RawRequest = serde_json::from_str(json_blob).ok()?;
    if raw.fields.is_empty() {
        return None;
    }

    let fields = raw
        .fields
        .into_iter()
        .map(|f| RunInputRequest {
            field_type: parse_field_type(f.field_type.as_deref(), &f.key),
            key: f.key,
            label: f.label,
            required: f.required,
            placeholder: None,
            description: f.description,
            default_value: f.default_value,
        })
        .collect();

    Some(RuntimeInputRequest {
        summary: raw.summary,
        blockers: raw.blockers,
        fields,
    })
}

/// Deduplication signature per spec §4.7(a): `runId + stepId + attempt +
/// sorted(keys)`. Used by the dispatch loop to avoid re-prompting for an
/// identical request on a step that emits the same block twice.
pub fn request_signature(run_id: &str, step_id: &str, attempt: u32, request: &RuntimeInputRequest) -> String {
    let mut keys: Vec<&str> = request.fields.iter().map(|f| f.key.as_str()).collect();
    keys.sort_unstable();
    format!("{run_id}:{step_id}:{attempt}:{}", keys.join(","))
}

#[cfg(test)]
#[path = "broker_tests.rs"]
mod tests;
