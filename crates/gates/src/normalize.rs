// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Fyreflow Labs

//! Status-marker normalization: strips markdown decoration around
//! `<NAMESPACE>_STATUS: ...` tokens and aliases `COMPLETE` to `PASS`, before
//! any gate regex is evaluated against the output.

use regex::Regex;
use std::sync::OnceLock;

/// `1` (default) enables normalization/the `COMPLETE` alias; `0` disables
/// both, so a pipeline relying on exact-text matching sees raw output.
pub const LEGACY_REGEX_GATES_ENV: &str = "FYREFLOW_ENABLE_LEGACY_REGEX_GATES";

pub fn legacy_regex_gates_enabled() -> bool {
    match std::env::var(LEGACY_REGEX_GATES_ENV) {
        Ok(v) => v.trim() != "0",
        Err(_) => true,
    }
}

#[allow(clippy::expect_used)]
fn marker_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)([A-Z][A-Z0-9_]*_STATUS)\s*:\s*\**\s*(PASS|FAIL|NEUTRAL|COMPLETE)\s*\**")
            .expect("status marker pattern is a fixed valid regex")
    })
}

/// Strip `**...**`/extra whitespace around recognized status tokens and
/// alias `COMPLETE` to `PASS`. Idempotent: normalizing twice yields the same
/// string as normalizing once. A no-op when the legacy-regex-gates feature
/// flag is disabled.
pub fn normalize_status_markers(text: &str) -> String {
    if !legacy_regex_gates_enabled() {
        return text.to_string();
    }
    marker_pattern()
        .replace_all(text, |caps: &regex::Captures| {
            let namespace = caps[1].to_ascii_uppercase();
            let status = caps[2].to_ascii_uppercase();
            let status = if status == "COMPLETE" { "PASS" } else { &status };
            format!("{namespace}: {status}")
        })
        .into_owned()
}

/// Find the first recognized `<NAMESPACE>_STATUS: <value>` marker after
/// normalization, preferring `WORKFLOW_STATUS` when more than one namespace
/// is present.
pub fn find_status_marker(normalized: &str) -> Option<(String, String)> {
    let mut first_other: Option<(String, String)> = None;
    for caps in marker_pattern().captures_iter(normalized) {
        let namespace = caps[1].to_ascii_uppercase();
        let mut status = caps[2].to_ascii_uppercase();
        if status == "COMPLETE" {
            status = "PASS".to_string();
        }
        if namespace == "WORKFLOW_STATUS" {
            return Some((namespace, status));
        }
        if first_other.is_none() {
            first_other = Some((namespace, status));
        }
    }
    first_other
}

#[cfg(test)]
#[path = "normalize_tests.rs"]
mod tests;
