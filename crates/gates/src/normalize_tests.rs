// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Fyreflow Labs

use super::*;
use serial_test::serial;

#[test]
fn strips_markdown_bold_around_status() {
    let out = normalize_status_markers("HTML_REVIEW_STATUS: **PASS**");
    assert_eq!(out, "HTML_REVIEW_STATUS: PASS");
}

#[test]
fn aliases_complete_to_pass() {
    let out = normalize_status_markers("WORKFLOW_STATUS: COMPLETE");
    assert_eq!(out, "WORKFLOW_STATUS: PASS");
}

#[test]
fn is_idempotent() {
    let once = normalize_status_markers("WORKFLOW_STATUS: **complete**");
    let twice = normalize_status_markers(&once);
    assert_eq!(once, twice);
}

#[test]
fn leaves_unrelated_text_untouched() {
    let out = normalize_status_markers("## Review\nLooks good overall.");
    assert_eq!(out, "## Review\nLooks good overall.");
}

#[test]
fn find_status_marker_prefers_workflow_status() {
    let normalized = normalize_status_markers("HTML_REVIEW_STATUS: FAIL\nWORKFLOW_STATUS: PASS");
    let (namespace, status) = find_status_marker(&normalized).unwrap();
    assert_eq!(namespace, "WORKFLOW_STATUS");
    assert_eq!(status, "PASS");
}

#[test]
fn find_status_marker_falls_back_to_other_namespace() {
    let normalized = normalize_status_markers("HTML_REVIEW_STATUS: FAIL");
    let (namespace, status) = find_status_marker(&normalized).unwrap();
    assert_eq!(namespace, "HTML_REVIEW_STATUS");
    assert_eq!(status, "FAIL");
}

#[test]
#[serial]
fn disabling_the_flag_skips_normalization() {
    std::env::set_var(LEGACY_REGEX_GATES_ENV, "0");
    let out = normalize_status_markers("WORKFLOW_STATUS: **COMPLETE**");
    std::env::remove_var(LEGACY_REGEX_GATES_ENV);
    assert_eq!(out, "WORKFLOW_STATUS: **COMPLETE**");
}
