// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Fyreflow Labs

use super::*;
use serde_json::json;

#[test]
fn looks_up_a_plain_dotted_path() {
    let value = json!({"a": {"b": {"c": 42}}});
    assert_eq!(lookup(&value, "a.b.c"), Some(&json!(42)));
}

#[test]
fn looks_up_an_array_index() {
    let value = json!({"items": [{"name": "x"}, {"name": "y"}]});
    assert_eq!(lookup(&value, "items[1].name"), Some(&json!("y")));
}

#[test]
fn missing_path_is_none() {
    let value = json!({"a": 1});
    assert_eq!(lookup(&value, "a.b"), None);
}

#[test]
fn null_value_is_treated_as_absent() {
    let value = json!({"a": null});
    assert_eq!(lookup(&value, "a"), None);
}

#[test]
fn bracket_quoted_key_is_supported() {
    let value = json!({"weird key": 1});
    assert_eq!(lookup(&value, "[\"weird key\"]"), Some(&json!(1)));
}

#[test]
fn extracts_first_valid_json_fence() {
    let text = "Here is the result:\n```json\n{\"status\": \"pass\"}\n```\nDone.";
    let value = extract_fenced_json(text).unwrap();
    assert_eq!(value["status"], "pass");
}

#[test]
fn skips_a_non_json_fence_and_finds_the_next_one() {
    let text = "```\nnot json\n```\nLater:\n```\n{\"a\": 1}\n```";
    let value = extract_fenced_json(text).unwrap();
    assert_eq!(value["a"], 1);
}

#[test]
fn returns_none_when_no_fence_parses() {
    assert!(extract_fenced_json("no fences here at all").is_none());
}
