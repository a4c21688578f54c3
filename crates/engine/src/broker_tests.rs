// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Fyreflow Labs

use super::*;

const SAMPLE_BLOCK: &str = r#"
I looked into this and I need more information before I can continue.

## input-request

```json
{
  "summary": "Need the Figma link and a reviewer email to proceed.",
  "blockers": ["no design reference found"],
  "fields": [
    {"key": "figma_link", "label": "Figma link", "type": "url", "required": true},
    {"key": "reviewer_email", "label": "Reviewer email", "type": "text", "required": false, "defaultValue": "eng@example.com"}
  ]
}
```

Let me know once these are set.
"#;

#[test]
fn detects_well_formed_request() {
    let req = detect_input_request(SAMPLE_BLOCK).expect("should detect request");
    assert_eq!(req.fields.len(), 2);
    assert_eq!(req.fields[0].key, "figma_link");
    assert_eq!(req.fields[0].field_type, InputFieldType::Url);
    assert!(req.fields[0].required);
    assert!(!req.fields[1].required);
    assert_eq!(req.blockers, vec!["no design reference found".to_string()]);
}

#[test]
fn returns_none_for_normal_output() {
    assert!(detect_input_request("WORKFLOW_STATUS: PASS\nAll good.").is_none());
}

#[test]
fn returns_none_for_malformed_json() {
    let text = "## input-request\n```json\n{ not valid json \n```\n";
    assert!(detect_input_request(text).is_none());
}

#[test]
fn returns_none_when_fields_empty() {
    let text = "## input-request\n```json\n{\"summary\": \"nothing needed\", \"fields\": []}\n```\n";
    assert!(detect_input_request(text).is_none());
}

#[test]
fn sensitive_key_without_explicit_type_infers_secret() {
    let text = r#"## input-request
```json
{"summary": "need a token", "fields": [{"key": "api_token", "label": "API token", "required": true}]}
```
"#;
    let req = detect_input_request(text).expect("should detect request");
    assert_eq!(req.fields[0].field_type, InputFieldType::Secret);
}

#[test]
fn signature_is_stable_regardless_of_field_declaration_order() {
    let req_a = RuntimeInputRequest {
        summary: String::new(),
        blockers: vec![],
        fields: vec![
            RunInputRequest {
                key: "b".to_string(),
                label: "B".to_string(),
                field_type: InputFieldType::Text,
                required: true,
                placeholder: None,
                description: None,
                default_value: None,
            },
            RunInputRequest {
                key: "a".to_string(),
                label: "A".to_string(),
                field_type: InputFieldType::Text,
                required: true,
                placeholder: None,
                description: None,
                default_value: None,
            },
        ],
    };
    let sig = request_signature("run-1", "step-1", 1, &req_a);
    assert_eq!(sig, "run-1:step-1:1:a,b");
}

#[test]
fn signature_changes_with_attempt() {
    let req = RuntimeInputRequest {
        summary: String::new(),
        blockers: vec![],
        fields: vec![RunInputRequest {
            key: "a".to_string(),
            label: "A".to_string(),
            field_type: InputFieldType::Text,
            required: true,
            placeholder: None,
            description: None,
            default_value: None,
        }],
    };
    assert_ne!(
        request_signature("run-1", "step-1", 1, &req),
        request_signature("run-1", "step-1", 2, &req)
    );
}
