// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Fyreflow Labs

use super::*;

#[test]
fn error_code_display_matches_spec_tokens() {
    assert_eq!(ErrorCode::LoopExhausted.to_string(), "loop_exhausted");
    assert_eq!(
        ErrorCode::ProviderUnauthenticated.to_string(),
        "provider_unauthenticated"
    );
}

#[test]
fn api_error_serializes_code_and_message() {
    let err = ApiError::new(ErrorCode::ValidationError, "name too short");
    let json = serde_json::to_value(&err).unwrap();
    assert_eq!(json["code"], "validation_error");
    assert_eq!(json["message"], "name too short");
    assert!(json.get("details").is_none());
}
