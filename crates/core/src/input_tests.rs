// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Fyreflow Labs

use super::*;

#[test]
fn is_clean_when_no_failing_checks() {
    let plan = SmartRunPlan {
        fields: vec![],
        checks: vec![
            PreflightCheck {
                id: "input:task".to_string(),
                title: "task".to_string(),
                message: "ok".to_string(),
                status: CheckStatus::Pass,
                details: None,
            },
            PreflightCheck {
                id: "provider_auth".to_string(),
                title: "auth".to_string(),
                message: "warn".to_string(),
                status: CheckStatus::Warn,
                details: None,
            },
        ],
    };
    assert!(plan.is_clean());
}

#[test]
fn not_clean_with_a_failing_check() {
    let plan = SmartRunPlan {
        fields: vec![],
        checks: vec![PreflightCheck {
            id: "input:api_key".to_string(),
            title: "api_key".to_string(),
            message: "missing".to_string(),
            status: CheckStatus::Fail,
            details: None,
        }],
    };
    assert!(!plan.is_clean());
}
