// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Fyreflow Labs

use super::*;
use crate::fake::{FailingExecutor, ScriptedExecutor};
use fyreflow_core::{OutputContract, ProviderSelector, StepId, StepRole};

fn sample_step() -> Step {
    Step {
        id: StepId::new("s1"),
        name: "Analyze".to_string(),
        role: StepRole::Analysis,
        prompt: "analyze".to_string(),
        provider: ProviderSelector {
            provider_id: "anthropic".to_string(),
            model: "claude".to_string(),
            reasoning_effort: None,
            fast_mode: false,
            long_context: false,
            context_window_tokens: None,
        },
        context_template: "{{task}}".to_string(),
        delegate: false,
        delegation_count: 1,
        isolated_storage: false,
        shared_storage: false,
        mcp_server_ids: Vec::new(),
        output_format: fyreflow_core::OutputFormat::Markdown,
        contract: OutputContract::default(),
    }
}

fn sample_request() -> ExecuteRequest {
    ExecuteRequest {
        provider: ProviderConfig::default(),
        step: sample_step(),
        task: "do it".to_string(),
        context: "context".to_string(),
        output_mode: OutputMode::Text,
    }
}

#[tokio::test]
async fn cancel_flag_short_circuits_before_calling_the_executor() {
    let cancel = Arc::new(AtomicBool::new(true));
    let executor = ScriptedExecutor::new();
    let result = execute_with_timeout(&executor, sample_request(), cancel, 1000).await;
    assert!(matches!(result, Err(ProviderError::Cancelled)));
    assert!(executor.calls().is_empty());
}

#[tokio::test]
async fn timeout_elapses_when_the_call_never_returns() {
    struct Hangs;
    #[async_trait::async_trait]
    impl ProviderExecutor for Hangs {
        async fn execute(
            &self,
            _request: ExecuteRequest,
            _cancel: Arc<AtomicBool>,
        ) -> Result<String, ProviderError> {
            std::future::pending().await
        }
    }

    let cancel = Arc::new(AtomicBool::new(false));
    let result = execute_with_timeout(&Hangs, sample_request(), cancel, 10).await;
    assert!(matches!(result, Err(ProviderError::Timeout(_))));
}

#[tokio::test]
async fn successful_call_returns_its_output() {
    let executor = ScriptedExecutor::new().script("Analyze", vec!["WORKFLOW_STATUS: PASS".to_string()]);
    let cancel = Arc::new(AtomicBool::new(false));
    let result = execute_with_timeout(&executor, sample_request(), cancel, 5000)
        .await
        .unwrap();
    assert_eq!(result, "WORKFLOW_STATUS: PASS");
}

#[tokio::test]
async fn failing_executor_propagates_its_error_kind() {
    let executor = FailingExecutor {
        error: || ProviderError::Upstream("boom".to_string()),
    };
    let cancel = Arc::new(AtomicBool::new(false));
    let result = execute_with_timeout(&executor, sample_request(), cancel, 5000).await;
    assert!(matches!(result, Err(ProviderError::Upstream(_))));
}

#[test]
fn is_simulated_sentinel_matches_the_prefix() {
    assert!(is_simulated_sentinel("[Simulated anthropic/claude] no creds"));
    assert!(!is_simulated_sentinel("WORKFLOW_STATUS: PASS"));
}
