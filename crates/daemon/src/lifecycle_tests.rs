use std::collections::HashMap;

use fyreflow_core::{
    OutputContract, OutputFormat, Pipeline, PipelineId, ProviderSelector, RunMode, RuntimeConfig,
    Step, StepId, StepRole,
};
use tempfile::TempDir;

use super::*;
use crate::config::DaemonConfig;

fn sample_pipeline(id: &str) -> Pipeline {
    Pipeline {
        id: PipelineId::new(id),
        name: "Sample".to_string(),
        description: String::new(),
        steps: vec![Step {
            id: StepId::new("step-a"),
            name: "A".to_string(),
            role: StepRole::Analysis,
            prompt: "do the thing".to_string(),
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
            output_format: OutputFormat::Markdown,
            contract: OutputContract::default(),
        }],
        links: Vec::new(),
        gates: Vec::new(),
        runtime: RuntimeConfig::default(),
        schedule: None,
        version: 1,
    }
}

async fn test_state(dir: &TempDir) -> Arc<AppState> {
    let config = DaemonConfig {
        data_dir: dir.path().join("data"),
        storage_root: dir.path().join("storage"),
        bind_addr: "127.0.0.1:0".to_string(),
        run_concurrency: 4,
        cron_poll_period: std::time::Duration::from_secs(15),
        log_path: dir.path().join("d.log"),
    };
    AppState::new(&config).expect("state init")
}

#[tokio::test]
async fn start_run_returns_a_queued_run_that_eventually_terminates() {
    let dir = TempDir::new().expect("tempdir");
    let state = test_state(&dir).await;
    let pipeline = sample_pipeline("p1");
    state.store.create_pipeline(pipeline.clone()).expect("create");

    let run = start_run(&state, &pipeline.id, "do it".to_string(), HashMap::new(), RunMode::Quick)
        .await
        .expect("start run");
    assert_eq!(run.pipeline_id, pipeline.id);

    for _ in 0..50 {
        if let Some(stored) = state.store.get_run(&run.id) {
            if stored.status.is_terminal() {
                // Simulated executor always returns the auth-failure sentinel.
                assert_eq!(stored.status, fyreflow_core::RunStatus::Failed);
                return;
            }
        }
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }
    panic!("run did not terminate in time");
}

#[tokio::test]
async fn start_run_refuses_a_second_concurrent_run_for_the_same_pipeline() {
    let dir = TempDir::new().expect("tempdir");
    let state = test_state(&dir).await;
    let pipeline = sample_pipeline("p1");
    state.store.create_pipeline(pipeline.clone()).expect("create");

    let mut run = fyreflow_core::Run::new(
        fyreflow_core::RunId::new("r-active"),
        pipeline.clone(),
        "t".to_string(),
        HashMap::new(),
        0,
    );
    run.status = fyreflow_core::RunStatus::Running;
    state.store.put_run(run).expect("put run");

    let err = start_run(&state, &pipeline.id, "t".to_string(), HashMap::new(), RunMode::Quick)
        .await
        .expect_err("should refuse");
    assert!(matches!(err, DaemonError::PipelineBusy(_)));
}

#[tokio::test]
async fn smart_run_refuses_to_start_with_missing_required_inputs() {
    let dir = TempDir::new().expect("tempdir");
    let state = test_state(&dir).await;
    let mut pipeline = sample_pipeline("p1");
    pipeline.steps[0].prompt = "use {{input.api_key}} please".to_string();
    state.store.create_pipeline(pipeline.clone()).expect("create");

    let err = start_run(&state, &pipeline.id, "t".to_string(), HashMap::new(), RunMode::Smart)
        .await
        .expect_err("should refuse");
    assert!(matches!(err, DaemonError::MissingRequiredInputs(_)));
}

#[tokio::test]
async fn control_messages_against_an_unknown_run_are_rejected() {
    let dir = TempDir::new().expect("tempdir");
    let state = test_state(&dir).await;
    let err = stop_run(&state, &fyreflow_core::RunId::new("ghost")).expect_err("unknown run");
    assert!(matches!(err, DaemonError::UnknownRun(_)));
}
