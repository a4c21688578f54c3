// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Fyreflow Labs

use super::*;
use crate::tests_support::sample_pipeline;
use fyreflow_core::{Run, RunId};

#[test]
fn create_then_get_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open_in(dir.path()).unwrap();
    let pipeline = sample_pipeline("p1");
    store.create_pipeline(pipeline.clone()).unwrap();
    assert_eq!(store.get_pipeline(&pipeline.id), Some(pipeline));
}

#[test]
fn create_rejects_invalid_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open_in(dir.path()).unwrap();
    let mut pipeline = sample_pipeline("p1");
    pipeline.name = "x".to_string();
    assert!(store.create_pipeline(pipeline).is_err());
}

#[test]
fn update_rejects_unknown_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open_in(dir.path()).unwrap();
    let pipeline = sample_pipeline("never-created");
    assert!(matches!(
        store.update_pipeline(pipeline),
        Err(StoreError::UnknownPipeline(_))
    ));
}

#[test]
fn update_replaces_existing() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open_in(dir.path()).unwrap();
    let mut pipeline = sample_pipeline("p1");
    store.create_pipeline(pipeline.clone()).unwrap();
    pipeline.description = "updated".to_string();
    store.update_pipeline(pipeline.clone()).unwrap();
    assert_eq!(store.get_pipeline(&pipeline.id).unwrap().description, "updated");
}

#[test]
fn delete_refuses_while_run_is_active() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open_in(dir.path()).unwrap();
    let pipeline = sample_pipeline("p1");
    store.create_pipeline(pipeline.clone()).unwrap();

    let run = Run::new(
        RunId::new("r1"),
        pipeline.clone(),
        "task".to_string(),
        Default::default(),
        0,
    );
    store.put_run(run).unwrap();

    assert!(matches!(
        store.delete_pipeline(&pipeline.id),
        Err(StoreError::PipelineHasActiveRun(_))
    ));
}

#[test]
fn delete_succeeds_and_purges_runs_once_no_active_run() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open_in(dir.path()).unwrap();
    let pipeline = sample_pipeline("p1");
    store.create_pipeline(pipeline.clone()).unwrap();

    let mut run = Run::new(
        RunId::new("r1"),
        pipeline.clone(),
        "task".to_string(),
        Default::default(),
        0,
    );
    run.status = fyreflow_core::RunStatus::Completed;
    store.put_run(run).unwrap();

    store.delete_pipeline(&pipeline.id).unwrap();
    assert!(store.get_pipeline(&pipeline.id).is_none());
    assert!(store.list_runs(Some(&pipeline.id), None).is_empty());
}

#[test]
fn scheduled_pipeline_with_bad_timezone_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open_in(dir.path()).unwrap();
    let mut pipeline = sample_pipeline("p1");
    pipeline.schedule = Some(fyreflow_core::Schedule {
        enabled: true,
        cron: "*/5 * * * *".to_string(),
        timezone: "Not/A_Zone".to_string(),
        task: "go".to_string(),
        run_mode: fyreflow_core::RunMode::Quick,
        inputs: Default::default(),
    });
    assert!(matches!(
        store.create_pipeline(pipeline),
        Err(StoreError::InvalidTimezone(_))
    ));
}

#[test]
fn list_scheduled_pipelines_filters_on_enabled() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open_in(dir.path()).unwrap();
    let mut scheduled = sample_pipeline("p1");
    scheduled.schedule = Some(fyreflow_core::Schedule {
        enabled: true,
        cron: "*/5 * * * *".to_string(),
        timezone: "UTC".to_string(),
        task: "go".to_string(),
        run_mode: fyreflow_core::RunMode::Quick,
        inputs: Default::default(),
    });
    let unscheduled = sample_pipeline("p2");
    store.create_pipeline(scheduled.clone()).unwrap();
    store.create_pipeline(unscheduled).unwrap();

    let result = store.list_scheduled_pipelines();
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].id, scheduled.id);
}
