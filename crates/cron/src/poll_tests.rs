use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{TimeZone, Utc};
use fyreflow_core::testing::{step, PipelineBuilder};
use fyreflow_core::{Pipeline, PipelineId, RunId, RunMode, Schedule};
use parking_lot::Mutex;

use super::*;

fn scheduled_pipeline(cron: &str) -> Pipeline {
    let mut pipeline = PipelineBuilder::new("p1", "Nightly")
        .steps(vec![step("a", "A")])
        .build();
    pipeline.schedule = Some(Schedule {
        enabled: true,
        cron: cron.to_string(),
        timezone: "UTC".to_string(),
        task: "nightly".to_string(),
        run_mode: RunMode::Quick,
        inputs: HashMap::new(),
    });
    pipeline
}

struct FixedSource(Vec<Pipeline>);
impl ScheduleSource for FixedSource {
    fn scheduled_pipelines(&self) -> Vec<Pipeline> {
        self.0.clone()
    }
}

struct FixedActive(bool);
impl ActiveRunTracker for FixedActive {
    fn has_active_run(&self, _pipeline_id: &PipelineId) -> bool {
        self.0
    }
}

struct FixedPreflight(bool);
impl PreflightGate for FixedPreflight {
    fn is_clean(&self, _pipeline: &Pipeline, _inputs: &HashMap<String, String>) -> bool {
        self.0
    }
}

struct CountingTrigger {
    calls: AtomicUsize,
    fail: bool,
}

impl CountingTrigger {
    fn new(fail: bool) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail,
        }
    }
}

#[async_trait]
impl RunTrigger for CountingTrigger {
    async fn trigger(&self, _pipeline: &Pipeline) -> Result<RunId, String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            Err("simulated failure".to_string())
        } else {
            Ok(RunId::new("r1"))
        }
    }
}

#[derive(Default)]
struct RecordingSink {
    skips: Mutex<Vec<(PipelineId, SkipReason)>>,
    triggers: Mutex<Vec<(PipelineId, RunId)>>,
}

impl ScheduleEventSink for RecordingSink {
    fn skipped(&self, pipeline_id: &PipelineId, reason: SkipReason) {
        self.skips.lock().push((pipeline_id.clone(), reason));
    }

    fn triggered(&self, pipeline_id: &PipelineId, run_id: &RunId) {
        self.triggers.lock().push((pipeline_id.clone(), run_id.clone()));
    }
}

#[tokio::test]
async fn due_clean_idle_pipeline_is_triggered() {
    let scheduler = CronScheduler::new(Duration::from_secs(15));
    let source = FixedSource(vec![scheduled_pipeline("* * * * *")]);
    let active = FixedActive(false);
    let preflight = FixedPreflight(true);
    let trigger = CountingTrigger::new(false);
    let sink = RecordingSink::default();

    let now = Utc.with_ymd_and_hms(2026, 7, 28, 10, 1, 0).unwrap();
    let ctx = TickContext {
        source: &source,
        active: &active,
        preflight: &preflight,
        trigger: &trigger,
        sink: &sink,
    };
    scheduler.tick(now, &ctx).await;

    assert_eq!(trigger.calls.load(Ordering::SeqCst), 1);
    assert_eq!(sink.triggers.lock().len(), 1);
    assert!(sink.skips.lock().is_empty());
}

#[tokio::test]
async fn busy_pipeline_is_skipped_not_triggered() {
    let scheduler = CronScheduler::new(Duration::from_secs(15));
    let source = FixedSource(vec![scheduled_pipeline("* * * * *")]);
    let active = FixedActive(true);
    let preflight = FixedPreflight(true);
    let trigger = CountingTrigger::new(false);
    let sink = RecordingSink::default();

    let now = Utc.with_ymd_and_hms(2026, 7, 28, 10, 1, 0).unwrap();
    let ctx = TickContext {
        source: &source,
        active: &active,
        preflight: &preflight,
        trigger: &trigger,
        sink: &sink,
    };
    scheduler.tick(now, &ctx).await;

    assert_eq!(trigger.calls.load(Ordering::SeqCst), 0);
    assert_eq!(sink.skips.lock(), vec![(PipelineId::new("p1"), SkipReason::Busy)]);
}

#[tokio::test]
async fn dirty_preflight_is_skipped_not_triggered() {
    let scheduler = CronScheduler::new(Duration::from_secs(15));
    let source = FixedSource(vec![scheduled_pipeline("* * * * *")]);
    let active = FixedActive(false);
    let preflight = FixedPreflight(false);
    let trigger = CountingTrigger::new(false);
    let sink = RecordingSink::default();

    let now = Utc.with_ymd_and_hms(2026, 7, 28, 10, 1, 0).unwrap();
    let ctx = TickContext {
        source: &source,
        active: &active,
        preflight: &preflight,
        trigger: &trigger,
        sink: &sink,
    };
    scheduler.tick(now, &ctx).await;

    assert_eq!(trigger.calls.load(Ordering::SeqCst), 0);
    assert_eq!(
        sink.skips.lock().as_slice(),
        [(PipelineId::new("p1"), SkipReason::PreflightFailed)]
    );
}

#[tokio::test]
async fn invalid_cron_is_skipped_and_never_retried_as_valid() {
    let scheduler = CronScheduler::new(Duration::from_secs(15));
    let source = FixedSource(vec![scheduled_pipeline("not a cron expr")]);
    let active = FixedActive(false);
    let preflight = FixedPreflight(true);
    let trigger = CountingTrigger::new(false);
    let sink = RecordingSink::default();

    let now = Utc.with_ymd_and_hms(2026, 7, 28, 10, 1, 0).unwrap();
    let ctx = TickContext {
        source: &source,
        active: &active,
        preflight: &preflight,
        trigger: &trigger,
        sink: &sink,
    };
    scheduler.tick(now, &ctx).await;

    assert_eq!(trigger.calls.load(Ordering::SeqCst), 0);
    assert_eq!(
        sink.skips.lock().as_slice(),
        [(PipelineId::new("p1"), SkipReason::CronInvalid)]
    );
}

#[tokio::test]
async fn a_pipeline_only_fires_once_across_repeated_ticks_within_the_same_minute() {
    let scheduler = CronScheduler::new(Duration::from_secs(15));
    let source = FixedSource(vec![scheduled_pipeline("* * * * *")]);
    let active = FixedActive(false);
    let preflight = FixedPreflight(true);
    let trigger = CountingTrigger::new(false);
    let sink = RecordingSink::default();

    let base = Utc.with_ymd_and_hms(2026, 7, 28, 10, 1, 0).unwrap();
    let ctx = TickContext {
        source: &source,
        active: &active,
        preflight: &preflight,
        trigger: &trigger,
        sink: &sink,
    };
    scheduler.tick(base, &ctx).await;
    scheduler.tick(base + chrono::Duration::seconds(15), &ctx).await;
    scheduler.tick(base + chrono::Duration::seconds(30), &ctx).await;

    assert_eq!(trigger.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn a_failed_trigger_is_recorded_as_a_skip_not_a_panic() {
    let scheduler = CronScheduler::new(Duration::from_secs(15));
    let source = FixedSource(vec![scheduled_pipeline("* * * * *")]);
    let active = FixedActive(false);
    let preflight = FixedPreflight(true);
    let trigger = CountingTrigger::new(true);
    let sink = RecordingSink::default();

    let now = Utc.with_ymd_and_hms(2026, 7, 28, 10, 1, 0).unwrap();
    let ctx = TickContext {
        source: &source,
        active: &active,
        preflight: &preflight,
        trigger: &trigger,
        sink: &sink,
    };
    scheduler.tick(now, &ctx).await;

    assert_eq!(trigger.calls.load(Ordering::SeqCst), 1);
    assert!(sink.triggers.lock().is_empty());
    assert_eq!(sink.skips.lock().as_slice(), [(PipelineId::new("p1"), SkipReason::Busy)]);
}

#[tokio::test]
async fn disabled_schedules_are_never_considered() {
    let scheduler = CronScheduler::new(Duration::from_secs(15));
    let mut pipeline = scheduled_pipeline("* * * * *");
    pipeline.schedule.as_mut().unwrap().enabled = false;
    let source = FixedSource(vec![pipeline]);
    let active = FixedActive(false);
    let preflight = FixedPreflight(true);
    let trigger = CountingTrigger::new(false);
    let sink = RecordingSink::default();

    let now = Utc.with_ymd_and_hms(2026, 7, 28, 10, 1, 0).unwrap();
    let ctx = TickContext {
        source: &source,
        active: &active,
        preflight: &preflight,
        trigger: &trigger,
        sink: &sink,
    };
    scheduler.tick(now, &ctx).await;

    assert_eq!(trigger.calls.load(Ordering::SeqCst), 0);
    assert!(sink.skips.lock().is_empty());
}
