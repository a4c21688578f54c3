// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Fyreflow Labs

use super::*;
use fyreflow_core::testing::PipelineBuilder;
use fyreflow_core::{FakeClock, Clock, RunId};
use std::collections::HashMap;

#[test]
fn null_persist_accepts_any_run_without_panicking() {
    let pipeline = PipelineBuilder::new("p1", "P").build();
    let clock = FakeClock::new(0);
    let run = Run::new(RunId::new("r1"), pipeline, "task".to_string(), HashMap::new(), clock.epoch_ms());
    NullPersist.save(&run);
}
