// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Fyreflow Labs

//! The run event bus seam (C9 lives in `fyreflow-daemon`; this crate only
//! defines the narrow interface the dispatch loop emits through, so the
//! engine stays transport-agnostic the same way it never depends on `axum`).

use fyreflow_core::Event;

/// Receives every [`Event`] the dispatch loop emits, in per-run total
/// order (spec §5 "ordering guarantees").
pub trait EventSink: Send + Sync {
    fn emit(&self, event: Event);
}

/// Discards every event. Used where a caller has no event bus wired up
/// (unit tests that only care about the final [`fyreflow_core::Run`]).
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: Event) {}
}

#[cfg(test)]
#[path = "sink_tests.rs"]
mod tests;
