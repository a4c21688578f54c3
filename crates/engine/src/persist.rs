// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Fyreflow Labs

//! The run-persistence seam: the dispatch loop calls this after every
//! dispatch boundary so a crash loses at most one in-flight step (spec §4.2,
//! mirroring `fyreflow_store::Store::put_run`'s own doc comment). Kept as a
//! trait rather than a direct `fyreflow-store` dependency so this crate's
//! tests don't need a real store on disk.

use fyreflow_core::Run;

pub trait RunPersist: Send + Sync {
    fn save(&self, run: &Run);
}

/// Discards every save. Used in tests that only inspect the final `Run`
/// returned from [`crate::dispatch::RunEngine::drive`].
#[derive(Debug, Clone, Copy, Default)]
pub struct NullPersist;

impl RunPersist for NullPersist {
    fn save(&self, _run: &Run) {}
}

#[cfg(test)]
#[path = "persist_tests.rs"]
mod tests;
