// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Fyreflow Labs

//! Run persistence: insert/replace a run snapshot, list by pipeline, and
//! prune terminal runs beyond the retention capacity.

use fyreflow_core::{PipelineId, Run, RunId};

use crate::{Store, StoreError};

impl Store {
    /// Insert or replace a run's full record (the engine calls this after
    /// every dispatch boundary so a crash loses at most one step).
    pub fn put_run(&self, run: Run) -> Result<(), StoreError> {
        {
            let mut db = self.inner.write();
            db.runs.insert(run.id.clone(), run);
            prune_terminal_runs(&mut db.runs, self.run_retention);
        }
        self.persist()
    }

    pub fn get_run(&self, id: &RunId) -> Option<Run> {
        self.inner.read().runs.get(id).cloned()
    }

    /// Runs for a pipeline, most recent first, optionally capped at `limit`.
    pub fn list_runs(&self, pipeline_id: Option<&PipelineId>, limit: Option<usize>) -> Vec<Run> {
        let db = self.inner.read();
        let mut runs: Vec<Run> = db
            .runs
            .values()
            .filter(|r| match pipeline_id {
                Some(p) => &r.pipeline_id == p,
                None => true,
            })
            .cloned()
            .collect();
        runs.sort_by(|a, b| b.started_at_ms.cmp(&a.started_at_ms));
        if let Some(limit) = limit {
            runs.truncate(limit);
        }
        runs
    }

    pub fn delete_run(&self, id: &RunId) -> Result<(), StoreError> {
        {
            let mut db = self.inner.write();
            if db.runs.shift_remove(id).is_none() {
                return Err(StoreError::UnknownRun(id.to_string()));
            }
        }
        self.persist()
    }
}

/// Keep at most `capacity` runs per pipeline, preferring to drop the oldest
/// terminal runs first. Active runs are never pruned regardless of capacity
/// — retention bounds history, not in-flight state.
fn prune_terminal_runs(runs: &mut indexmap::IndexMap<RunId, Run>, capacity: usize) {
    use std::collections::HashMap;

    let mut by_pipeline: HashMap<PipelineId, Vec<RunId>> = HashMap::new();
    for run in runs.values() {
        by_pipeline
            .entry(run.pipeline_id.clone())
            .or_default()
            .push(run.id.clone());
    }

    for (_, mut ids) in by_pipeline {
        if ids.len() <= capacity {
            continue;
        }
        ids.sort_by_key(|id| runs.get(id).map(|r| r.started_at_ms).unwrap_or(0));
        let overflow = ids.len() - capacity;
        let mut removed = 0;
        for id in ids {
            if removed >= overflow {
                break;
            }
            let is_terminal = runs.get(&id).is_some_and(|r| r.status.is_terminal());
            if is_terminal {
                runs.shift_remove(&id);
                removed += 1;
            }
        }
    }
}

#[cfg(test)]
#[path = "runs_tests.rs"]
mod tests;
