// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Fyreflow Labs

//! Pipeline CRUD: create, update, delete, list, get — with validation on
//! every write.

use std::str::FromStr;

use fyreflow_core::{Pipeline, PipelineId};

use crate::{Store, StoreError};

impl Store {
    /// Validate and insert a new pipeline. Fails if a pipeline with the same
    /// id already exists.
    pub fn create_pipeline(&self, pipeline: Pipeline) -> Result<Pipeline, StoreError> {
        validate_pipeline(&pipeline)?;
        {
            let mut db = self.inner.write();
            db.pipelines.insert(pipeline.id.clone(), pipeline.clone());
        }
        self.persist()?;
        Ok(pipeline)
    }

    /// Validate and replace an existing pipeline definition in place.
    pub fn update_pipeline(&self, pipeline: Pipeline) -> Result<Pipeline, StoreError> {
        validate_pipeline(&pipeline)?;
        {
            let mut db = self.inner.write();
            if !db.pipelines.contains_key(&pipeline.id) {
                return Err(StoreError::UnknownPipeline(pipeline.id.to_string()));
            }
            db.pipelines.insert(pipeline.id.clone(), pipeline.clone());
        }
        self.persist()?;
        Ok(pipeline)
    }

    /// Delete a pipeline. Refuses if any run referencing it is still active
    /// (queued/running/paused/awaiting_approval).
    pub fn delete_pipeline(&self, id: &PipelineId) -> Result<(), StoreError> {
        {
            let db = self.inner.read();
            if !db.pipelines.contains_key(id) {
                return Err(StoreError::UnknownPipeline(id.to_string()));
            }
            let has_active_run = db
                .runs
                .values()
                .any(|r| &r.pipeline_id == id && r.status.is_active());
            if has_active_run {
                return Err(StoreError::PipelineHasActiveRun(id.to_string()));
            }
        }
        {
            let mut db = self.inner.write();
            db.pipelines.shift_remove(id);
            db.runs.retain(|_, r| &r.pipeline_id != id);
        }
        self.persist()
    }

    pub fn get_pipeline(&self, id: &PipelineId) -> Option<Pipeline> {
        self.inner.read().pipelines.get(id).cloned()
    }

    pub fn list_pipelines(&self) -> Vec<Pipeline> {
        self.inner.read().pipelines.values().cloned().collect()
    }

    /// All pipelines with `schedule.enabled == true` (input to the cron scheduler).
    pub fn list_scheduled_pipelines(&self) -> Vec<Pipeline> {
        self.inner
            .read()
            .pipelines
            .values()
            .filter(|p| p.schedule.as_ref().is_some_and(|s| s.enabled))
            .cloned()
            .collect()
    }

    /// Whether any run for `pipeline_id` is currently active. Used by the
    /// cron scheduler's overlap check and by the daemon's `POST /runs` guard.
    pub fn has_active_run(&self, pipeline_id: &PipelineId) -> bool {
        self.inner
            .read()
            .runs
            .values()
            .any(|r| &r.pipeline_id == pipeline_id && r.status.is_active())
    }
}

fn validate_pipeline(pipeline: &Pipeline) -> Result<(), StoreError> {
    pipeline.validate()?;
    if let Some(schedule) = &pipeline.schedule {
        if schedule.enabled {
            chrono_tz::Tz::from_str(&schedule.timezone)
                .map_err(|_| StoreError::InvalidTimezone(schedule.timezone.clone()))?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "pipelines_tests.rs"]
mod tests;
