// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Fyreflow Labs

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! fyreflow-store: the pipeline and run catalog (C2).
//!
//! A single JSON file (`local-db.json`) holds every pipeline definition and
//! the last-N runs per pipeline, guarded by a `parking_lot::RwLock` (many
//! readers, one writer) and written atomically through [`persist`].

pub mod error;
pub mod persist;
pub mod pipelines;
pub mod runs;

pub use error::StoreError;

use fyreflow_core::{Pipeline, PipelineId, Run, RunId};
use indexmap::IndexMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

fn default_schema_version() -> u32 {
    1
}

/// On-disk shape of `local-db.json`.
#[derive(Debug, Default, Serialize, Deserialize)]
pub(crate) struct Db {
    #[serde(default = "default_schema_version")]
    pub version: u32,
    #[serde(default)]
    pub pipelines: IndexMap<PipelineId, Pipeline>,
    #[serde(default)]
    pub runs: IndexMap<RunId, Run>,
}

/// The pipeline + run catalog, backed by one JSON file.
///
/// Write lock is never held across a provider call or disk fsync beyond the
/// atomic rename itself — callers take a read lock to snapshot, drop it,
/// then persist on their own time.
pub struct Store {
    path: PathBuf,
    inner: RwLock<Db>,
    /// Last-N runs retained per pipeline (capacity knob, §3 "Lifecycles").
    pub run_retention: usize,
}

const DEFAULT_RUN_RETENTION: usize = 50;

impl Store {
    /// Open (or create) the database at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let db: Db = persist::load_atomic(&path)?.unwrap_or_default();
        Ok(Self {
            path,
            inner: RwLock::new(db),
            run_retention: DEFAULT_RUN_RETENTION,
        })
    }

    #[cfg(test)]
    fn open_in(dir: &Path) -> Result<Self, StoreError> {
        Self::open(dir.join("local-db.json"))
    }

    fn persist(&self) -> Result<(), StoreError> {
        let snapshot = self.inner.read();
        persist::save_atomic(&self.path, &*snapshot)
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;

#[cfg(test)]
pub(crate) mod tests_support {
    use fyreflow_core::{
        OutputContract, OutputFormat, Pipeline, PipelineId, ProviderSelector, RuntimeConfig, Step,
        StepId, StepRole,
    };

    pub fn sample_pipeline(id: &str) -> Pipeline {
        Pipeline {
            id: PipelineId::new(id),
            name: "Sample Pipeline".to_string(),
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
}
