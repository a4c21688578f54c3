// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Fyreflow Labs

//! Shared daemon state: the pipeline/run store, the secrets vault, the
//! event bus, the in-flight run-control registry and the run-concurrency
//! semaphore (spec §5: "bounded pool sized to a configurable concurrency
//! cap"). Every HTTP handler and the cron task borrow from one `Arc<AppState>`.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use fyreflow_core::{Clock, RunId, SystemClock};
use fyreflow_engine::ControlSender;
use fyreflow_preflight::{McpReachability, NoMcpRegistry};
use fyreflow_provider::ProviderExecutor;
use fyreflow_store::Store;
use fyreflow_vault::Vault;
use parking_lot::Mutex;
use tokio::sync::Semaphore;

use crate::config::DaemonConfig;
use crate::events::EventBus;

pub struct AppState {
    pub store: Arc<Store>,
    pub vault: Arc<Vault>,
    pub events: Arc<EventBus>,
    pub storage_root: PathBuf,
    pub run_semaphore: Arc<Semaphore>,
    pub controls: Mutex<HashMap<RunId, ControlSender>>,
    pub clock: Arc<dyn Clock>,
    pub mcp_registry: Arc<dyn McpReachability>,
    pub executor: Arc<dyn ProviderExecutor>,
}

impl AppState {
    pub fn new(config: &DaemonConfig) -> std::io::Result<Arc<Self>> {
        std::fs::create_dir_all(&config.data_dir)?;
        std::fs::create_dir_all(&config.storage_root)?;
        let store = Store::open(config.data_dir.join("local-db.json"))
            .map_err(|e| std::io::Error::other(e.to_string()))?;
        let vault = Vault::open(&config.data_dir)?;
        Ok(Arc::new(Self {
            store: Arc::new(store),
            vault: Arc::new(vault),
            events: Arc::new(EventBus::new()),
            storage_root: config.storage_root.clone(),
            run_semaphore: Arc::new(Semaphore::new(config.run_concurrency)),
            controls: Mutex::new(HashMap::new()),
            clock: Arc::new(SystemClock),
            mcp_registry: Arc::new(NoMcpRegistry),
            executor: Arc::new(fyreflow_provider::SimulatedExecutor),
        }))
    }

    pub fn register_control(&self, run_id: RunId, sender: ControlSender) {
        self.controls.lock().insert(run_id, sender);
    }

    pub fn control_sender(&self, run_id: &RunId) -> Option<ControlSender> {
        self.controls.lock().get(run_id).cloned()
    }

    pub fn forget_control(&self, run_id: &RunId) {
        self.controls.lock().remove(run_id);
    }
}
