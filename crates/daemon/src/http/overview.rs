// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Fyreflow Labs

//! `GET /state`: the one shot of everything the editor needs to boot its
//! canvas (spec §6). Provider credentials, MCP server registry entries and
//! storage settings CRUD live in the out-of-scope dashboard settings UI —
//! this daemon only reports what it can see (which providers are referenced
//! by at least one pipeline, which MCP server ids are configured, and the
//! storage root it's using).

use std::collections::BTreeSet;
use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use fyreflow_core::{Pipeline, Run};

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ProviderSummary {
    pub provider_id: String,
    pub credential_configured: bool,
}

#[derive(Debug, Serialize)]
pub struct McpServerSummary {
    pub server_id: String,
    pub reachable: bool,
}

#[derive(Debug, Serialize)]
pub struct StorageSummary {
    pub root: String,
}

#[derive(Debug, Serialize)]
pub struct StateResponse {
    pub pipelines: Vec<Pipeline>,
    pub providers: Vec<ProviderSummary>,
    pub mcp_servers: Vec<McpServerSummary>,
    pub storage: StorageSummary,
    pub runs: Vec<Run>,
}

pub async fn get_state(State(state): State<Arc<AppState>>) -> Json<StateResponse> {
    let pipelines = state.store.list_pipelines();

    let mut provider_ids = BTreeSet::new();
    let mut mcp_ids = BTreeSet::new();
    for pipeline in &pipelines {
        for step in &pipeline.steps {
            provider_ids.insert(step.provider.provider_id.clone());
            for id in &step.mcp_server_ids {
                mcp_ids.insert(id.clone());
            }
        }
    }

    let providers = provider_ids
        .into_iter()
        .map(|provider_id| {
            let credential_configured = pipelines.iter().any(|p| {
                state
                    .vault
                    .stored_keys(p.id.as_str())
                    .unwrap_or_default()
                    .iter()
                    .any(|k| k == &format!("{provider_id}_api_key"))
            });
            ProviderSummary {
                provider_id,
                credential_configured,
            }
        })
        .collect();

    let mcp_servers = mcp_ids
        .into_iter()
        .map(|server_id| {
            let reachable = state.mcp_registry.is_reachable(&server_id);
            McpServerSummary { server_id, reachable }
        })
        .collect();

    let runs = state.store.list_runs(None, Some(100));

    Json(StateResponse {
        pipelines,
        providers,
        mcp_servers,
        storage: StorageSummary {
            root: state.storage_root.display().to_string(),
        },
        runs,
    })
}
