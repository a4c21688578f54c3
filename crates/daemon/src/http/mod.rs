// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Fyreflow Labs

//! The HTTP/JSON API (spec §6) the editor depends on, built with `axum`
//! (grounded in `web3infra-foundation-git-internal`'s HTTP surfaces — the
//! only retrieval-pack repo pairing `axum` with a domain runtime). The
//! engine and cron crates never depend on `axum` directly; only this
//! module's handlers do, keeping the core transport-agnostic.

mod overview;
mod pipelines;
mod runs;
mod secrets;

use std::sync::Arc;

use axum::routing::{delete, get, patch, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/state", get(overview::get_state))
        .route("/pipelines", post(pipelines::create_pipeline))
        .route(
            "/pipelines/:id",
            patch(pipelines::update_pipeline).delete(pipelines::delete_pipeline),
        )
        .route("/pipelines/:id/smart-run-plan", get(pipelines::smart_run_plan))
        .route("/pipelines/:id/startup-check", get(pipelines::startup_check))
        .route(
            "/pipelines/:id/secure-inputs",
            put(secrets::save_secure_inputs).delete(secrets::forget_secure_inputs),
        )
        .route("/runs", get(runs::list_runs).post(runs::start_run))
        .route("/runs/:id", get(runs::get_run))
        .route("/runs/:id/stop", post(runs::stop_run))
        .route("/runs/:id/pause", post(runs::pause_run))
        .route("/runs/:id/resume", post(runs::resume_run))
        .route("/runs/:id/inputs", post(runs::submit_inputs))
        .route(
            "/runs/:id/approvals/:approval_id",
            post(runs::resolve_approval),
        )
        .route("/runs/:id/events", get(runs::run_events))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
