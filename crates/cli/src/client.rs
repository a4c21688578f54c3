// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Fyreflow Labs

//! HTTP client for the `fyreflowd` daemon.
//!
//! Thin wrapper over `reqwest`: one method per endpoint in spec §6, no
//! orchestration logic. Errors are surfaced as [`ClientError`] so commands
//! can print a stable `error: <message>` line instead of a `reqwest` debug
//! dump.

use std::collections::HashMap;
use std::time::Duration;

use fyreflow_core::{Pipeline, Run};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("could not reach fyreflowd at {url}: {source}")]
    Connect { url: String, source: reqwest::Error },

    #[error("{code}: {message}")]
    Api { code: String, message: String },

    #[error("unexpected response from fyreflowd: {0}")]
    Decode(#[from] reqwest::Error),

    #[error("malformed response from fyreflowd: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Debug, serde::Deserialize)]
struct ApiErrorBody {
    code: String,
    message: String,
}

/// Client for the daemon's HTTP/JSON API.
pub struct DaemonClient {
    base_url: String,
    http: reqwest::Client,
}

impl DaemonClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into(),
            http: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn send<T: DeserializeOwned>(&self, req: reqwest::RequestBuilder) -> Result<T, ClientError> {
        let resp = req.send().await.map_err(|source| ClientError::Connect {
            url: self.base_url.clone(),
            source,
        })?;
        self.handle(resp).await
    }

    async fn send_no_body(&self, req: reqwest::RequestBuilder) -> Result<(), ClientError> {
        let resp = req.send().await.map_err(|source| ClientError::Connect {
            url: self.base_url.clone(),
            source,
        })?;
        if resp.status().is_success() {
            return Ok(());
        }
        let body: ApiErrorBody = resp.json().await.unwrap_or(ApiErrorBody {
            code: "unknown".to_string(),
            message: "request failed".to_string(),
        });
        Err(ClientError::Api {
            code: body.code,
            message: body.message,
        })
    }

    async fn handle<T: DeserializeOwned>(&self, resp: reqwest::Response) -> Result<T, ClientError> {
        if resp.status().is_success() {
            return Ok(resp.json::<T>().await?);
        }
        let body: ApiErrorBody = resp.json().await.unwrap_or(ApiErrorBody {
            code: "unknown".to_string(),
            message: "request failed".to_string(),
        });
        Err(ClientError::Api {
            code: body.code,
            message: body.message,
        })
    }

    pub async fn state(&self) -> Result<Value, ClientError> {
        self.send(self.http.get(self.url("/state"))).await
    }

    pub async fn list_pipelines(&self) -> Result<Vec<Pipeline>, ClientError> {
        let state: Value = self.state().await?;
        let pipelines = state.get("pipelines").cloned().unwrap_or(Value::Array(vec![]));
        Ok(serde_json::from_value(pipelines)?)
    }

    pub async fn get_pipeline(&self, id: &str) -> Result<Pipeline, ClientError> {
        self.list_pipelines()
            .await?
            .into_iter()
            .find(|p| p.id.as_str() == id)
            .ok_or_else(|| ClientError::Api {
                code: "unknown_pipeline".to_string(),
                message: format!("no pipeline with id '{id}'"),
            })
    }

    pub async fn create_pipeline(&self, pipeline: &Pipeline) -> Result<Pipeline, ClientError> {
        self.send(self.http.post(self.url("/pipelines")).json(pipeline)).await
    }

    pub async fn delete_pipeline(&self, id: &str) -> Result<(), ClientError> {
        self.send_no_body(self.http.delete(self.url(&format!("/pipelines/{id}"))))
            .await
    }

    pub async fn smart_run_plan(
        &self,
        pipeline_id: &str,
        inputs: &HashMap<String, String>,
    ) -> Result<Value, ClientError> {
        self.send(
            self.http
                .get(self.url(&format!("/pipelines/{pipeline_id}/smart-run-plan")))
                .query(inputs),
        )
        .await
    }

    pub async fn start_run(
        &self,
        pipeline_id: &str,
        task: String,
        inputs: HashMap<String, String>,
        run_mode: &str,
    ) -> Result<Run, ClientError> {
        #[derive(Serialize)]
        struct Req<'a> {
            pipeline_id: &'a str,
            task: String,
            inputs: HashMap<String, String>,
            run_mode: &'a str,
        }
        self.send(self.http.post(self.url("/runs")).json(&Req {
            pipeline_id,
            task,
            inputs,
            run_mode,
        }))
        .await
    }

    pub async fn list_runs(&self, pipeline_id: Option<&str>, limit: Option<usize>) -> Result<Vec<Run>, ClientError> {
        let mut query = Vec::new();
        if let Some(id) = pipeline_id {
            query.push(("pipeline_id", id.to_string()));
        }
        if let Some(limit) = limit {
            query.push(("limit", limit.to_string()));
        }
        self.send(self.http.get(self.url("/runs")).query(&query)).await
    }

    pub async fn get_run(&self, id: &str) -> Result<Run, ClientError> {
        self.send(self.http.get(self.url(&format!("/runs/{id}")))).await
    }

    pub async fn stop_run(&self, id: &str) -> Result<(), ClientError> {
        self.send_no_body(self.http.post(self.url(&format!("/runs/{id}/stop"))))
            .await
    }

    pub async fn pause_run(&self, id: &str) -> Result<(), ClientError> {
        self.send_no_body(self.http.post(self.url(&format!("/runs/{id}/pause"))))
            .await
    }

    pub async fn resume_run(&self, id: &str) -> Result<(), ClientError> {
        self.send_no_body(self.http.post(self.url(&format!("/runs/{id}/resume"))))
            .await
    }

    pub async fn submit_inputs(&self, id: &str, values: HashMap<String, String>) -> Result<(), ClientError> {
        #[derive(Serialize)]
        struct Req {
            values: HashMap<String, String>,
        }
        self.send_no_body(
            self.http
                .post(self.url(&format!("/runs/{id}/inputs")))
                .json(&Req { values }),
        )
        .await
    }

    pub async fn resolve_approval(
        &self,
        run_id: &str,
        approval_id: &str,
        approved: bool,
        note: Option<String>,
    ) -> Result<(), ClientError> {
        #[derive(Serialize)]
        #[serde(rename_all = "snake_case")]
        enum Decision {
            Approved,
            Rejected,
        }
        #[derive(Serialize)]
        struct Req {
            decision: Decision,
            note: Option<String>,
        }
        let decision = if approved { Decision::Approved } else { Decision::Rejected };
        self.send_no_body(
            self.http
                .post(self.url(&format!("/runs/{run_id}/approvals/{approval_id}")))
                .json(&Req { decision, note }),
        )
        .await
    }

    pub async fn save_secure_inputs(&self, pipeline_id: &str, values: &HashMap<String, String>) -> Result<(), ClientError> {
        self.send_no_body(
            self.http
                .put(self.url(&format!("/pipelines/{pipeline_id}/secure-inputs")))
                .json(values),
        )
        .await
    }

    pub async fn forget_secure_inputs(&self, pipeline_id: &str, keys: Vec<String>) -> Result<(), ClientError> {
        #[derive(Serialize)]
        struct Req {
            keys: Vec<String>,
        }
        self.send_no_body(
            self.http
                .delete(self.url(&format!("/pipelines/{pipeline_id}/secure-inputs")))
                .json(&Req { keys }),
        )
        .await
    }
}
