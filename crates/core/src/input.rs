// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Fyreflow Labs

//! Run-input requests and the preflight planner's output shape.

use serde::{Deserialize, Serialize};

/// The kind of control the editor should render for a requested input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputFieldType {
    Text,
    Multiline,
    Url,
    Secret,
}

/// A single input a pipeline needs before (or during) a run.
///
/// Produced either by the preflight planner's static scan, or parsed from a
/// step's runtime "I need more inputs" output (the runtime input broker).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunInputRequest {
    pub key: String,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: InputFieldType,
    pub required: bool,
    #[serde(default)]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub default_value: Option<String>,
}

/// Pass/warn/fail status of one preflight check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

/// One blocking-or-not check surfaced by the preflight planner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreflightCheck {
    pub id: String,
    pub title: String,
    pub message: String,
    pub status: CheckStatus,
    #[serde(default)]
    pub details: Option<String>,
}

/// The full result of running the preflight planner (C6) against a pipeline
/// and a candidate set of run inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SmartRunPlan {
    pub fields: Vec<RunInputRequest>,
    pub checks: Vec<PreflightCheck>,
}

impl SmartRunPlan {
    /// True when no check (input or otherwise) reports `fail`.
    pub fn is_clean(&self) -> bool {
        !self.checks.iter().any(|c| c.status == CheckStatus::Fail)
    }
}

#[cfg(test)]
#[path = "input_tests.rs"]
mod tests;
