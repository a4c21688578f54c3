// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Fyreflow Labs

//! Stable error codes shared across crates, and the
//! `{code, message}` shape every API error maps to.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable machine-readable error codes. Never renamed once shipped — the
/// editor and the cron scheduler both branch on these strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    ValidationError,
    ProviderUnauthenticated,
    ProviderTimeout,
    ProviderError,
    GateBlockingFailed,
    LoopExhausted,
    LimitExhausted,
    Cancelled,
    ScheduleSkipped,
    SecretsUnavailable,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::ValidationError => "validation_error",
            ErrorCode::ProviderUnauthenticated => "provider_unauthenticated",
            ErrorCode::ProviderTimeout => "provider_timeout",
            ErrorCode::ProviderError => "provider_error",
            ErrorCode::GateBlockingFailed => "gate_blocking_failed",
            ErrorCode::LoopExhausted => "loop_exhausted",
            ErrorCode::LimitExhausted => "limit_exhausted",
            ErrorCode::Cancelled => "cancelled",
            ErrorCode::ScheduleSkipped => "schedule_skipped",
            ErrorCode::SecretsUnavailable => "secrets_unavailable",
        };
        write!(f, "{s}")
    }
}

/// The `{code, message}` shape every API error response carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
