// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Fyreflow Labs

//! Pipeline definition: steps, links, quality gates, runtime caps and schedule.

use crate::id::{GateId, LinkId, PipelineId, StepId};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// A step's role in the pipeline. Purely descriptive — the dispatcher treats
/// every role identically; roles exist for the editor's canvas and for
/// prompt-authoring conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepRole {
    Analysis,
    Planner,
    Orchestrator,
    Executor,
    Tester,
    Review,
}

/// Output contract format a step's provider is asked to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    Markdown,
    Json,
}

/// Provider selector attached to a step: which model, with what hints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderSelector {
    pub provider_id: String,
    pub model: String,
    #[serde(default)]
    pub reasoning_effort: Option<String>,
    #[serde(default)]
    pub fast_mode: bool,
    #[serde(default)]
    pub long_context: bool,
    #[serde(default)]
    pub context_window_tokens: Option<u32>,
}

/// A step's output contract: required JSON fields and required artifact files.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputContract {
    #[serde(default)]
    pub required_fields: Vec<String>,
    #[serde(default)]
    pub required_files: Vec<String>,
}

/// A unit of the graph invoking one provider call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub id: StepId,
    pub name: String,
    pub role: StepRole,
    pub prompt: String,
    pub provider: ProviderSelector,
    /// Context template with `{{task}}`, `{{previous_output}}`,
    /// `{{incoming_outputs}}`, `{{all_outputs}}`, `{{input.<key>}}`,
    /// `{{run_inputs}}` placeholders.
    pub context_template: String,
    #[serde(default)]
    pub delegate: bool,
    #[serde(default = "default_delegation_count")]
    pub delegation_count: u8,
    #[serde(default)]
    pub isolated_storage: bool,
    #[serde(default)]
    pub shared_storage: bool,
    #[serde(default)]
    pub mcp_server_ids: Vec<String>,
    pub output_format: OutputFormat,
    #[serde(default)]
    pub contract: OutputContract,
}

fn default_delegation_count() -> u8 {
    1
}

/// Condition under which a [`Link`] is traversed after a step's gates evaluate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkCondition {
    Always,
    OnPass,
    OnFail,
}

/// A conditional edge between two steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub id: LinkId,
    pub source_step_id: StepId,
    pub target_step_id: StepId,
    pub condition: LinkCondition,
}

/// Sentinel `targetStepId` meaning "applies to every step".
pub const ANY_STEP: &str = "any_step";

/// The kind of check a [`QualityGate`] performs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GateKind {
    RegexMustMatch { pattern: String, flags: String },
    RegexMustNotMatch { pattern: String, flags: String },
    JsonFieldExists { json_path: String },
    ArtifactExists { artifact_path: String },
    ManualApproval,
}

/// A declarative check on a step's output; may be blocking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityGate {
    pub id: GateId,
    pub name: String,
    /// A specific step id, or the sentinel [`ANY_STEP`].
    pub target_step_id: String,
    pub kind: GateKind,
    #[serde(default)]
    pub blocking: bool,
    #[serde(default)]
    pub message: Option<String>,
}

impl QualityGate {
    /// Does this gate apply to the given step id?
    pub fn targets(&self, step_id: &StepId) -> bool {
        self.target_step_id == ANY_STEP || self.target_step_id == step_id.as_str()
    }
}

/// Per-pipeline execution caps enforced by the run state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    pub max_loops: u32,
    pub max_step_executions: u32,
    pub stage_timeout_ms: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_loops: 2,
            max_step_executions: 18,
            stage_timeout_ms: 120_000,
        }
    }
}

impl RuntimeConfig {
    pub fn validate(&self) -> Result<(), PipelineValidationError> {
        if !(0..=12).contains(&self.max_loops) {
            return Err(PipelineValidationError::RuntimeConfig(format!(
                "max_loops {} out of range 0..=12",
                self.max_loops
            )));
        }
        if !(4..=120).contains(&self.max_step_executions) {
            return Err(PipelineValidationError::RuntimeConfig(format!(
                "max_step_executions {} out of range 4..=120",
                self.max_step_executions
            )));
        }
        if !(10_000..=1_200_000).contains(&self.stage_timeout_ms) {
            return Err(PipelineValidationError::RuntimeConfig(format!(
                "stage_timeout_ms {} out of range 10000..=1200000",
                self.stage_timeout_ms
            )));
        }
        Ok(())
    }
}

/// Mode a cron-triggered run starts in: `smart` collects missing inputs first,
/// `quick` skips input collection but still runs non-input preflight checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    Smart,
    Quick,
}

/// A cron trigger attached to a pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub enabled: bool,
    pub cron: String,
    pub timezone: String,
    pub task: String,
    pub run_mode: RunMode,
    #[serde(default)]
    pub inputs: HashMap<String, String>,
}

impl Schedule {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            cron: String::new(),
            timezone: "UTC".to_string(),
            task: String::new(),
            run_mode: RunMode::Quick,
            inputs: HashMap::new(),
        }
    }

    /// A 5-field cron expression (minute hour day-of-month month day-of-week).
    pub fn has_five_fields(&self) -> bool {
        self.cron.split_whitespace().count() == 5
    }
}

/// A persisted pipeline: an ordered set of steps, a set of links, a set of
/// quality gates, runtime caps and an optional schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pipeline {
    pub id: PipelineId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub steps: Vec<Step>,
    #[serde(default)]
    pub links: Vec<Link>,
    #[serde(default)]
    pub gates: Vec<QualityGate>,
    #[serde(default)]
    pub runtime: RuntimeConfig,
    #[serde(default)]
    pub schedule: Option<Schedule>,
    /// Schema version, bumped on breaking persisted-format changes.
    #[serde(default = "default_version")]
    pub version: u32,
}

fn default_version() -> u32 {
    1
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PipelineValidationError {
    #[error("pipeline name must be 2-120 characters, got {0}")]
    NameLength(usize),
    #[error("duplicate step name: {0}")]
    DuplicateStepName(String),
    #[error("link {link_id} references unknown step {step_id}")]
    DanglingLink { link_id: String, step_id: String },
    #[error("link {0} has identical source and target step")]
    SelfLoop(String),
    #[error("gate {gate_id} targets unknown step {step_id}")]
    DanglingGateTarget { gate_id: String, step_id: String },
    #[error("scheduled pipeline must have a 5-field cron expression, got: {0:?}")]
    InvalidCronShape(String),
    #[error("scheduled pipeline must have a non-empty IANA timezone")]
    MissingTimezone,
    #[error("runtime config: {0}")]
    RuntimeConfig(String),
    #[error("delegation_count must be 1-8, got {0} on step {1}")]
    DelegationCountOutOfRange(u8, String),
}

impl Pipeline {
    /// Validate the invariants from the data model: name length, unique step
    /// names, link endpoints referring to real non-identical steps, gate
    /// targets referring to real steps or `any_step`, runtime config bounds,
    /// and schedule shape when enabled.
    ///
    /// This does **not** validate the timezone against a real IANA database —
    /// that requires `chrono-tz` and is done by the store/preflight layer
    /// which actually resolves schedules, keeping this crate free of that
    /// dependency's data tables.
    pub fn validate(&self) -> Result<(), PipelineValidationError> {
        if !(2..=120).contains(&self.name.chars().count()) {
            return Err(PipelineValidationError::NameLength(self.name.chars().count()));
        }

        let mut seen_names = HashSet::new();
        let mut known_ids = HashSet::new();
        for step in &self.steps {
            if !seen_names.insert(step.name.clone()) {
                return Err(PipelineValidationError::DuplicateStepName(step.name.clone()));
            }
            known_ids.insert(step.id.clone());
            if !(1..=8).contains(&step.delegation_count) {
                return Err(PipelineValidationError::DelegationCountOutOfRange(
                    step.delegation_count,
                    step.name.clone(),
                ));
            }
        }

        for link in &self.links {
            if link.source_step_id == link.target_step_id {
                return Err(PipelineValidationError::SelfLoop(link.id.to_string()));
            }
            if !known_ids.contains(&link.source_step_id) {
                return Err(PipelineValidationError::DanglingLink {
                    link_id: link.id.to_string(),
                    step_id: link.source_step_id.to_string(),
                });
            }
            if !known_ids.contains(&link.target_step_id) {
                return Err(PipelineValidationError::DanglingLink {
                    link_id: link.id.to_string(),
                    step_id: link.target_step_id.to_string(),
                });
            }
        }

        for gate in &self.gates {
            if gate.target_step_id != ANY_STEP
                && !known_ids.iter().any(|id| id.as_str() == gate.target_step_id)
            {
                return Err(PipelineValidationError::DanglingGateTarget {
                    gate_id: gate.id.to_string(),
                    step_id: gate.target_step_id.clone(),
                });
            }
        }

        self.runtime.validate()?;

        if let Some(schedule) = &self.schedule {
            if schedule.enabled {
                if !schedule.has_five_fields() {
                    return Err(PipelineValidationError::InvalidCronShape(
                        schedule.cron.clone(),
                    ));
                }
                if schedule.timezone.trim().is_empty() {
                    return Err(PipelineValidationError::MissingTimezone);
                }
            }
        }

        Ok(())
    }

    /// Steps with no inbound link: the entry points for a fresh run, ordered
    /// by their position in `self.steps` (visual-y / insertion order).
    pub fn entry_steps(&self) -> Vec<&Step> {
        let targeted: HashSet<&StepId> = self.links.iter().map(|l| &l.target_step_id).collect();
        self.steps
            .iter()
            .filter(|s| !targeted.contains(&s.id))
            .collect()
    }

    /// Outbound links from a given step, in declaration order.
    pub fn outbound_links(&self, step_id: &StepId) -> Vec<&Link> {
        self.links
            .iter()
            .filter(|l| &l.source_step_id == step_id)
            .collect()
    }

    pub fn find_step(&self, step_id: &StepId) -> Option<&Step> {
        self.steps.iter().find(|s| &s.id == step_id)
    }

    /// Gates that apply to the given step (its own gates plus `any_step` gates).
    pub fn gates_for(&self, step_id: &StepId) -> Vec<&QualityGate> {
        self.gates.iter().filter(|g| g.targets(step_id)).collect()
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
