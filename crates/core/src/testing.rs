// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Fyreflow Labs

//! Test builders for pipelines/steps/links/gates, gated behind the
//! `test-support` feature so downstream crates' tests don't hand-roll the
//! same verbose struct literals for every fixture.

use crate::id::{GateId, LinkId, PipelineId, StepId};
use crate::pipeline::{
    GateKind, Link, LinkCondition, OutputContract, OutputFormat, Pipeline, ProviderSelector,
    QualityGate, RuntimeConfig, Step, StepRole,
};

/// Builds a [`Step`] with sane defaults, overridden field-by-field.
pub struct StepBuilder {
    step: Step,
}

impl StepBuilder {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            step: Step {
                id: StepId::new(id),
                name: name.to_string(),
                role: StepRole::Analysis,
                prompt: format!("Do the {name} task: {{{{task}}}}"),
                provider: ProviderSelector {
                    provider_id: "anthropic".to_string(),
                    model: "claude".to_string(),
                    reasoning_effort: None,
                    fast_mode: false,
                    long_context: false,
                    context_window_tokens: None,
                },
                context_template: "{{task}}\n{{previous_output}}".to_string(),
                delegate: false,
                delegation_count: 1,
                isolated_storage: false,
                shared_storage: false,
                mcp_server_ids: Vec::new(),
                output_format: OutputFormat::Markdown,
                contract: OutputContract::default(),
            },
        }
    }

    pub fn role(mut self, role: StepRole) -> Self {
        self.step.role = role;
        self
    }

    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.step.prompt = prompt.into();
        self
    }

    pub fn context_template(mut self, template: impl Into<String>) -> Self {
        self.step.context_template = template.into();
        self
    }

    pub fn output_format(mut self, format: OutputFormat) -> Self {
        self.step.output_format = format;
        self
    }

    pub fn build(self) -> Step {
        self.step
    }
}

pub fn step(id: &str, name: &str) -> Step {
    StepBuilder::new(id, name).build()
}

pub fn link(id: &str, source: &str, target: &str, condition: LinkCondition) -> Link {
    Link {
        id: LinkId::new(id),
        source_step_id: StepId::new(source),
        target_step_id: StepId::new(target),
        condition,
    }
}

pub fn regex_gate(id: &str, target_step_id: &str, pattern: &str, blocking: bool) -> QualityGate {
    QualityGate {
        id: GateId::new(id),
        name: format!("{id} gate"),
        target_step_id: target_step_id.to_string(),
        kind: GateKind::RegexMustMatch {
            pattern: pattern.to_string(),
            flags: String::new(),
        },
        blocking,
        message: None,
    }
}

pub fn manual_approval_gate(id: &str, target_step_id: &str) -> QualityGate {
    QualityGate {
        id: GateId::new(id),
        name: format!("{id} approval"),
        target_step_id: target_step_id.to_string(),
        kind: GateKind::ManualApproval,
        blocking: true,
        message: None,
    }
}

/// Builds a [`Pipeline`] with sane defaults, overridden field-by-field.
pub struct PipelineBuilder {
    pipeline: Pipeline,
}

impl PipelineBuilder {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            pipeline: Pipeline {
                id: PipelineId::new(id),
                name: name.to_string(),
                description: String::new(),
                steps: Vec::new(),
                links: Vec::new(),
                gates: Vec::new(),
                runtime: RuntimeConfig::default(),
                schedule: None,
                version: 1,
            },
        }
    }

    pub fn steps(mut self, steps: Vec<Step>) -> Self {
        self.pipeline.steps = steps;
        self
    }

    pub fn links(mut self, links: Vec<Link>) -> Self {
        self.pipeline.links = links;
        self
    }

    pub fn gates(mut self, gates: Vec<QualityGate>) -> Self {
        self.pipeline.gates = gates;
        self
    }

    pub fn runtime(mut self, runtime: RuntimeConfig) -> Self {
        self.pipeline.runtime = runtime;
        self
    }

    pub fn build(self) -> Pipeline {
        self.pipeline
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_builder_produces_valid_step() {
        let s = StepBuilder::new("s1", "Analyze").role(StepRole::Analysis).build();
        assert_eq!(s.id.as_str(), "s1");
        assert_eq!(s.name, "Analyze");
    }

    #[test]
    fn pipeline_builder_assembles_full_pipeline() {
        let p = PipelineBuilder::new("p1", "Test Pipeline")
            .steps(vec![step("a", "A"), step("b", "B")])
            .links(vec![link("l1", "a", "b", LinkCondition::Always)])
            .build();
        assert!(p.validate().is_ok());
    }
}
