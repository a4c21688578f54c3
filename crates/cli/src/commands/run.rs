// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Fyreflow Labs

//! `fyreflow run <start|show|list|stop|pause|resume|approve|input>`

use std::collections::HashMap;

use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use fyreflow_core::ShortId;

use crate::client::DaemonClient;
use crate::color;
use crate::output::{format_time_ago, status_str, OutputFormat};
use crate::table::{Column, Table};

#[derive(Args)]
pub struct RunArgs {
    #[command(subcommand)]
    pub command: RunCommand,
}

/// Parse `key=value` pairs from `-i/--input` flags into a map.
fn parse_inputs(raw: &[String]) -> Result<HashMap<String, String>> {
    let mut map = HashMap::new();
    for entry in raw {
        match entry.split_once('=') {
            Some((k, v)) => {
                map.insert(k.to_string(), v.to_string());
            }
            None => bail!("invalid --input '{entry}': expected key=value"),
        }
    }
    Ok(map)
}

#[derive(Subcommand)]
pub enum RunCommand {
    /// Start a run for a pipeline
    Start {
        /// Pipeline id
        pipeline_id: String,
        /// Task description passed to the first steps
        #[arg(long, default_value = "")]
        task: String,
        /// Run input, repeatable: -i key=value
        #[arg(short = 'i', long = "input")]
        inputs: Vec<String>,
        /// Smart run (collects inputs via preflight) instead of quick
        #[arg(long)]
        smart: bool,
    },
    /// Show a single run's status and step history
    Show {
        /// Run id
        id: String,
    },
    /// List recent runs
    List {
        /// Filter to a single pipeline
        #[arg(long)]
        pipeline_id: Option<String>,
        /// Maximum number of runs to return
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Request cancellation of a run
    Stop {
        /// Run id
        id: String,
    },
    /// Pause a running run
    Pause {
        /// Run id
        id: String,
    },
    /// Resume a paused or awaiting-approval run
    Resume {
        /// Run id
        id: String,
    },
    /// Resolve a manual-approval gate
    Approve {
        /// Run id
        run_id: String,
        /// Approval id
        approval_id: String,
        /// Reject instead of approve
        #[arg(long)]
        reject: bool,
        /// Optional note attached to the decision
        #[arg(long)]
        note: Option<String>,
    },
    /// Submit runtime-requested inputs for a paused run
    Input {
        /// Run id
        id: String,
        /// Input value, repeatable: -i key=value
        #[arg(short = 'i', long = "input")]
        inputs: Vec<String>,
    },
}

pub async fn run(client: &DaemonClient, args: RunArgs, format: OutputFormat) -> Result<()> {
    match args.command {
        RunCommand::Start {
            pipeline_id,
            task,
            inputs,
            smart,
        } => start(client, &pipeline_id, task, parse_inputs(&inputs)?, smart, format).await,
        RunCommand::Show { id } => show(client, &id, format).await,
        RunCommand::List { pipeline_id, limit } => list(client, pipeline_id.as_deref(), limit, format).await,
        RunCommand::Stop { id } => {
            client.stop_run(&id).await?;
            println!("stop requested for {id}");
            Ok(())
        }
        RunCommand::Pause { id } => {
            client.pause_run(&id).await?;
            println!("pause requested for {id}");
            Ok(())
        }
        RunCommand::Resume { id } => {
            client.resume_run(&id).await?;
            println!("resume requested for {id}");
            Ok(())
        }
        RunCommand::Approve {
            run_id,
            approval_id,
            reject,
            note,
        } => {
            client.resolve_approval(&run_id, &approval_id, !reject, note).await?;
            println!("{} {approval_id}", if reject { "rejected" } else { "approved" });
            Ok(())
        }
        RunCommand::Input { id, inputs } => {
            client.submit_inputs(&id, parse_inputs(&inputs)?).await?;
            println!("inputs submitted for {id}");
            Ok(())
        }
    }
}

async fn start(
    client: &DaemonClient,
    pipeline_id: &str,
    task: String,
    inputs: HashMap<String, String>,
    smart: bool,
    format: OutputFormat,
) -> Result<()> {
    if smart {
        let plan = client.smart_run_plan(pipeline_id, &inputs).await?;
        let failing = plan
            .get("checks")
            .and_then(|v| v.as_array())
            .map(|checks| {
                checks
                    .iter()
                    .filter(|c| c.get("status").and_then(|s| s.as_str()) == Some("fail"))
                    .count()
            })
            .unwrap_or(0);
        if failing > 0 {
            eprintln!("warning: {failing} preflight check(s) failing; starting anyway");
        }
    }
    let run_mode = if smart { "smart" } else { "quick" };
    let created = client.start_run(pipeline_id, task, inputs, run_mode).await?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&created)?),
        OutputFormat::Text => println!("started run {} ({})", created.id.as_str(), status_str(&created.status)),
    }
    Ok(())
}

async fn show(client: &DaemonClient, id: &str, format: OutputFormat) -> Result<()> {
    let run = client.get_run(id).await?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&run)?),
        OutputFormat::Text => {
            println!(
                "{}  pipeline={}  status={}",
                run.id.as_str(),
                run.pipeline_id.as_str(),
                color::status(&status_str(&run.status))
            );
            println!("  task: {}", run.task);
            println!("  steps:");
            for step in &run.steps {
                println!(
                    "    - {} [{:?}] attempts={} outcome={:?}",
                    step.step_name, step.status, step.attempts, step.workflow_outcome
                );
                for gate in &step.quality_gate_results {
                    println!("        gate {}: {:?} ({})", gate.gate_name, gate.status, gate.message);
                }
            }
            if !run.approvals.is_empty() {
                println!("  approvals:");
                for approval in &run.approvals {
                    println!("    - {} [{:?}] {}", approval.id.as_str(), approval.status, approval.message);
                }
            }
        }
    }
    Ok(())
}

async fn list(client: &DaemonClient, pipeline_id: Option<&str>, limit: usize, format: OutputFormat) -> Result<()> {
    let runs = client.list_runs(pipeline_id, Some(limit)).await?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&runs)?),
        OutputFormat::Text => {
            let mut table = Table::new(vec![
                Column::left("ID"),
                Column::left("PIPELINE"),
                Column::status("STATUS"),
                Column::muted("STARTED"),
            ]);
            for r in &runs {
                table.row(vec![
                    r.id.as_str().short(12).to_string(),
                    r.pipeline_id.as_str().to_string(),
                    status_str(&r.status),
                    format_time_ago(r.started_at_ms),
                ]);
            }
            table.render(&mut std::io::stdout());
            if runs.is_empty() {
                eprintln!("No runs found");
            }
        }
    }
    Ok(())
}
