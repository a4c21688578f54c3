// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Fyreflow Labs

//! `fyreflow pipeline <list|show|delete>`

use anyhow::Result;
use clap::{Args, Subcommand};

use crate::client::DaemonClient;
use crate::output::OutputFormat;
use crate::table::{Column, Table};

#[derive(Args)]
pub struct PipelineArgs {
    #[command(subcommand)]
    pub command: PipelineCommand,
}

#[derive(Subcommand)]
pub enum PipelineCommand {
    /// List pipelines known to the daemon
    List,
    /// Show a single pipeline's full definition
    Show {
        /// Pipeline id
        id: String,
    },
    /// Delete a pipeline (refused if a run is still active for it)
    Delete {
        /// Pipeline id
        id: String,
    },
}

pub async fn run(client: &DaemonClient, args: PipelineArgs, format: OutputFormat) -> Result<()> {
    match args.command {
        PipelineCommand::List => list(client, format).await,
        PipelineCommand::Show { id } => show(client, &id, format).await,
        PipelineCommand::Delete { id } => delete(client, &id).await,
    }
}

async fn list(client: &DaemonClient, format: OutputFormat) -> Result<()> {
    let pipelines = client.list_pipelines().await?;
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&pipelines)?);
        }
        OutputFormat::Text => {
            let mut table = Table::new(vec![
                Column::left("ID"),
                Column::left("NAME"),
                Column::muted("STEPS"),
                Column::muted("SCHEDULE"),
            ]);
            for p in &pipelines {
                let schedule = match &p.schedule {
                    Some(s) if s.enabled => s.cron.clone(),
                    _ => "-".to_string(),
                };
                table.row(vec![
                    p.id.as_str().to_string(),
                    p.name.clone(),
                    p.steps.len().to_string(),
                    schedule,
                ]);
            }
            table.render(&mut std::io::stdout());
            if pipelines.is_empty() {
                eprintln!("No pipelines found");
            }
        }
    }
    Ok(())
}

async fn show(client: &DaemonClient, id: &str, format: OutputFormat) -> Result<()> {
    let pipeline = client.get_pipeline(id).await?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&pipeline)?),
        OutputFormat::Text => {
            println!("{}  {}", pipeline.id.as_str(), pipeline.name);
            if !pipeline.description.is_empty() {
                println!("  {}", pipeline.description);
            }
            println!("  steps:");
            for step in &pipeline.steps {
                println!(
                    "    - {} ({:?})  provider={} model={}",
                    step.name, step.role, step.provider.provider_id, step.provider.model
                );
            }
            println!("  links:");
            for link in &pipeline.links {
                println!(
                    "    - {} -> {} [{:?}]",
                    link.source_step_id.as_str(),
                    link.target_step_id.as_str(),
                    link.condition
                );
            }
            println!("  gates:");
            for gate in &pipeline.gates {
                println!(
                    "    - {} on {} [{:?}] blocking={}",
                    gate.name,
                    gate.target_step_id,
                    gate.kind,
                    gate.blocking
                );
            }
        }
    }
    Ok(())
}

async fn delete(client: &DaemonClient, id: &str) -> Result<()> {
    client.delete_pipeline(id).await?;
    println!("deleted {id}");
    Ok(())
}
