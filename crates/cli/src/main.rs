// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Fyreflow Labs

//! fyreflow - CLI for the Fyreflow run execution daemon
//!
//! A thin `reqwest` client over `fyreflowd`'s HTTP/JSON API (spec §6); no
//! orchestration logic lives here. Gives operators a terminal path to
//! pipeline/run operations without the out-of-scope canvas editor.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod client;
mod color;
mod commands;
mod env;
mod output;
mod table;

use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};

use client::DaemonClient;
use commands::{pipeline, run as run_cmd, secrets};
use output::OutputFormat;

#[derive(Parser)]
#[command(
    name = "fyreflow",
    version,
    about = "Fyreflow - run scheduler, quality gates and secrets vault for multi-agent pipelines"
)]
struct Cli {
    /// Output format
    #[arg(short = 'o', long = "output", value_enum, default_value_t, global = true)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run lifecycle: start, show, list, stop, pause, resume, approve, input
    Run(run_cmd::RunArgs),
    /// Pipeline catalog: list, show, delete
    Pipeline(pipeline::PipelineArgs),
    /// Secure (per-pipeline) inputs: set, forget
    Secrets(secrets::SecretsArgs),
}

#[tokio::main]
async fn main() {
    let command = Cli::command().styles(color::styles());
    let matches = command.get_matches();
    let cli = match Cli::from_arg_matches(&matches) {
        Ok(cli) => cli,
        Err(err) => err.exit(),
    };
    let client = DaemonClient::new(env::base_url(), env::http_timeout());

    let result = match cli.command {
        Commands::Run(args) => run_cmd::run(&client, args, cli.output).await,
        Commands::Pipeline(args) => pipeline::run(&client, args, cli.output).await,
        Commands::Secrets(args) => secrets::run(&client, args).await,
    };

    if let Err(err) = result {
        print_error(&err);
        std::process::exit(1);
    }
}

fn print_error(err: &anyhow::Error) {
    if color::should_colorize() {
        eprintln!("\x1b[31merror:\x1b[0m {err}");
    } else {
        eprintln!("error: {err}");
    }
}
