// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Fyreflow Labs

//! `fyreflow secrets <set|forget>` — wraps `PUT`/`DELETE .../secure-inputs`.
//! Values never round-trip back through this surface in plaintext.

use std::collections::HashMap;

use anyhow::{bail, Result};
use clap::{Args, Subcommand};

use crate::client::DaemonClient;

#[derive(Args)]
pub struct SecretsArgs {
    #[command(subcommand)]
    pub command: SecretsCommand,
}

#[derive(Subcommand)]
pub enum SecretsCommand {
    /// Write secure inputs for a pipeline
    Set {
        /// Pipeline id
        pipeline_id: String,
        /// key=value, repeatable
        #[arg(short = 'i', long = "input")]
        values: Vec<String>,
    },
    /// Forget secure inputs for a pipeline
    Forget {
        /// Pipeline id
        pipeline_id: String,
        /// Keys to forget
        keys: Vec<String>,
    },
}

pub async fn run(client: &DaemonClient, args: SecretsArgs) -> Result<()> {
    match args.command {
        SecretsCommand::Set { pipeline_id, values } => {
            let mut map = HashMap::new();
            for entry in &values {
                match entry.split_once('=') {
                    Some((k, v)) => {
                        map.insert(k.to_string(), v.to_string());
                    }
                    None => bail!("invalid --input '{entry}': expected key=value"),
                }
            }
            client.save_secure_inputs(&pipeline_id, &map).await?;
            println!("saved {} secure input(s) for {pipeline_id}", map.len());
            Ok(())
        }
        SecretsCommand::Forget { pipeline_id, keys } => {
            let n = keys.len();
            client.forget_secure_inputs(&pipeline_id, keys).await?;
            println!("forgot {n} secure input(s) for {pipeline_id}");
            Ok(())
        }
    }
}
