//! CLI for the fanfetch scheduler.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use fanfetch_core::config::{self, FanfetchConfig};
use std::path::{Path, PathBuf};

use commands::{run_config_path, run_endpoints, run_fetch, run_sources};

/// Top-level CLI for fanfetch.
#[derive(Debug, Parser)]
#[command(name = "fanfetch")]
#[command(about = "fanfetch: fetch many sources at once, failing over across endpoints", long_about = None)]
pub struct Cli {
    /// Read configuration from PATH instead of ~/.config/fanfetch/config.toml.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Fetch every configured source and print a per-source summary.
    Run {
        /// Identifier to look for in each dataset (repeatable).
        #[arg(long = "check", value_name = "CODE", default_values = ["BCC", "BCH"])]
        checks: Vec<String>,
        /// Fetch only the source with this id (repeatable).
        #[arg(long = "only", value_name = "ID")]
        only: Vec<String>,
        /// Print the report as JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// List the endpoint pool in failover order.
    Endpoints,

    /// List configured sources.
    Sources,

    /// Print the configuration file path.
    ConfigPath,
}

fn load_config(path: Option<&Path>) -> Result<FanfetchConfig> {
    let cfg = match path {
        Some(p) => config::load_from_path(p)?,
        None => config::load_or_init()?,
    };
    tracing::debug!(
        sources = cfg.sources.len(),
        endpoints = cfg.endpoints.len(),
        credentials = cfg.credentials.len(),
        "loaded config"
    );
    Ok(cfg)
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        match cli.command {
            CliCommand::ConfigPath => run_config_path(cli.config.as_deref())?,
            CliCommand::Endpoints => {
                let cfg = load_config(cli.config.as_deref())?;
                run_endpoints(&cfg)?;
            }
            CliCommand::Sources => {
                let cfg = load_config(cli.config.as_deref())?;
                run_sources(&cfg)?;
            }
            CliCommand::Run { checks, only, json } => {
                let cfg = load_config(cli.config.as_deref())?;
                run_fetch(&cfg, &checks, &only, json).await?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
