// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod summarize;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::config::PipelineConfig;

/// Fabstir Web Researcher CLI
#[derive(Parser, Debug)]
#[command(name = "fabstir-research-cli")]
#[command(version)]
#[command(about = "Summarize what the web says about a query", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search, read and summarize the web for a query
    Summarize(summarize::SummarizeArgs),

    /// Print the effective configuration (credentials omitted)
    Config(ConfigArgs),
}

/// Arguments for the config command
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// TOML configuration file (defaults to environment variables)
    #[arg(long, env = "RESEARCHER_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Execute CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Summarize(args) => summarize::summarize(args).await,
        Commands::Config(args) => show_config(args),
    }
}

/// Load configuration from a TOML file, or from the environment when no file
/// is given. Credentials missing from the file are read from the environment.
pub fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    let config = match path {
        Some(path) => PipelineConfig::from_toml_file(path)?.with_env_credentials(),
        None => PipelineConfig::from_env(),
    };
    config.validate().context("configuration rejected")?;
    Ok(config)
}

fn show_config(args: ConfigArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    println!("{}", config.to_toml()?);
    println!(
        "# search providers configured: {}",
        if config.search.has_any_provider() { "yes" } else { "no" }
    );
    println!(
        "# completion API key configured: {}",
        if config.llm.api_key.is_some() { "yes" } else { "no" }
    );
    Ok(())
}
