// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{anyhow, Result};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

use super::load_config;
use crate::pipeline::ResearchPipeline;
use crate::progress::{EventSink, EventStatus, FanoutEventSink, LoggingEventSink, ProcessingEvent};

/// Arguments for the summarize command
#[derive(Args, Debug)]
pub struct SummarizeArgs {
    /// Free-text query to research
    #[arg(long, short)]
    pub query: String,

    /// Number of search results to read
    #[arg(long)]
    pub top_k: Option<usize>,

    /// TOML configuration file (defaults to environment variables)
    #[arg(long, env = "RESEARCHER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Print the full report as JSON instead of the summary text
    #[arg(long)]
    pub json: bool,

    /// Do not print progress lines
    #[arg(long)]
    pub quiet: bool,
}

/// Writes one progress line per event to stderr
struct StderrProgress;

impl EventSink for StderrProgress {
    fn emit(&self, _job_id: Uuid, event: ProcessingEvent) {
        let marker = match event.status {
            EventStatus::Started => "…",
            EventStatus::Completed => "✓",
            EventStatus::Failed => "✗",
        };
        match event.detail {
            Some(detail) => eprintln!("{} {:<9} {}", marker, event.stage.as_str(), detail),
            None => eprintln!("{} {}", marker, event.stage.as_str()),
        }
    }
}

/// Run one research job and print its summary
pub async fn summarize(args: SummarizeArgs) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(top_k) = args.top_k {
        if top_k == 0 {
            return Err(anyhow!("--top-k must be at least 1"));
        }
        config.search.top_k = top_k;
    }
    if !config.search.has_any_provider() {
        warn!("No search API key configured (BRAVE_API_KEY or BING_API_KEY)");
    }

    let mut sinks: Vec<Arc<dyn EventSink>> = vec![Arc::new(LoggingEventSink)];
    if !args.quiet {
        sinks.push(Arc::new(StderrProgress));
    }
    let pipeline = ResearchPipeline::from_config(config, Arc::new(FanoutEventSink::new(sinks)))?;

    // Ctrl-C cancels the job instead of killing in-flight requests mid-write
    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_signal.cancel();
        }
    });

    let report = pipeline.run_job_with_cancel(&args.query, cancel).await?;
    info!(
        "Summary of {} words from {} documents",
        report.summary.word_count,
        report.documents.len()
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}", report.summary.text);
    println!();
    println!("Sources:");
    for document in &report.documents {
        println!("  - {}", document.location);
    }
    for warning in &report.warnings {
        eprintln!("warning: {:?}", warning);
    }
    Ok(())
}
