// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use fabstir_web_researcher::{
    api::{start_server, AppState},
    config::PipelineConfig,
    pipeline::ResearchPipeline,
    progress::{BroadcastEventSink, EventSink, FanoutEventSink, LoggingEventSink},
    version,
};
use std::{env, net::SocketAddr, sync::Arc};
use tokio::signal;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber for logging
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    println!("🚀 Starting Fabstir Web Researcher...\n");
    println!("📦 BUILD VERSION: {}", version::VERSION);
    println!("📅 Build Date: {}", version::BUILD_DATE);
    println!();

    let config = match env::var("RESEARCHER_CONFIG") {
        Ok(path) => PipelineConfig::from_toml_file(&path)?.with_env_credentials(),
        Err(_) => PipelineConfig::from_env(),
    };
    config.validate()?;

    let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let api_port = env::var("API_PORT").unwrap_or_else(|_| "8080".to_string());
    let addr: SocketAddr = format!("{}:{}", api_host, api_port).parse()?;

    if !config.search.has_any_provider() {
        println!("⚠️  No search API key configured; research jobs will fail at SEARCH");
    }
    if config.llm.api_key.is_none() {
        println!("⚠️  OPENAI_API_KEY not set; completion requests are sent unauthenticated");
    }

    let events = Arc::new(BroadcastEventSink::new());
    let sinks: Vec<Arc<dyn EventSink>> = vec![Arc::new(LoggingEventSink), events.clone()];
    let pipeline = Arc::new(ResearchPipeline::from_config(
        config,
        Arc::new(FanoutEventSink::new(sinks)),
    )?);

    println!(
        "🔎 Search providers: {}",
        pipeline.search_providers().join(", ")
    );
    println!("🧠 Completion model: {}", pipeline.model_name());

    let server = tokio::spawn(start_server(AppState::new(pipeline, events), addr));
    println!("✅ Listening on http://{}\n", addr);

    // Wait for shutdown signal or server exit
    tokio::select! {
        result = server => {
            result??;
        }
        _ = signal::ctrl_c() => {
            println!("\n⏹️  Shutting down...");
        }
    }

    Ok(())
}
