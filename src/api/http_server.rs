// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    extract::State,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::{net::SocketAddr, sync::Arc};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::research::{research_handler, research_stream_handler};
use crate::pipeline::ResearchPipeline;
use crate::progress::BroadcastEventSink;
use crate::version;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ResearchPipeline>,
    /// The broadcast sink the pipeline publishes to; SSE handlers subscribe here
    pub events: Arc<BroadcastEventSink>,
}

impl AppState {
    pub fn new(pipeline: Arc<ResearchPipeline>, events: Arc<BroadcastEventSink>) -> Self {
        Self { pipeline, events }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub search_providers: Vec<String>,
    pub model: String,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_handler))
        // Research endpoints
        .route("/v1/research", post(research_handler))
        .route("/v1/research/stream", post(research_stream_handler))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

pub async fn start_server(state: AppState, addr: SocketAddr) -> anyhow::Result<()> {
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("API server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let status = if state.pipeline.search_providers().is_empty() {
        "degraded"
    } else {
        "ok"
    };
    Json(HealthResponse {
        status: status.to_string(),
        version: version::VERSION_NUMBER.to_string(),
        search_providers: state
            .pipeline
            .search_providers()
            .into_iter()
            .map(str::to_string)
            .collect(),
        model: state.pipeline.model_name().to_string(),
    })
}
