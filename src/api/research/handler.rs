// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Research API endpoint handlers

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::stream::{self, Stream, StreamExt};
use std::convert::Infallible;
use tokio::sync::oneshot;
use tokio_stream::wrappers::BroadcastStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::request::ResearchRequest;
use super::response::ResearchResponse;
use crate::api::errors::{ApiError, ApiErrorResponse};
use crate::api::http_server::AppState;
use crate::pipeline::{JobError, ResearchReport};
use crate::progress::ProcessingEvent;

/// POST /v1/research - Run a research job and return its summary
///
/// # Errors
/// - 400 Bad Request: invalid query or topK
/// - 422 Unprocessable Entity: no document yielded text
/// - 502 Bad Gateway: search or summarization upstream failed
pub async fn research_handler(
    State(state): State<AppState>,
    Json(request): Json<ResearchRequest>,
) -> Result<Json<ResearchResponse>, ApiErrorResponse> {
    debug!("Research request: {:?}", request.query);

    if let Err(e) = request.validate() {
        warn!("Research validation failed: {}", e);
        return Err(ApiErrorResponse::new(e, request.request_id));
    }

    let config = request.job_config(&state.pipeline.config());
    let job_id = Uuid::new_v4();
    let report = state
        .pipeline
        .run_job_with(job_id, &request.query, config, CancellationToken::new())
        .await
        .map_err(|e| ApiErrorResponse::new(e, request.request_id.clone()))?;

    info!(
        %job_id,
        "Research complete: {} words from {} sources in {}ms",
        report.summary.word_count,
        report.documents.len(),
        report.elapsed_ms
    );

    Ok(Json(ResearchResponse::from_report(report, request.request_id)))
}

/// POST /v1/research/stream - Run a research job, streaming progress over SSE
///
/// Emits one `progress` event per stage transition, then a single `result`
/// or `error` event. Closing the connection cancels the job.
pub async fn research_stream_handler(
    State(state): State<AppState>,
    Json(request): Json<ResearchRequest>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiErrorResponse> {
    if let Err(e) = request.validate() {
        warn!("Research validation failed: {}", e);
        return Err(ApiErrorResponse::new(e, request.request_id));
    }

    let job_id = Uuid::new_v4();
    // Subscribe before the job starts so no event is missed
    let progress = BroadcastStream::new(state.events.subscribe(job_id));
    let (result_tx, result_rx) = oneshot::channel();
    let cancel = CancellationToken::new();

    let pipeline = state.pipeline.clone();
    let events = state.events.clone();
    let config = request.job_config(&pipeline.config());
    let query = request.query.clone();
    let job_cancel = cancel.clone();
    tokio::spawn(async move {
        let outcome = pipeline
            .run_job_with(job_id, &query, config, job_cancel)
            .await;
        events.close(job_id);
        let _ = result_tx.send(outcome);
    });
    info!(%job_id, "Streaming research job started");

    let request_id = request.request_id;
    let progress = progress
        .filter_map(|item| async move { item.ok() })
        .map(|event| progress_event(&event));
    let result = stream::once(async move {
        match result_rx.await {
            Ok(Ok(report)) => result_event(report, request_id),
            Ok(Err(e)) => error_event(ApiError::Job(e), request_id),
            Err(_) => error_event(ApiError::Job(JobError::Cancelled), request_id),
        }
    });

    // Dropping the stream (client gone) cancels the job
    let guard = cancel.drop_guard();
    let stream = progress.chain(result).map(move |event| {
        let _ = &guard;
        Ok::<_, Infallible>(event)
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

fn progress_event(event: &ProcessingEvent) -> Event {
    Event::default()
        .event("progress")
        .json_data(event)
        .unwrap_or_else(|_| Event::default().event("progress"))
}

fn result_event(report: ResearchReport, request_id: Option<String>) -> Event {
    let response = ResearchResponse::from_report(report, request_id);
    Event::default()
        .event("result")
        .json_data(&response)
        .unwrap_or_else(|e| {
            error_event(ApiError::InternalError(e.to_string()), response.request_id)
        })
}

fn error_event(error: ApiError, request_id: Option<String>) -> Event {
    let body = error.to_response(request_id);
    Event::default()
        .event("error")
        .json_data(&body)
        .unwrap_or_else(|_| Event::default().event("error").data(error.to_string()))
}
