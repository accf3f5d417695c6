// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! POST /v1/research/stream

use super::support::*;
use crate::pipeline::common::*;
use axum::http::{header, StatusCode};
use fabstir_web_researcher::progress::{EventStatus, Stage};
use futures::StreamExt;
use serde_json::{json, Value};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

/// Parse an SSE body into (event name, data) pairs
fn parse_events(body: &str) -> Vec<(String, String)> {
    body.split("\n\n")
        .filter_map(|frame| {
            let mut name = None;
            let mut data = None;
            for line in frame.lines() {
                if let Some(rest) = line.strip_prefix("event:") {
                    name = Some(rest.trim().to_string());
                } else if let Some(rest) = line.strip_prefix("data:") {
                    data = Some(rest.trim().to_string());
                }
            }
            Some((name?, data.unwrap_or_default()))
        })
        .collect()
}

#[tokio::test]
async fn test_stream_emits_progress_then_result() {
    let request = post_json("/v1/research/stream", json!({"query": "greek letters"}));
    let response = two_page_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .get(header::CONTENT_TYPE)
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("text/event-stream"));

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let events = parse_events(&String::from_utf8(bytes.to_vec()).unwrap());

    let progress: Vec<Value> = events
        .iter()
        .filter(|(name, _)| name == "progress")
        .map(|(_, data)| serde_json::from_str(data).unwrap())
        .collect();
    assert_eq!(progress.len(), successful_sequence().len());
    assert_eq!(progress[0]["stage"], "SEARCH");
    assert_eq!(progress[0]["status"], "STARTED");
    assert_eq!(progress[10]["stage"], "DONE");

    let (name, data) = events.last().unwrap();
    assert_eq!(name, "result");
    let result: Value = serde_json::from_str(data).unwrap();
    assert!(result["summary"].as_str().unwrap().contains("Alpha page text."));
}

#[tokio::test]
async fn test_stream_ends_with_error_event() {
    let app = create_test_app(
        StubSearch::with_results(2),
        StubFetcher::new(),
        EchoCompletion::new(),
    );
    let request = post_json("/v1/research/stream", json!({"query": "q"}));
    let (status, body) = send(app, request).await;

    assert_eq!(status, StatusCode::OK);
    let events = parse_events(&body);
    let (name, data) = events.last().unwrap();
    assert_eq!(name, "error");
    assert!(data.contains("no_content_extracted"));

    let progress = events.iter().filter(|(n, _)| n == "progress").count();
    // SEARCH started/completed, EXTRACT started/failed
    assert_eq!(progress, 4);
}

#[tokio::test]
async fn test_stream_rejects_invalid_request_before_streaming() {
    let request = post_json("/v1/research/stream", json!({"query": ""}));
    let (status, body) = send(two_page_app(), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("validation_error"));
}

#[tokio::test]
async fn test_client_disconnect_cancels_job() {
    let fetcher = Arc::new((0..3).fold(StubFetcher::new(), |f, i| {
        f.page(
            location(i),
            Page::Slow(Duration::from_secs(30), "never read".to_string()),
        )
    }));
    let (app, memory) = create_observed_app(
        StubSearch::with_results(3),
        fetcher.clone(),
        Arc::new(EchoCompletion::new()),
    );

    let request = post_json("/v1/research/stream", json!({"query": "slow pages"}));
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Read until extraction is under way, then hang up
    let mut body = response.into_body().into_data_stream();
    let mut seen = String::new();
    while !seen.contains("\"EXTRACT\"") {
        let chunk = tokio::time::timeout(Duration::from_secs(5), body.next())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        seen.push_str(&String::from_utf8_lossy(&chunk));
    }
    drop(body);

    let mut last = None;
    for _ in 0..100 {
        last = memory.all().last().map(|(_, e)| (e.stage, e.status));
        if last.map_or(false, |(_, status)| status == EventStatus::Failed) {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    assert_eq!(last, Some((Stage::Extract, EventStatus::Failed)));
    let detail = memory.all().last().and_then(|(_, e)| e.detail.clone());
    assert_eq!(detail.as_deref(), Some("Job cancelled"));
    assert_eq!(fetcher.completed.load(Ordering::SeqCst), 0);
}
