// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! POST /v1/research and GET /health

use super::support::*;
use crate::pipeline::common::*;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{json, Value};

#[tokio::test]
async fn test_health_reports_providers_and_model() {
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, body) = send(two_page_app(), request).await;

    assert_eq!(status, StatusCode::OK);
    let health: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(health["status"], "ok");
    assert_eq!(health["searchProviders"], json!(["stub"]));
    assert_eq!(health["model"], "echo");
}

#[tokio::test]
async fn test_research_returns_summary_and_sources() {
    let request = post_json(
        "/v1/research",
        json!({"query": "greek letters", "requestId": "req-1"}),
    );
    let (status, body) = send(two_page_app(), request).await;

    assert_eq!(status, StatusCode::OK);
    let response: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(response["query"], "greek letters");
    assert_eq!(response["requestId"], "req-1");
    assert_eq!(response["blockCount"], 1);
    assert_eq!(
        response["sources"],
        json!([location(0), location(1)])
    );
    let summary = response["summary"].as_str().unwrap();
    assert!(summary.starts_with("Alpha page text."));
    assert!(summary.contains("Beta page text."));
    assert_eq!(
        response["wordCount"].as_u64().unwrap() as usize,
        summary.split_whitespace().count()
    );
    assert!(response.get("warnings").is_none());
}

#[tokio::test]
async fn test_top_k_limits_sources() {
    let request = post_json("/v1/research", json!({"query": "q", "topK": 1}));
    let (status, body) = send(two_page_app(), request).await;

    assert_eq!(status, StatusCode::OK);
    let response: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(response["sources"], json!([location(0)]));
}

#[tokio::test]
async fn test_empty_query_is_rejected() {
    let request = post_json("/v1/research", json!({"query": "   "}));
    let (status, body) = send(two_page_app(), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(error["errorType"], "validation_error");
    assert_eq!(error["details"]["field"], "query");
}

#[tokio::test]
async fn test_top_k_out_of_range_is_rejected() {
    let request = post_json("/v1/research", json!({"query": "q", "topK": 25}));
    let (status, body) = send(two_page_app(), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(error["details"]["field"], "topK");
}

#[tokio::test]
async fn test_no_extractable_content_is_unprocessable() {
    let app = create_test_app(
        StubSearch::with_results(3),
        StubFetcher::new(),
        EchoCompletion::new(),
    );
    let request = post_json("/v1/research", json!({"query": "q", "requestId": "req-2"}));
    let (status, body) = send(app, request).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let error: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(error["errorType"], "no_content_extracted");
    assert_eq!(error["details"]["attempted"], 3);
    assert_eq!(error["requestId"], "req-2");
}

#[tokio::test]
async fn test_search_outage_is_bad_gateway() {
    let app = create_test_app(StubSearch::failing(), StubFetcher::new(), EchoCompletion::new());
    let request = post_json("/v1/research", json!({"query": "q"}));
    let (status, body) = send(app, request).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    let error: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(error["errorType"], "search_unavailable");
}
