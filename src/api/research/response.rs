// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Research API response types

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::pipeline::{JobWarning, ResearchReport};

/// Response body for POST /v1/research and the SSE `result` event
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchResponse {
    pub job_id: Uuid,
    pub query: String,
    pub summary: String,
    pub word_count: usize,
    /// Locations the summary was built from, in rank order
    pub sources: Vec<String>,
    pub block_count: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<JobWarning>,
    pub elapsed_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl ResearchResponse {
    pub fn from_report(report: ResearchReport, request_id: Option<String>) -> Self {
        Self {
            job_id: report.job_id,
            query: report.query,
            summary: report.summary.text,
            word_count: report.summary.word_count,
            sources: report
                .documents
                .iter()
                .map(|d| d.location.to_string())
                .collect(),
            block_count: report.blocks.len(),
            warnings: report.warnings,
            elapsed_ms: report.elapsed_ms,
            request_id,
        }
    }
}
