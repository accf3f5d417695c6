// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Progress events
//!
//! The pipeline publishes stage transitions for each job to an [`EventSink`].
//! Delivery to subscribers (logs, SSE clients, tests) is the sink's concern.

pub mod sinks;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use sinks::{BroadcastEventSink, FanoutEventSink, LoggingEventSink, MemoryEventSink};

/// Pipeline stage an event refers to, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Stage {
    Search,
    Extract,
    Collate,
    Summarize,
    Reduce,
    Done,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Search => "SEARCH",
            Stage::Extract => "EXTRACT",
            Stage::Collate => "COLLATE",
            Stage::Summarize => "SUMMARIZE",
            Stage::Reduce => "REDUCE",
            Stage::Done => "DONE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventStatus {
    Started,
    Completed,
    Failed,
}

/// One stage transition of a job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingEvent {
    pub stage: Stage,
    pub status: EventStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl ProcessingEvent {
    pub fn new(stage: Stage, status: EventStatus, detail: Option<String>) -> Self {
        Self {
            stage,
            status,
            detail,
            timestamp: Utc::now(),
        }
    }

    pub fn started(stage: Stage) -> Self {
        Self::new(stage, EventStatus::Started, None)
    }

    pub fn completed(stage: Stage, detail: impl Into<String>) -> Self {
        Self::new(stage, EventStatus::Completed, Some(detail.into()))
    }

    pub fn failed(stage: Stage, detail: impl Into<String>) -> Self {
        Self::new(stage, EventStatus::Failed, Some(detail.into()))
    }

    /// `DONE` or any `FAILED` event; nothing follows it for the job
    pub fn is_terminal(&self) -> bool {
        self.stage == Stage::Done || self.status == EventStatus::Failed
    }
}

/// Publish interface keyed by job identifier
///
/// Implementations must not block: `emit` is called on the job's critical path.
pub trait EventSink: Send + Sync {
    fn emit(&self, job_id: Uuid, event: ProcessingEvent);
}
