// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Event sink adapters

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use tokio::sync::broadcast;
use tracing::{info, warn};
use uuid::Uuid;

use super::{EventSink, EventStatus, ProcessingEvent};

/// Writes every event to the tracing log
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingEventSink;

impl EventSink for LoggingEventSink {
    fn emit(&self, job_id: Uuid, event: ProcessingEvent) {
        let detail = event.detail.as_deref().unwrap_or("");
        match event.status {
            EventStatus::Failed => warn!(
                %job_id,
                stage = event.stage.as_str(),
                "stage failed: {}",
                detail
            ),
            EventStatus::Started => info!(%job_id, stage = event.stage.as_str(), "stage started"),
            EventStatus::Completed => info!(
                %job_id,
                stage = event.stage.as_str(),
                "stage completed {}",
                detail
            ),
        }
    }
}

/// Keeps every event in memory, in emission order
#[derive(Debug, Default)]
pub struct MemoryEventSink {
    events: Mutex<Vec<(Uuid, ProcessingEvent)>>,
}

impl MemoryEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events recorded for one job
    pub fn events_for(&self, job_id: Uuid) -> Vec<ProcessingEvent> {
        match self.events.lock() {
            Ok(events) => events
                .iter()
                .filter(|(id, _)| *id == job_id)
                .map(|(_, e)| e.clone())
                .collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Every recorded event
    pub fn all(&self) -> Vec<(Uuid, ProcessingEvent)> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

impl EventSink for MemoryEventSink {
    fn emit(&self, job_id: Uuid, event: ProcessingEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push((job_id, event));
        }
    }
}

const JOB_CHANNEL_CAPACITY: usize = 64;

/// Per-job broadcast channels for in-process subscribers
///
/// A job's channel is created by the first `subscribe` and dropped after its
/// terminal event, which ends every receiver once buffered events are read.
/// Events for jobs nobody subscribed to are discarded.
#[derive(Debug, Default)]
pub struct BroadcastEventSink {
    channels: RwLock<HashMap<Uuid, broadcast::Sender<ProcessingEvent>>>,
}

impl BroadcastEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, job_id: Uuid) -> broadcast::Receiver<ProcessingEvent> {
        let mut channels = match self.channels.write() {
            Ok(c) => c,
            Err(poisoned) => poisoned.into_inner(),
        };
        channels
            .entry(job_id)
            .or_insert_with(|| broadcast::channel(JOB_CHANNEL_CAPACITY).0)
            .subscribe()
    }

    /// Drop a job's channel if it is still open.
    ///
    /// Covers jobs that ended without a terminal event, such as a rejected query.
    pub fn close(&self, job_id: Uuid) {
        if let Ok(mut channels) = self.channels.write() {
            channels.remove(&job_id);
        }
    }

    /// Number of jobs with live channels
    pub fn active_jobs(&self) -> usize {
        self.channels.read().map(|c| c.len()).unwrap_or(0)
    }
}

impl EventSink for BroadcastEventSink {
    fn emit(&self, job_id: Uuid, event: ProcessingEvent) {
        let terminal = event.is_terminal();
        if let Ok(channels) = self.channels.read() {
            if let Some(sender) = channels.get(&job_id) {
                // No receivers left is not an error for the job
                let _ = sender.send(event);
            }
        }
        if terminal {
            if let Ok(mut channels) = self.channels.write() {
                channels.remove(&job_id);
            }
        }
    }
}

/// Forwards every event to several sinks in order
#[derive(Default, Clone)]
pub struct FanoutEventSink {
    sinks: Vec<Arc<dyn EventSink>>,
}

impl FanoutEventSink {
    pub fn new(sinks: Vec<Arc<dyn EventSink>>) -> Self {
        Self { sinks }
    }
}

impl EventSink for FanoutEventSink {
    fn emit(&self, job_id: Uuid, event: ProcessingEvent) {
        for sink in &self.sinks {
            sink.emit(job_id, event.clone());
        }
    }
}
