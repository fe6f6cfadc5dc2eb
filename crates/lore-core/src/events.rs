//! Pipeline progress events and cooperative cancellation.
//!
//! The pipeline publishes stage transitions on a broadcast channel so
//! consumers (CLI progress output, future UIs) can subscribe
//! independently. Slow receivers that fall behind receive a `Lagged`
//! error and miss events; freshness matters more than completeness for
//! a progress stream.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::broadcast;

// ============================================================================
// Stages and events
// ============================================================================

/// The four sequential pipeline stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Extract,
    Summarize,
    Write,
    Record,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Extract => "extract",
            PipelineStage::Summarize => "summarize",
            PipelineStage::Write => "write",
            PipelineStage::Record => "record",
        }
    }
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A pipeline progress event. Serialized with a `type` tag, e.g.
/// `{"type":"StageStarted","stage":"extract"}`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum PipelineEvent {
    /// A stage began.
    StageStarted { stage: PipelineStage },
    /// A stage finished successfully.
    StageCompleted { stage: PipelineStage },
    /// The whole run finished; the note is on disk and recorded.
    Completed {
        note_path: String,
        content_id: i64,
        title: String,
    },
    /// The run failed or was cancelled at the given stage.
    Failed {
        stage: PipelineStage,
        error: String,
    },
}

// ============================================================================
// Event bus
// ============================================================================

/// Broadcast-based bus distributing pipeline events to any number of
/// subscribers. Emitting with no subscribers is a silent no-op.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<PipelineEvent>,
}

impl EventBus {
    /// Create a bus with the given buffer capacity (32 is plenty for a
    /// four-stage pipeline).
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Emit an event to all subscribers.
    pub fn emit(&self, event: PipelineEvent) {
        tracing::debug!(
            subscriber_count = self.tx.receiver_count(),
            event = ?event,
            "Pipeline event"
        );
        let _ = self.tx.send(event);
    }

    /// Subscribe to events. Each subscriber gets its own stream.
    pub fn subscribe(&self) -> broadcast::Receiver<PipelineEvent> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(32)
    }
}

// ============================================================================
// Cancellation
// ============================================================================

/// Shared advisory cancellation flag.
///
/// The pipeline checks it between stages only; a stage already in
/// flight runs to completion. Cloning shares the underlying flag.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag {
    cancelled: Arc<AtomicBool>,
}

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Takes effect at the next stage boundary.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
