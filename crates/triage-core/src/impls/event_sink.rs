//! Event sink implementations: discard, or record for inspection.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{DomainEvent, Result};
use crate::ports::EventSink;

/// Default sink: events are dropped. Event delivery is an optional concern;
/// the engine behaves the same without an observer.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEventSink;

#[async_trait]
impl EventSink for NoopEventSink {
    async fn publish(&self, _events: &[DomainEvent]) -> Result<()> {
        Ok(())
    }
}

/// Keeps every published event, in publish order. Used by tests and the demo
/// binary to observe what an operation emitted.
#[derive(Debug, Default)]
pub struct RecordingEventSink {
    events: Arc<Mutex<Vec<DomainEvent>>>,
}

impl RecordingEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn recorded(&self) -> Vec<DomainEvent> {
        self.events.lock().await.clone()
    }

    pub async fn clear(&self) {
        self.events.lock().await.clear();
    }
}

#[async_trait]
impl EventSink for RecordingEventSink {
    async fn publish(&self, events: &[DomainEvent]) -> Result<()> {
        let mut recorded = self.events.lock().await;
        recorded.extend_from_slice(events);
        Ok(())
    }
}
