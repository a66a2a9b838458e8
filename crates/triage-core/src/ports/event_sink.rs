//! Event sink port: where domain events go.
//!
//! Operations return their events explicitly and the service hands them here
//! in order. There is no subscription or dispatch layer inside the core; a
//! sink forwarding to a broker or an audit log slots in behind this trait.

use async_trait::async_trait;

use crate::domain::{DomainEvent, Result};

#[async_trait]
pub trait EventSink: Send + Sync {
    /// Publish a batch of events in the order given. An empty batch is fine.
    async fn publish(&self, events: &[DomainEvent]) -> Result<()>;
}
