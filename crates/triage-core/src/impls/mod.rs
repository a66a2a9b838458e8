//! Port implementations shipped with the crate (development and test grade).
//!
//! Production-grade backends (a MongoDB or PostgreSQL repository, a broker
//! sink) belong in their own crates; these keep the engine runnable without
//! external services.

pub mod clock;
pub mod event_sink;
pub mod memory_repository;

pub use self::clock::{FixedClock, SystemClock};
pub use self::event_sink::{NoopEventSink, RecordingEventSink};
pub use self::memory_repository::InMemoryTaskRepository;
