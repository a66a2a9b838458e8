//! Ports: the seams between the engine and the outside world.
//!
//! Storage, time, and event delivery are all injected. The application layer
//! is generic over these traits, so swapping a backend never touches the
//! domain.

pub mod clock;
pub mod event_sink;
pub mod repository;

pub use self::clock::Clock;
pub use self::event_sink::EventSink;
pub use self::repository::TaskRepository;
