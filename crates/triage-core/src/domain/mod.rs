//! Domain model: task values, priority math, activation rules, events.

pub mod activation;
pub mod errors;
pub mod events;
pub mod ids;
pub mod priority;
pub mod task;

pub use self::errors::{Result, TriageError};
pub use self::events::DomainEvent;
pub use self::ids::TaskId;
pub use self::priority::{DENSITY_MARGIN, Propagated, density, propagate};
pub use self::task::{DependentSnapshot, NewTask, Task, TaskKind, TaskUpdate};
