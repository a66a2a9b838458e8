//! Repository port: where task state lives.
//!
//! The in-memory implementation ships with this crate; persistent backends
//! (MongoDB, PostgreSQL, ...) belong in their own crates behind this trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Result, Task, TaskId};

/// Storage seam for tasks.
///
/// Design intent:
/// - `save` persists the whole value, dependent snapshots included; the
///   repository never recomputes anything.
/// - The two list scans exist for the activation sweep and the cascade; both
///   read committed state and nothing else.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Fetch a task by id. `NotFound` if it does not exist.
    async fn get(&self, id: TaskId) -> Result<Task>;

    /// Insert or replace the stored value for `task.id`.
    async fn save(&self, task: &Task) -> Result<()>;

    /// Remove a task. Deleting an absent id is a no-op.
    ///
    /// Snapshots other tasks hold of the deleted one are left in place;
    /// repairing them is an explicit unlink, not a storage concern.
    async fn delete(&self, id: TaskId) -> Result<()>;

    /// Tasks still marked inactive whose activation time is at or before
    /// `now` (the activation sweep's work list).
    async fn list_activation_due(&self, now: DateTime<Utc>) -> Result<Vec<Task>>;

    /// Tasks holding a dependent snapshot of `id`, i.e. the prerequisites of
    /// that task. Order is unspecified.
    async fn list_prerequisites_of(&self, id: TaskId) -> Result<Vec<Task>>;
}
