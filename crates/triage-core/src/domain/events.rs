//! Domain events emitted by task operations.
//!
//! Events are returned alongside the new task value (see `TaskUpdate`) and
//! handed to the caller; nothing in the domain dispatches them implicitly.

use serde::{Deserialize, Serialize};

use super::ids::TaskId;

/// Something observable happened to a task.
///
/// The set is closed: creation, plus the two activation transitions. A
/// recompute that does not flip `is_active` emits nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum DomainEvent {
    TaskCreated { id: TaskId },
    TaskActivated { id: TaskId },
    TaskDeactivated { id: TaskId },
}

impl DomainEvent {
    pub fn task_id(&self) -> TaskId {
        match self {
            Self::TaskCreated { id } | Self::TaskActivated { id } | Self::TaskDeactivated { id } => {
                *id
            }
        }
    }

    /// Activation transitions are what trigger cascading recomputation of
    /// prerequisite tasks; creation does not.
    pub fn changes_activation(&self) -> bool {
        matches!(
            self,
            Self::TaskActivated { .. } | Self::TaskDeactivated { .. }
        )
    }
}
