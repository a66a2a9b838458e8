//! Cascading recomputation: push an activation change up through the
//! prerequisite chain.
//!
//! Protocol, breadth-first from the changed task:
//! - Every task holding a snapshot of the changed one is refreshed against
//!   current repository state.
//! - A parent whose value changed is saved, its events published, and its own
//!   prerequisites visited in turn; an unchanged parent ends that branch.
//! - A parent that fails to recompute (a dependent vanished, or stale lineage
//!   surfaces as a self-reference) ends its branch with a warning; sibling
//!   branches carry on.
//!
//! Each branch carries the chain of rewrites that led to it. A parent that is
//! already on its own chain is being fed its own earlier rewrite, which only
//! a dependency loop can produce; the branch is cut there instead of climbing
//! forever. Chains are simple paths over a finite task set, so every cascade
//! terminates.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::domain::{Result, Task, TaskId, TaskUpdate, TriageError};
use crate::ports::{EventSink, TaskRepository};

/// One frontier entry: the task whose prerequisites are visited next, plus
/// the rewrite chain from the trigger to it.
struct Frontier {
    tip: TaskId,
    path: Vec<TaskId>,
}

/// Rebuild `task`'s snapshots from current repository state and recompute.
pub(crate) async fn refresh<R: TaskRepository>(
    repository: &R,
    task: &Task,
    now: DateTime<Utc>,
) -> Result<TaskUpdate> {
    let mut fresh = Vec::with_capacity(task.dependents.len());
    for snapshot in &task.dependents {
        fresh.push(repository.get(snapshot.id).await?);
    }
    task.refreshed(&fresh, now)
}

/// Run the cascade from `start`, which must already be committed. Returns the
/// number of rewrites saved.
///
/// Recompute failures halt their branch only; storage and publish failures
/// abort the whole run.
pub async fn run<R, S>(
    repository: &R,
    events: &S,
    start: TaskId,
    now: DateTime<Utc>,
) -> Result<usize>
where
    R: TaskRepository,
    S: EventSink,
{
    let mut frontier = VecDeque::from([Frontier {
        tip: start,
        path: vec![start],
    }]);
    let mut rewrites = 0usize;

    while let Some(Frontier { tip, path }) = frontier.pop_front() {
        for parent in repository.list_prerequisites_of(tip).await? {
            let parent_id = parent.id;

            if path.contains(&parent_id) {
                warn!("cascade loop through {parent_id}; branch halted");
                continue;
            }

            let update = match refresh(repository, &parent, now).await {
                Ok(update) => update,
                Err(err @ (TriageError::NotFound(_) | TriageError::CircularDependency(_))) => {
                    warn!("cascade branch halted at {parent_id}: {err}");
                    continue;
                }
                Err(err) => return Err(err),
            };

            if update.task == parent {
                // Fix point: this branch is already consistent.
                continue;
            }

            repository.save(&update.task).await?;
            if !update.events.is_empty() {
                events.publish(&update.events).await?;
            }
            debug!(
                "cascade rewrote {parent_id}: effective_density {:.3}",
                update.task.effective_density
            );
            rewrites += 1;

            let mut next_path = path.clone();
            next_path.push(parent_id);
            frontier.push_back(Frontier {
                tip: parent_id,
                path: next_path,
            });
        }
    }

    Ok(rewrites)
}
