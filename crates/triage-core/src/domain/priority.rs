//! Priority math: density and its propagation through dependent snapshots.
//!
//! Design:
//! - `density` is fixed at creation: importance over effort.
//! - `propagate` derives the ranking inputs (`effective_density`,
//!   `ultimately_blocks`) from the stored dependent snapshots. It reads the
//!   snapshots as-is; refreshing stale ones is the caller's job.
//! - A computed lineage that points back at the task itself is the one cycle
//!   check in the system and fails the whole mutation.

use super::errors::{Result, TriageError};
use super::ids::TaskId;
use super::task::DependentSnapshot;

/// Margin added when a task inherits the density of a dependent, so that a
/// prerequisite always ranks above the work waiting on it.
pub const DENSITY_MARGIN: f64 = 0.1;

/// Importance-per-effort ratio. `effort >= 1` is enforced at task creation.
pub fn density(importance: u32, effort: u32) -> f64 {
    f64::from(importance) / f64::from(effort)
}

/// Result of propagating dependent priorities into one task.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Propagated {
    pub effective_density: f64,

    /// Tail of the dependency chain this task unblocks: the winning
    /// dependent's own `ultimately_blocks` if it has one, otherwise the
    /// winning dependent itself. `None` when no dependent is active.
    pub ultimately_blocks: Option<TaskId>,
}

/// Derive `effective_density` and `ultimately_blocks` from the snapshots.
///
/// Only active snapshots compete. The winner is the first maximum by
/// `effective_density` in link order; it sets the lineage either way, but the
/// margin applies only when it matches or beats the task's own density.
pub fn propagate(id: TaskId, density: f64, dependents: &[DependentSnapshot]) -> Result<Propagated> {
    let mut winner: Option<&DependentSnapshot> = None;
    for snapshot in dependents.iter().filter(|s| s.is_active) {
        // Strict comparison keeps the earliest-linked snapshot on ties.
        if winner.is_none_or(|best| snapshot.effective_density > best.effective_density) {
            winner = Some(snapshot);
        }
    }

    let Some(winner) = winner else {
        return Ok(Propagated {
            effective_density: density,
            ultimately_blocks: None,
        });
    };

    let lineage = winner.ultimately_blocks.unwrap_or(winner.id);
    if lineage == id {
        return Err(TriageError::CircularDependency(id));
    }

    let effective_density = if winner.effective_density >= density {
        winner.effective_density + DENSITY_MARGIN
    } else {
        density
    };

    Ok(Propagated {
        effective_density,
        ultimately_blocks: Some(lineage),
    })
}
