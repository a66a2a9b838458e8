//! Task value and its operations.
//!
//! Design:
//! - `Task` is an immutable value. Operations return a fresh `TaskUpdate`
//!   (new value + events) and leave the input untouched; a rejected mutation
//!   therefore never leaks partial state.
//! - A task stores `DependentSnapshot`s of the tasks it is a prerequisite
//!   for, not live references. Snapshots go stale when the dependent changes
//!   and are brought up to date by `refreshed` (driven by the cascade and the
//!   activation sweep), never behind the caller's back.
//! - Every operation ends in the same recompute: activation state from the
//!   clock, then priority propagation over the snapshots.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::activation;
use super::errors::{Result, TriageError};
use super::events::DomainEvent;
use super::ids::TaskId;
use super::priority;

/// Coarse label for where a task belongs. Has no effect on ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskKind {
    Home,
    Work,
}

/// Denormalized copy of a dependent task's ranking fields, captured when the
/// link is made or last refreshed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DependentSnapshot {
    pub id: TaskId,
    pub is_active: bool,
    pub effective_density: f64,
    pub ultimately_blocks: Option<TaskId>,
}

impl DependentSnapshot {
    pub fn of(task: &Task) -> Self {
        Self {
            id: task.id,
            is_active: task.is_active,
            effective_density: task.effective_density,
            ultimately_blocks: task.ultimately_blocks,
        }
    }
}

/// Parameters for creating a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTask {
    pub name: String,
    pub importance: u32,
    pub effort: u32,
    pub kind: TaskKind,
    pub activation_time: DateTime<Utc>,
}

/// A task with its derived ranking state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    pub importance: u32,
    pub effort: u32,
    pub kind: TaskKind,
    pub activation_time: DateTime<Utc>,

    /// Derived: `activation_time <= now` as of the last recompute.
    pub is_active: bool,

    /// Importance over effort, fixed at creation.
    pub density: f64,

    /// Ranking key. Zero whenever the task is inactive; the latent `density`
    /// is kept so reactivation restores it.
    pub effective_density: f64,

    /// Tail of the chain this task unblocks, if any dependent is active.
    pub ultimately_blocks: Option<TaskId>,

    /// Tasks this task is a prerequisite for. Ordered by link time, one
    /// snapshot per task id.
    pub dependents: Vec<DependentSnapshot>,
}

/// New task value plus the events the operation produced, in order.
///
/// Events are transient: callers hand them to an `EventSink`, they are never
/// persisted with the task.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskUpdate {
    pub task: Task,
    pub events: Vec<DomainEvent>,
}

impl Task {
    /// Validate and build a new task. Emits `TaskCreated` only, even when the
    /// task is born active.
    pub fn create(new: NewTask, now: DateTime<Utc>) -> Result<TaskUpdate> {
        if new.importance == 0 {
            return Err(TriageError::InvalidImportance(new.importance));
        }
        if new.effort == 0 {
            return Err(TriageError::InvalidEffort(new.effort));
        }

        let id = TaskId::generate();
        let task = Task {
            id,
            name: new.name,
            importance: new.importance,
            effort: new.effort,
            kind: new.kind,
            activation_time: new.activation_time,
            // Seeded with the state recompute will derive, so no activation
            // event accompanies creation.
            is_active: activation::is_active_at(new.activation_time, now),
            density: priority::density(new.importance, new.effort),
            effective_density: 0.0,
            ultimately_blocks: None,
            dependents: Vec::new(),
        };

        let mut update = task.recompute(now)?;
        update.events.push(DomainEvent::TaskCreated { id });
        Ok(update)
    }

    /// Make this task a prerequisite of the given tasks.
    ///
    /// Already-linked ids (and duplicates within one call) are skipped, so
    /// the operation is idempotent. Snapshots are captured from the states
    /// passed in; existing snapshots are not refreshed here.
    pub fn link_dependents(&self, dependents: &[Task], now: DateTime<Utc>) -> Result<TaskUpdate> {
        if dependents.iter().any(|d| d.id == self.id) {
            return Err(TriageError::CircularDependency(self.id));
        }

        let mut next = self.clone();
        let mut linked: HashSet<TaskId> = next.dependents.iter().map(|s| s.id).collect();
        for dependent in dependents {
            if linked.insert(dependent.id) {
                next.dependents.push(DependentSnapshot::of(dependent));
            }
        }

        next.recompute(now)
    }

    /// Drop the snapshots for the given ids. Ids that are not linked are
    /// ignored.
    pub fn unlink_dependents(&self, ids: &[TaskId], now: DateTime<Utc>) -> Result<TaskUpdate> {
        let mut next = self.clone();
        next.dependents.retain(|s| !ids.contains(&s.id));
        next.recompute(now)
    }

    /// Rebuild the snapshots from fresh dependent states and recompute.
    ///
    /// `fresh` is matched by id; dependents without a fresh state keep their
    /// stored snapshot.
    pub fn refreshed(&self, fresh: &[Task], now: DateTime<Utc>) -> Result<TaskUpdate> {
        let by_id: HashMap<TaskId, &Task> = fresh.iter().map(|t| (t.id, t)).collect();

        let mut next = self.clone();
        for snapshot in &mut next.dependents {
            if let Some(current) = by_id.get(&snapshot.id) {
                *snapshot = DependentSnapshot::of(current);
            }
        }

        next.recompute(now)
    }

    /// The single recompute path: derive `is_active` from the clock, then the
    /// ranking fields from the snapshots. An inactive task ranks at zero no
    /// matter what its dependents say.
    fn recompute(mut self, now: DateTime<Utc>) -> Result<TaskUpdate> {
        let was_active = self.is_active;
        self.is_active = activation::is_active_at(self.activation_time, now);

        let propagated = priority::propagate(self.id, self.density, &self.dependents)?;
        self.ultimately_blocks = propagated.ultimately_blocks;
        self.effective_density = if self.is_active {
            propagated.effective_density
        } else {
            0.0
        };

        let events = activation::transition_event(self.id, was_active, self.is_active)
            .into_iter()
            .collect();
        Ok(TaskUpdate { task: self, events })
    }
}
