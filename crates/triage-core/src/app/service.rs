//! Application service tying the domain to its ports.
//!
//! Every mutation goes through one commit step: save, publish, and cascade
//! when the committed events include an activation change. Reads and deletes
//! go straight to the repository.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::app::cascade;
use crate::domain::{DomainEvent, NewTask, Result, Task, TaskId, TaskUpdate};
use crate::ports::{Clock, EventSink, TaskRepository};

pub struct TaskService<R, C, S> {
    repository: Arc<R>,
    clock: Arc<C>,
    events: Arc<S>,
}

impl<R, C, S> TaskService<R, C, S>
where
    R: TaskRepository,
    C: Clock,
    S: EventSink,
{
    pub fn new(repository: Arc<R>, clock: Arc<C>, events: Arc<S>) -> Self {
        Self {
            repository,
            clock,
            events,
        }
    }

    pub async fn create_task(&self, new: NewTask) -> Result<Task> {
        let now = self.clock.now();
        let update = Task::create(new, now)?;
        let task = self.commit(update, now).await?;
        info!("created task {}", task.id);
        Ok(task)
    }

    pub async fn get_task(&self, id: TaskId) -> Result<Task> {
        self.repository.get(id).await
    }

    /// Links `dependents` under the task `id` and commits the recomputed
    /// task. Linking alone never starts a cascade; the stored task keeps the
    /// dependent states it saw at link time until an activation change.
    pub async fn add_dependent_tasks(&self, id: TaskId, dependents: &[TaskId]) -> Result<Task> {
        let task = self.repository.get(id).await?;
        let mut fetched = Vec::with_capacity(dependents.len());
        for dependent in dependents {
            fetched.push(self.repository.get(*dependent).await?);
        }
        let now = self.clock.now();
        let update = task.link_dependents(&fetched, now)?;
        self.commit(update, now).await
    }

    pub async fn remove_dependent_tasks(&self, id: TaskId, dependents: &[TaskId]) -> Result<Task> {
        let task = self.repository.get(id).await?;
        let now = self.clock.now();
        let update = task.unlink_dependents(dependents, now)?;
        self.commit(update, now).await
    }

    /// Recomputes `id` against current dependent state and commits the
    /// result. An activation flip picked up here cascades as usual.
    pub async fn refresh_task(&self, id: TaskId) -> Result<Task> {
        let task = self.repository.get(id).await?;
        let now = self.clock.now();
        let update = cascade::refresh(self.repository.as_ref(), &task, now).await?;
        self.commit(update, now).await
    }

    /// Removes the task record. Snapshots of it held by other tasks stay in
    /// place until those tasks unlink it.
    pub async fn delete_task(&self, id: TaskId) -> Result<()> {
        self.repository.delete(id).await
    }

    /// Activates every dormant task whose activation time has passed.
    /// Returns how many tasks flipped. One task failing does not stop the
    /// rest; this is the entry point of the periodic sweep.
    pub async fn activate_due_tasks(&self) -> Result<usize> {
        let now = self.clock.now();
        let due = self.repository.list_activation_due(now).await?;
        let mut activated = 0usize;
        for task in due {
            let id = task.id;
            let update = match cascade::refresh(self.repository.as_ref(), &task, now).await {
                Ok(update) => update,
                Err(err) => {
                    warn!("skipping activation of {id}: {err}");
                    continue;
                }
            };
            let flipped = update.events.iter().any(DomainEvent::changes_activation);
            if let Err(err) = self.commit(update, now).await {
                warn!("activation of {id} not committed: {err}");
                continue;
            }
            if flipped {
                debug!("activated {id}");
                activated += 1;
            }
        }
        Ok(activated)
    }

    async fn commit(&self, update: TaskUpdate, now: DateTime<Utc>) -> Result<Task> {
        self.repository.save(&update.task).await?;
        if !update.events.is_empty() {
            self.events.publish(&update.events).await?;
        }
        if update.events.iter().any(DomainEvent::changes_activation) {
            cascade::run(
                self.repository.as_ref(),
                self.events.as_ref(),
                update.task.id,
                now,
            )
            .await?;
        }
        Ok(update.task)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::domain::{TaskKind, TriageError};
    use crate::impls::{FixedClock, InMemoryTaskRepository, RecordingEventSink};

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, hour, 0, 0).unwrap()
    }

    fn home_task(name: &str, importance: u32, effort: u32, activation: DateTime<Utc>) -> NewTask {
        NewTask {
            name: name.to_string(),
            importance,
            effort,
            kind: TaskKind::Home,
            activation_time: activation,
        }
    }

    type TestService = TaskService<InMemoryTaskRepository, FixedClock, RecordingEventSink>;

    fn service(
        now: DateTime<Utc>,
    ) -> (
        TestService,
        Arc<InMemoryTaskRepository>,
        Arc<FixedClock>,
        Arc<RecordingEventSink>,
    ) {
        let repository = Arc::new(InMemoryTaskRepository::new());
        let clock = Arc::new(FixedClock::at(now));
        let events = Arc::new(RecordingEventSink::new());
        let service = TaskService::new(
            Arc::clone(&repository),
            Arc::clone(&clock),
            Arc::clone(&events),
        );
        (service, repository, clock, events)
    }

    fn approx(actual: f64, expected: f64) -> bool {
        (actual - expected).abs() < 1e-9
    }

    #[tokio::test]
    async fn create_persists_and_publishes() {
        let (service, repository, _, events) = service(at(2, 0));

        let task = service
            .create_task(home_task("dishes", 5, 5, at(1, 0)))
            .await
            .unwrap();

        assert!(task.is_active);
        assert_eq!(task.effective_density, 1.0);
        assert_eq!(repository.get(task.id).await.unwrap(), task);
        assert_eq!(
            events.recorded().await,
            vec![DomainEvent::TaskCreated { id: task.id }]
        );
    }

    #[tokio::test]
    async fn create_rejects_zero_importance_without_saving() {
        let (service, repository, _, events) = service(at(2, 0));

        let err = service
            .create_task(home_task("noop", 0, 5, at(1, 0)))
            .await
            .unwrap_err();

        assert!(matches!(err, TriageError::InvalidImportance(0)));
        assert!(repository.is_empty().await);
        assert!(events.recorded().await.is_empty());
    }

    #[tokio::test]
    async fn linking_stores_the_margin_and_publishes_nothing() {
        let (service, repository, _, events) = service(at(2, 0));
        let b = service
            .create_task(home_task("pack boxes", 8, 5, at(1, 0)))
            .await
            .unwrap();
        let a = service
            .create_task(home_task("rent the truck", 5, 5, at(1, 0)))
            .await
            .unwrap();
        events.clear().await;

        let linked = service.add_dependent_tasks(a.id, &[b.id]).await.unwrap();

        assert!(approx(linked.effective_density, 1.7));
        assert_eq!(linked.ultimately_blocks, Some(b.id));
        assert_eq!(repository.get(a.id).await.unwrap(), linked);
        assert!(events.recorded().await.is_empty());
    }

    #[tokio::test]
    async fn linking_a_task_to_itself_is_rejected() {
        let (service, repository, _, _) = service(at(2, 0));
        let a = service
            .create_task(home_task("solo", 5, 5, at(1, 0)))
            .await
            .unwrap();

        let err = service.add_dependent_tasks(a.id, &[a.id]).await.unwrap_err();

        assert!(matches!(err, TriageError::CircularDependency(id) if id == a.id));
        assert_eq!(repository.get(a.id).await.unwrap(), a);
    }

    #[tokio::test]
    async fn linking_an_unknown_dependent_changes_nothing() {
        let (service, repository, _, _) = service(at(2, 0));
        let a = service
            .create_task(home_task("alone", 5, 5, at(1, 0)))
            .await
            .unwrap();
        let ghost = TaskId::generate();

        let err = service.add_dependent_tasks(a.id, &[ghost]).await.unwrap_err();

        assert!(matches!(err, TriageError::NotFound(id) if id == ghost));
        assert_eq!(repository.get(a.id).await.unwrap(), a);
    }

    #[tokio::test]
    async fn unlinking_restores_the_bare_density() {
        let (service, repository, _, _) = service(at(2, 0));
        let b = service
            .create_task(home_task("blocker", 8, 5, at(1, 0)))
            .await
            .unwrap();
        let a = service
            .create_task(home_task("parent", 5, 5, at(1, 0)))
            .await
            .unwrap();
        service.add_dependent_tasks(a.id, &[b.id]).await.unwrap();

        let unlinked = service
            .remove_dependent_tasks(a.id, &[b.id])
            .await
            .unwrap();

        assert_eq!(unlinked.effective_density, 1.0);
        assert_eq!(unlinked.ultimately_blocks, None);
        assert!(unlinked.dependents.is_empty());
        assert_eq!(repository.get(a.id).await.unwrap(), unlinked);
    }

    #[tokio::test]
    async fn refresh_picks_up_what_linking_left_stale() {
        let (service, repository, _, _) = service(at(2, 0));
        let c = service
            .create_task(home_task("find movers", 8, 5, at(1, 0)))
            .await
            .unwrap();
        let b = service
            .create_task(home_task("pack boxes", 8, 5, at(1, 0)))
            .await
            .unwrap();
        let a = service
            .create_task(home_task("rent the truck", 5, 5, at(1, 0)))
            .await
            .unwrap();
        service.add_dependent_tasks(a.id, &[b.id]).await.unwrap();

        // b gains its own dependent afterwards; a's snapshot of b is now
        // stale and stays that way because links do not cascade.
        service.add_dependent_tasks(b.id, &[c.id]).await.unwrap();
        let stale = repository.get(a.id).await.unwrap();
        assert!(approx(stale.effective_density, 1.7));
        assert_eq!(stale.ultimately_blocks, Some(b.id));

        let refreshed = service.refresh_task(a.id).await.unwrap();

        assert!(approx(refreshed.effective_density, 1.8));
        assert_eq!(refreshed.ultimately_blocks, Some(c.id));
    }

    #[tokio::test]
    async fn activating_due_tasks_cascades_into_the_prerequisite() {
        let (service, repository, clock, events) = service(at(2, 0));
        let b = service
            .create_task(home_task("buy paint", 8, 5, at(5, 0)))
            .await
            .unwrap();
        assert!(!b.is_active);
        let a = service
            .create_task(home_task("paint the fence", 5, 5, at(1, 0)))
            .await
            .unwrap();
        let linked = service.add_dependent_tasks(a.id, &[b.id]).await.unwrap();
        assert_eq!(linked.effective_density, 1.0);
        events.clear().await;

        clock.set(at(6, 0));
        let activated = service.activate_due_tasks().await.unwrap();

        assert_eq!(activated, 1);
        let stored_b = repository.get(b.id).await.unwrap();
        assert!(stored_b.is_active);
        assert_eq!(stored_b.effective_density, 1.6);
        let stored_a = repository.get(a.id).await.unwrap();
        assert!(approx(stored_a.effective_density, 1.7));
        assert_eq!(stored_a.ultimately_blocks, Some(b.id));
        assert_eq!(
            events.recorded().await,
            vec![DomainEvent::TaskActivated { id: b.id }]
        );
    }

    #[tokio::test]
    async fn second_sweep_finds_nothing_to_do() {
        let (service, _, clock, _) = service(at(2, 0));
        service
            .create_task(home_task("late riser", 5, 5, at(5, 0)))
            .await
            .unwrap();

        clock.set(at(6, 0));
        assert_eq!(service.activate_due_tasks().await.unwrap(), 1);
        assert_eq!(service.activate_due_tasks().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn refresh_deactivation_cascades_into_the_prerequisite() {
        let (service, repository, clock, events) = service(at(2, 0));
        let b = service
            .create_task(home_task("blocker", 8, 5, at(1, 12)))
            .await
            .unwrap();
        let a = service
            .create_task(home_task("parent", 5, 5, at(1, 0)))
            .await
            .unwrap();
        let linked = service.add_dependent_tasks(a.id, &[b.id]).await.unwrap();
        assert!(approx(linked.effective_density, 1.7));
        events.clear().await;

        // The clock steps back before b's activation time; a is still past
        // its own.
        clock.set(at(1, 6));
        let refreshed = service.refresh_task(b.id).await.unwrap();

        assert!(!refreshed.is_active);
        assert_eq!(refreshed.effective_density, 0.0);
        let stored_a = repository.get(a.id).await.unwrap();
        assert_eq!(stored_a.effective_density, 1.0);
        assert_eq!(stored_a.ultimately_blocks, None);
        assert_eq!(
            events.recorded().await,
            vec![DomainEvent::TaskDeactivated { id: b.id }]
        );
    }

    #[tokio::test]
    async fn delete_is_idempotent_and_forgets_the_task() {
        let (service, _, _, _) = service(at(2, 0));
        let a = service
            .create_task(home_task("fleeting", 5, 5, at(1, 0)))
            .await
            .unwrap();

        service.delete_task(a.id).await.unwrap();
        assert!(matches!(
            service.get_task(a.id).await,
            Err(TriageError::NotFound(id)) if id == a.id
        ));
        service.delete_task(a.id).await.unwrap();
    }
}
