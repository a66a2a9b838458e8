//! In-memory task repository.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::domain::{Result, Task, TaskId, TriageError};
use crate::ports::TaskRepository;

/// HashMap-backed repository. Development and test grade: no durability, and
/// scan order over the map is unspecified.
pub struct InMemoryTaskRepository {
    tasks: Arc<Mutex<HashMap<TaskId, Task>>>,
}

impl InMemoryTaskRepository {
    pub fn new() -> Self {
        Self {
            tasks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// All tasks, densest first. This is the read model the UI ranks by;
    /// it is a convenience of this implementation, not part of the port.
    pub async fn list_ranked(&self) -> Vec<Task> {
        let tasks = self.tasks.lock().await;
        let mut all: Vec<Task> = tasks.values().cloned().collect();
        all.sort_by(|a, b| b.effective_density.total_cmp(&a.effective_density));
        all
    }

    pub async fn len(&self) -> usize {
        self.tasks.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.tasks.lock().await.is_empty()
    }
}

impl Default for InMemoryTaskRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn get(&self, id: TaskId) -> Result<Task> {
        let tasks = self.tasks.lock().await;
        tasks.get(&id).cloned().ok_or(TriageError::NotFound(id))
    }

    async fn save(&self, task: &Task) -> Result<()> {
        let mut tasks = self.tasks.lock().await;
        tasks.insert(task.id, task.clone());
        Ok(())
    }

    async fn delete(&self, id: TaskId) -> Result<()> {
        let mut tasks = self.tasks.lock().await;
        tasks.remove(&id);
        Ok(())
    }

    async fn list_activation_due(&self, now: DateTime<Utc>) -> Result<Vec<Task>> {
        let tasks = self.tasks.lock().await;
        Ok(tasks
            .values()
            .filter(|t| !t.is_active && t.activation_time <= now)
            .cloned()
            .collect())
    }

    async fn list_prerequisites_of(&self, id: TaskId) -> Result<Vec<Task>> {
        let tasks = self.tasks.lock().await;
        Ok(tasks
            .values()
            .filter(|t| t.dependents.iter().any(|s| s.id == id))
            .cloned()
            .collect())
    }
}
