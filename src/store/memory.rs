use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::StoreError;
use crate::store::TaskStore;
use crate::task::{Task, TaskId, TaskStatus};

/// Process-local task store. Used when no remote store is configured.
#[derive(Debug)]
pub struct MemoryTaskStore {
    tasks: Mutex<Vec<Task>>,
}

impl MemoryTaskStore {
    pub fn new() -> Self {
        Self::with_tasks(Vec::new())
    }

    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        Self {
            tasks: Mutex::new(tasks),
        }
    }
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn get_tasks(&self) -> Result<Vec<Task>, StoreError> {
        Ok(self.tasks.lock().await.clone())
    }

    async fn add_task(&self, text: &str) -> Result<(), StoreError> {
        let task = Task {
            id: TaskId(Uuid::new_v4().to_string()),
            task: text.to_string(),
            status: TaskStatus::Pending,
            created: Some(Utc::now()),
            completed: None,
        };
        self.tasks.lock().await.push(task);
        Ok(())
    }

    async fn update_task_status(&self, id: &TaskId, status: TaskStatus) -> Result<(), StoreError> {
        let mut tasks = self.tasks.lock().await;
        let task = tasks
            .iter_mut()
            .find(|t| &t.id == id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        task.completed = match status {
            TaskStatus::Done => task.completed.or_else(|| Some(Utc::now())),
            TaskStatus::Pending | TaskStatus::Other(_) => None,
        };
        task.status = status;
        debug_assert!(task.is_consistent());
        Ok(())
    }

    async fn delete_task(&self, id: &TaskId) -> Result<(), StoreError> {
        let mut tasks = self.tasks.lock().await;
        let before = tasks.len();
        tasks.retain(|t| &t.id != id);
        if tasks.len() == before {
            return Err(StoreError::NotFound(id.clone()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn add_creates_pending_task_with_unique_id() {
        let store = MemoryTaskStore::new();
        store.add_task("Buy milk").await.unwrap();
        store.add_task("Buy milk").await.unwrap();

        let tasks = store.get_tasks().await.unwrap();
        assert_eq!(tasks.len(), 2);
        assert_ne!(tasks[0].id, tasks[1].id);
        assert!(tasks
            .iter()
            .all(|t| t.status == TaskStatus::Pending && t.completed.is_none()));
    }

    #[tokio::test]
    async fn status_changes_keep_completed_consistent() {
        let store = MemoryTaskStore::new();
        store.add_task("Walk dog").await.unwrap();
        let id = store.get_tasks().await.unwrap()[0].id.clone();

        store.update_task_status(&id, TaskStatus::Done).await.unwrap();
        let done = store.get_tasks().await.unwrap().remove(0);
        assert!(done.completed.is_some());
        assert!(done.is_consistent());

        // marking done twice keeps the first completion time
        store.update_task_status(&id, TaskStatus::Done).await.unwrap();
        let again = store.get_tasks().await.unwrap().remove(0);
        assert_eq!(again.completed, done.completed);

        store.update_task_status(&id, TaskStatus::Pending).await.unwrap();
        let reopened = store.get_tasks().await.unwrap().remove(0);
        assert!(reopened.completed.is_none());
        assert!(reopened.is_consistent());
    }

    #[tokio::test]
    async fn unknown_ids_are_not_found() {
        let store = MemoryTaskStore::new();
        let id = TaskId::from("nope");

        assert!(matches!(
            store.update_task_status(&id, TaskStatus::Done).await,
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            store.delete_task(&id).await,
            Err(StoreError::NotFound(_))
        ));
    }
}
