//! Boundary to the external task store.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::task::{Task, TaskId, TaskStatus};

pub mod http;
pub mod memory;

pub use http::HttpTaskStore;
pub use memory::MemoryTaskStore;

/// The four remote operations the task list is built on. The store owns all
/// task state; callers only ever see snapshots.
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn get_tasks(&self) -> Result<Vec<Task>, StoreError>;
    /// Creates a PENDING task.
    async fn add_task(&self, text: &str) -> Result<(), StoreError>;
    async fn update_task_status(&self, id: &TaskId, status: TaskStatus) -> Result<(), StoreError>;
    async fn delete_task(&self, id: &TaskId) -> Result<(), StoreError>;
}
