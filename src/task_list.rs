use tracing::{debug, info, warn};

use crate::error::StoreError;
use crate::render::{RowRenderer, TaskRow};
use crate::store::TaskStore;
use crate::task::{TaskId, TaskStatus};

pub const DELETE_PROMPT: &str = "Delete this task?";

/// Yes/no question put to the user before a destructive action.
pub trait Confirm {
    fn confirm(&mut self, message: &str) -> bool;
}

impl<F: FnMut(&str) -> bool> Confirm for F {
    fn confirm(&mut self, message: &str) -> bool {
        self(message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    Suppressed,
}

/// Displays the store's tasks and forwards user actions to it. Every
/// successful mutation is followed by a full re-fetch.
pub struct TaskList {
    store: Box<dyn TaskStore>,
    renderer: RowRenderer,
    rows: Vec<TaskRow>,
    pub input: String,
    notice: Option<String>,
}

impl TaskList {
    pub fn new(store: Box<dyn TaskStore>, renderer: RowRenderer) -> Self {
        Self {
            store,
            renderer,
            rows: Vec::new(),
            input: String::new(),
            notice: None,
        }
    }

    pub fn rows(&self) -> &[TaskRow] {
        &self.rows
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Replaces the displayed rows with a fresh snapshot from the store.
    pub async fn refresh(&mut self) -> Result<(), StoreError> {
        debug!("refreshing task list");
        let tasks = self.store.get_tasks().await.map_err(|err| self.fail("load tasks", err))?;
        self.rows = self.renderer.render(&tasks);
        self.notice = None;
        Ok(())
    }

    /// Sends `text` to the store as a new task. Blank text is ignored; on
    /// success the input field is cleared and the list re-fetched.
    pub async fn add(&mut self, text: &str) -> Result<Outcome, StoreError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(Outcome::Suppressed);
        }
        self.store
            .add_task(text)
            .await
            .map_err(|err| self.fail("add task", err))?;
        info!(task = %text, "task added");
        self.input.clear();
        self.refresh().await?;
        Ok(Outcome::Applied)
    }

    pub async fn submit_input(&mut self) -> Result<Outcome, StoreError> {
        let text = self.input.clone();
        self.add(&text).await
    }

    pub async fn mark_done(&mut self, id: &TaskId) -> Result<(), StoreError> {
        self.store
            .update_task_status(id, TaskStatus::Done)
            .await
            .map_err(|err| self.fail("mark task done", err))?;
        info!(%id, "task marked done");
        self.refresh().await
    }

    pub async fn delete(
        &mut self,
        id: &TaskId,
        confirm: &mut dyn Confirm,
    ) -> Result<Outcome, StoreError> {
        if !confirm.confirm(DELETE_PROMPT) {
            debug!(%id, "delete cancelled");
            return Ok(Outcome::Suppressed);
        }
        self.store
            .delete_task(id)
            .await
            .map_err(|err| self.fail("delete task", err))?;
        info!(%id, "task deleted");
        self.refresh().await?;
        Ok(Outcome::Applied)
    }

    fn fail(&mut self, action: &str, err: StoreError) -> StoreError {
        warn!(%action, error = %err, "task store call failed");
        self.notice = Some(format!("Could not {action}: {err}"));
        err
    }
}
