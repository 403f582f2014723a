use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use serde::Serialize;
use tracing::debug;

use crate::error::{InvalidRawResponse, StoreError};
use crate::store::TaskStore;
use crate::task::{Task, TaskId, TaskStatus};

#[derive(Serialize)]
struct AddTaskRequest<'a> {
    task: &'a str,
}

#[derive(Serialize)]
struct UpdateStatusRequest {
    status: TaskStatus,
}

/// JSON-over-HTTP task store rooted at a base URL (`{base}/tasks`).
#[derive(Debug, Clone)]
pub struct HttpTaskStore {
    client: Client,
    base_url: Url,
}

impl HttpTaskStore {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, StoreError> {
        let invalid = |reason: String| StoreError::InvalidUrl {
            url: base_url.to_string(),
            reason,
        };
        let base_url = Url::parse(base_url).map_err(|err| invalid(err.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(invalid("not a base url".to_string()));
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    fn tasks_url(&self, id: Option<&TaskId>) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("tasks");
            if let Some(id) = id {
                segments.push(id.as_str());
            }
        }
        url
    }
}

async fn ensure_success(response: Response) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(StoreError::Status {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl TaskStore for HttpTaskStore {
    async fn get_tasks(&self) -> Result<Vec<Task>, StoreError> {
        let url = self.tasks_url(None);
        debug!(%url, "fetching tasks");
        let response = ensure_success(self.client.get(url).send().await?).await?;
        let body = response.text().await?;
        if body.trim().is_empty() {
            return Err(InvalidRawResponse::new("task store returned an empty body").into());
        }
        serde_json::from_str(&body).map_err(|err| {
            InvalidRawResponse::with_source(err, "task store returned a malformed task list")
                .into()
        })
    }

    async fn add_task(&self, text: &str) -> Result<(), StoreError> {
        let url = self.tasks_url(None);
        debug!(%url, "adding task");
        let request = self.client.post(url).json(&AddTaskRequest { task: text });
        ensure_success(request.send().await?).await?;
        Ok(())
    }

    async fn update_task_status(&self, id: &TaskId, status: TaskStatus) -> Result<(), StoreError> {
        let url = self.tasks_url(Some(id));
        debug!(%url, %status, "updating task status");
        let request = self
            .client
            .patch(url)
            .json(&UpdateStatusRequest { status });
        match ensure_success(request.send().await?).await {
            Err(StoreError::Status { status: 404, .. }) => Err(StoreError::NotFound(id.clone())),
            other => other.map(|_| ()),
        }
    }

    async fn delete_task(&self, id: &TaskId) -> Result<(), StoreError> {
        let url = self.tasks_url(Some(id));
        debug!(%url, "deleting task");
        match ensure_success(self.client.delete(url).send().await?).await {
            Err(StoreError::Status { status: 404, .. }) => Err(StoreError::NotFound(id.clone())),
            other => other.map(|_| ()),
        }
    }
}
