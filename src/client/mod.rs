//! HTTP client for the task API plus the client-side list pipeline
//! (filtering, sorting and paging of an already fetched collection).

use chrono::{DateTime, Utc};
use log::{info, warn};
use reqwest::{Response, StatusCode};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::models::task::{Priority, Task};
use crate::error::TaskError;
use crate::models::validation::{validate_form_due_date, validate_title};

pub mod filters;
pub mod view;

pub use filters::{filter_tasks, sort_tasks, DueDateRange, SortKey, SortOrder, StatusFilter, TaskFilters};
pub use view::{TaskAction, TaskView};

pub const DEFAULT_BASE_URL: &str = "http://localhost:3001";
pub const DEFAULT_STATUS: &str = "pending";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("could not decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("task {0} not found")]
    NotFound(i64),

    #[error("server responded with {0}: {1}")]
    Status(u16, String),

    #[error("{0}")]
    Validation(String),
}

/// What the task form submits when creating a task.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskFormData {
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_completed: Option<bool>,
}

/// A partial update; only the fields that are set are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_completed: Option<bool>,
}

impl From<TaskError> for ClientError {
    fn from(err: TaskError) -> Self {
        ClientError::Validation(err.to_string())
    }
}

impl From<TaskFormData> for TaskUpdate {
    fn from(form: TaskFormData) -> Self {
        TaskUpdate {
            title: Some(form.title),
            description: Some(form.description),
            priority: form.priority,
            due_date: form.due_date,
            status: form.status,
            is_completed: form.is_completed,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TaskClient {
    http: reqwest::Client,
    base_url: String,
}

impl Default for TaskClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl TaskClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http: reqwest::Client::new(), base_url }
    }

    fn tasks_url(&self) -> String {
        format!("{}/tasks", self.base_url)
    }

    fn task_url(&self, id: i64) -> String {
        format!("{}/tasks/{}", self.base_url, id)
    }

    /// Fetches the whole collection. A body that is not a JSON array yields no tasks.
    pub async fn get_tasks(&self) -> Result<Vec<Task>, ClientError> {
        let response = self.http.get(self.tasks_url()).send().await?;
        let body: Value = response.json().await?;
        match body {
            Value::Array(_) => Ok(serde_json::from_value(body)?),
            other => {
                warn!("Expected a task array, got {}", other);
                Ok(Vec::new())
            }
        }
    }

    pub async fn get_task(&self, id: i64) -> Result<Task, ClientError> {
        let response = self.http.get(self.task_url(id)).send().await?;
        decode_task(response, Some(id)).await
    }

    /// Creates a task, defaulting `status` to "pending" and `priority` to Low.
    /// The form must carry a due date no earlier than today (UTC).
    pub async fn create_task(&self, form: TaskFormData) -> Result<Task, ClientError> {
        validate_title(&form.title)?;
        validate_form_due_date(form.due_date, Utc::now())?;

        let payload = TaskFormData {
            status: form.status.or_else(|| Some(DEFAULT_STATUS.to_string())),
            priority: form.priority.or(Some(Priority::Low)),
            ..form
        };
        let response = self.http.post(self.tasks_url()).json(&payload).send().await?;
        let task = decode_task(response, None).await?;
        info!("Created task {}", task.id);
        Ok(task)
    }

    pub async fn update_task(&self, id: i64, updates: &TaskUpdate) -> Result<Task, ClientError> {
        if let Some(title) = &updates.title {
            validate_title(title)?;
        }
        if updates.due_date.is_some() {
            validate_form_due_date(updates.due_date, Utc::now())?;
        }
        let response = self.http.put(self.task_url(id)).json(updates).send().await?;
        decode_task(response, Some(id)).await
    }

    /// True only when the server answered 204. Any other outcome, transport
    /// errors included, is reported as `false`.
    pub async fn delete_task(&self, id: i64) -> bool {
        match self.http.delete(self.task_url(id)).send().await {
            Ok(response) => response.status() == StatusCode::NO_CONTENT,
            Err(e) => {
                warn!("Failed to delete task {}: {}", id, e);
                false
            }
        }
    }

    /// Flips completion with a single server-side update, so concurrent
    /// toggles never overwrite each other.
    pub async fn toggle_task_completion(&self, id: i64) -> Result<Task, ClientError> {
        let url = format!("{}/toggle", self.task_url(id));
        let response = self.http.patch(url).send().await?;
        decode_task(response, Some(id)).await
    }
}

// `id` is the task the request addressed; a 404 without one is a plain status error.
async fn decode_task(response: Response, id: Option<i64>) -> Result<Task, ClientError> {
    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        if let Some(id) = id {
            return Err(ClientError::NotFound(id));
        }
    }
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string))
            .unwrap_or(body);
        return Err(ClientError::Status(status.as_u16(), message));
    }
    Ok(response.json().await?)
}
