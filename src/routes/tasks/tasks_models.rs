use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{TaskError, TaskResult};
use crate::models::task::{NewTask, Priority, TaskChanges};
use crate::models::validation::{parse_due_date, parse_priority, validate_status, validate_title};

pub const TASK_NOT_FOUND: &str = "Task not found";
pub const INTERNAL_ERROR: &str = "Internal server error";

// Body of POST /tasks and PUT /tasks/{id}
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub due_date: Option<Value>,
    pub is_completed: Option<Value>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self { error: error.into() }
    }
}

impl TaskRequest {
    /// Validates a create request. Missing `dueDate` becomes `now`, a missing
    /// or non-boolean `isCompleted` becomes `false`, a missing priority `Low`.
    pub fn into_new_task(self, now: DateTime<Utc>) -> TaskResult<NewTask> {
        let title = self.title.unwrap_or_default();
        validate_title(&title)?;
        if let Some(status) = &self.status {
            validate_status(status)?;
        }

        let priority = match non_empty(self.priority) {
            Some(raw) => parse_priority(&raw)?,
            None => Priority::default(),
        };
        let due_date = match &self.due_date {
            Some(value) => due_date_from_json(value)?,
            None => None,
        };

        Ok(NewTask {
            title,
            description: self.description.unwrap_or_default(),
            status: self.status,
            priority,
            due_date: due_date.unwrap_or(now),
            is_completed: completion_flag(self.is_completed.as_ref()).unwrap_or(false),
        })
    }

    /// Validates an update request. Every absent field keeps its stored value.
    pub fn into_changes(self) -> TaskResult<TaskChanges> {
        if let Some(title) = &self.title {
            validate_title(title)?;
        }
        if let Some(status) = &self.status {
            validate_status(status)?;
        }
        let priority = match non_empty(self.priority) {
            Some(raw) => Some(parse_priority(&raw)?),
            None => None,
        };
        let due_date = match &self.due_date {
            Some(value) => due_date_from_json(value)?,
            None => None,
        };

        Ok(TaskChanges {
            title: self.title,
            description: self.description,
            status: self.status,
            priority,
            due_date,
            is_completed: completion_flag(self.is_completed.as_ref()),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn completion_flag(value: Option<&Value>) -> Option<bool> {
    match value {
        Some(Value::Bool(flag)) => Some(*flag),
        _ => None,
    }
}

// null, false, "" and 0 all mean "no date"; numbers are epoch milliseconds.
fn due_date_from_json(value: &Value) -> TaskResult<Option<DateTime<Utc>>> {
    match value {
        Value::Null | Value::Bool(false) => Ok(None),
        Value::String(raw) => parse_due_date(raw),
        Value::Number(number) => match number.as_i64() {
            Some(0) => Ok(None),
            Some(millis) => Utc
                .timestamp_millis_opt(millis)
                .single()
                .map(Some)
                .ok_or_else(|| TaskError::validation(format!("dueDate is out of range: {}", millis))),
            None => Err(TaskError::validation("dueDate must be an integer timestamp")),
        },
        other => Err(TaskError::validation(format!("dueDate is not a valid date: {}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(body: Value) -> TaskRequest {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn create_fills_defaults() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let task = request(json!({ "title": "Plan sprint" })).into_new_task(now).unwrap();

        assert_eq!(task.due_date, now);
        assert!(!task.is_completed);
        assert_eq!(task.priority, Priority::Low);
        assert_eq!(task.description, "");
    }

    #[test]
    fn create_ignores_non_boolean_completion() {
        let now = Utc::now();
        let task = request(json!({ "title": "x", "isCompleted": "true" }))
            .into_new_task(now)
            .unwrap();
        assert!(!task.is_completed);

        let task = request(json!({ "title": "x", "isCompleted": true }))
            .into_new_task(now)
            .unwrap();
        assert!(task.is_completed);
    }

    #[test]
    fn create_treats_falsy_due_dates_as_missing() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        for due in [json!(null), json!(""), json!(0), json!(false)] {
            let task = request(json!({ "title": "x", "dueDate": due }))
                .into_new_task(now)
                .unwrap();
            assert_eq!(task.due_date, now);
        }
    }

    #[test]
    fn create_accepts_epoch_millis() {
        let task = request(json!({ "title": "x", "dueDate": 1704844800000i64 }))
            .into_new_task(Utc::now())
            .unwrap();
        assert_eq!(task.due_date, Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap());
    }

    #[test]
    fn create_requires_title_and_known_priority() {
        let now = Utc::now();
        assert!(request(json!({})).into_new_task(now).is_err());
        assert!(request(json!({ "title": "x", "priority": "Urgent" }))
            .into_new_task(now)
            .is_err());
    }

    #[test]
    fn status_longer_than_column_is_rejected() {
        let long = "s".repeat(256);
        let err = request(json!({ "title": "x", "status": long }))
            .into_new_task(Utc::now())
            .unwrap_err();
        assert!(matches!(err, TaskError::Validation(_)));
        assert!(request(json!({ "status": long })).into_changes().is_err());

        let fits = request(json!({ "title": "x", "status": "s".repeat(255) }))
            .into_new_task(Utc::now())
            .unwrap();
        assert_eq!(fits.status.map(|s| s.len()), Some(255));
    }

    #[test]
    fn update_keeps_absent_fields() {
        let changes = request(json!({ "isCompleted": true })).into_changes().unwrap();
        assert_eq!(
            changes,
            TaskChanges { is_completed: Some(true), ..Default::default() }
        );
    }

    #[test]
    fn update_validates_given_fields() {
        assert!(request(json!({ "title": "" })).into_changes().is_err());
        assert!(request(json!({ "dueDate": "soon" })).into_changes().is_err());
        let changes = request(json!({ "priority": "High", "dueDate": "2024-01-05" }))
            .into_changes()
            .unwrap();
        assert_eq!(changes.priority, Some(Priority::High));
        assert!(changes.due_date.is_some());
    }
}
