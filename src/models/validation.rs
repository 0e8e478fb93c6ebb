//! Input rules shared by the HTTP handlers and the client, so both sides
//! accept exactly the same task data.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use crate::error::{TaskError, TaskResult};
use crate::models::task::Priority;

pub const MAX_TITLE_LEN: usize = 100;
/// Width of the `status` column.
pub const MAX_STATUS_LEN: usize = 255;

pub fn validate_title(title: &str) -> TaskResult<()> {
    if title.trim().is_empty() {
        return Err(TaskError::validation("title must not be empty"));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(TaskError::validation(format!(
            "title must be at most {} characters",
            MAX_TITLE_LEN
        )));
    }
    Ok(())
}

pub fn validate_status(status: &str) -> TaskResult<()> {
    if status.chars().count() > MAX_STATUS_LEN {
        return Err(TaskError::validation(format!(
            "status must be at most {} characters",
            MAX_STATUS_LEN
        )));
    }
    Ok(())
}

pub fn parse_priority(raw: &str) -> TaskResult<Priority> {
    raw.parse()
}

/// Due date rule of the task form: a date is required and may not fall
/// before the start of the current UTC day. The HTTP API does not apply it.
pub fn validate_form_due_date(due: Option<DateTime<Utc>>, now: DateTime<Utc>) -> TaskResult<()> {
    let due = due.ok_or_else(|| TaskError::validation("Due date is required"))?;
    let today = now.date_naive().and_time(NaiveTime::MIN).and_utc();
    if due < today {
        return Err(TaskError::validation("Due date cannot be in the past"));
    }
    Ok(())
}

/// Parses a due date the way the web form sends it.
///
/// Accepts RFC 3339 timestamps, `YYYY-MM-DDTHH:MM[:SS[.fff]]` (read as UTC)
/// and bare `YYYY-MM-DD` dates (midnight UTC). A blank string is "no date".
pub fn parse_due_date(raw: &str) -> TaskResult<Option<DateTime<Utc>>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Some(parsed.with_timezone(&Utc)));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(Some(parsed.and_utc()));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(Some(midnight.and_utc()));
        }
    }

    Err(TaskError::validation(format!("dueDate is not a valid date: {:?}", raw)))
}
