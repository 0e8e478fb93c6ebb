use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TaskResult;
use crate::models::task::{Priority, Task};
use crate::models::validation::parse_due_date;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    Completed,
    Pending,
}

/// Inclusive due-date window. An unset bound is open on that side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DueDateRange {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl DueDateRange {
    /// Builds a range from form input; blank strings leave that bound open.
    pub fn parse(from: &str, to: &str) -> TaskResult<Self> {
        Ok(Self { from: parse_due_date(from)?, to: parse_due_date(to)? })
    }

    pub fn is_set(&self) -> bool {
        self.from.is_some() || self.to.is_some()
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.from.map_or(true, |from| at >= from) && self.to.map_or(true, |to| at <= to)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilters {
    pub priority: Option<Priority>,
    pub status: Option<StatusFilter>,
    pub due_date_range: Option<DueDateRange>,
}

impl TaskFilters {
    pub fn is_active(&self) -> bool {
        self.priority.is_some()
            || self.status.is_some()
            || self.due_date_range.map_or(false, |range| range.is_set())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    #[default]
    DueDate,
    Priority,
    CreatedAt,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

fn matches_search(task: &Task, query: &str) -> bool {
    task.title.to_lowercase().contains(query) || task.description.to_lowercase().contains(query)
}

/// Keeps the tasks that pass every active filter. A blank search and unset
/// filter fields match everything.
pub fn filter_tasks(tasks: &[Task], filters: &TaskFilters, search: Option<&str>) -> Vec<Task> {
    let query = search
        .filter(|q| !q.trim().is_empty())
        .map(str::to_lowercase);

    tasks
        .iter()
        .filter(|task| query.as_deref().map_or(true, |q| matches_search(task, q)))
        .filter(|task| filters.priority.map_or(true, |p| task.priority == p))
        .filter(|task| match filters.status {
            Some(StatusFilter::Completed) => task.is_completed,
            Some(StatusFilter::Pending) => !task.is_completed,
            None => true,
        })
        .filter(|task| filters.due_date_range.map_or(true, |range| range.contains(task.due_date)))
        .cloned()
        .collect()
}

fn compare(a: &Task, b: &Task, sort_by: SortKey) -> Ordering {
    match sort_by {
        SortKey::DueDate => a.due_date.cmp(&b.due_date),
        SortKey::Priority => a.priority.rank().cmp(&b.priority.rank()),
        SortKey::CreatedAt => a.created_at.cmp(&b.created_at),
    }
}

/// Returns a sorted copy. Equal keys keep their input order in both directions.
pub fn sort_tasks(tasks: &[Task], sort_by: SortKey, order: SortOrder) -> Vec<Task> {
    let mut sorted = tasks.to_vec();
    sorted.sort_by(|a, b| {
        let ordering = compare(a, b, sort_by);
        match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
    sorted
}
