//! Task list view state.
//!
//! `TaskView` is an immutable snapshot of everything the list screen shows.
//! User actions go through [`TaskView::apply`], which returns the next
//! snapshot; the visible rows are always derived as
//! fetch -> filter -> sort -> paginate.

use super::filters::{filter_tasks, sort_tasks, SortKey, SortOrder, TaskFilters};
use crate::models::task::Task;

pub const TASKS_PER_PAGE: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub enum TaskAction {
    Loaded(Vec<Task>),
    Created(Task),
    Updated(Task),
    Deleted(i64),
    SetFilters(TaskFilters),
    SetSearch(String),
    SetSortKey(SortKey),
    SetSortOrder(SortOrder),
    SetPage(usize),
    /// Drops filters and search and restores the default sort.
    ClearFilters,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaskView {
    tasks: Vec<Task>,
    filters: TaskFilters,
    search: String,
    sort_by: SortKey,
    order: SortOrder,
    page: usize,
    per_page: usize,
}

impl Default for TaskView {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl TaskView {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self {
            tasks,
            filters: TaskFilters::default(),
            search: String::new(),
            sort_by: SortKey::default(),
            order: SortOrder::default(),
            page: 1,
            per_page: TASKS_PER_PAGE,
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn sort_by(&self) -> SortKey {
        self.sort_by
    }

    pub fn order(&self) -> SortOrder {
        self.order
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn has_active_filters(&self) -> bool {
        self.filters.is_active()
    }

    /// Every task that survives the filters, in display order.
    pub fn filtered(&self) -> Vec<Task> {
        let matching = filter_tasks(&self.tasks, &self.filters, Some(self.search.as_str()));
        sort_tasks(&matching, self.sort_by, self.order)
    }

    pub fn total_pages(&self) -> usize {
        self.filtered().len().div_ceil(self.per_page)
    }

    /// The rows of the current page.
    pub fn visible(&self) -> Vec<Task> {
        self.filtered()
            .into_iter()
            .skip((self.page - 1) * self.per_page)
            .take(self.per_page)
            .collect()
    }

    pub fn apply(mut self, action: TaskAction) -> Self {
        match action {
            TaskAction::Loaded(tasks) => self.tasks = tasks,
            TaskAction::Created(task) => self.tasks.push(task),
            TaskAction::Updated(task) => {
                if let Some(slot) = self.tasks.iter_mut().find(|t| t.id == task.id) {
                    *slot = task;
                }
            }
            TaskAction::Deleted(id) => self.tasks.retain(|t| t.id != id),
            TaskAction::SetFilters(filters) => self.filters = filters,
            TaskAction::SetSearch(search) => self.search = search,
            TaskAction::SetSortKey(sort_by) => self.sort_by = sort_by,
            TaskAction::SetSortOrder(order) => self.order = order,
            TaskAction::SetPage(page) => {
                self.page = page.clamp(1, self.total_pages().max(1));
                return self;
            }
            TaskAction::ClearFilters => {
                self.filters = TaskFilters::default();
                self.search.clear();
                self.sort_by = SortKey::default();
                self.order = SortOrder::default();
            }
        }
        self.page = 1;
        self
    }
}
