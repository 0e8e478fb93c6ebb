use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use super::TaskStore;
use crate::error::{TaskError, TaskResult};
use crate::models::task::{NewTask, Task, TaskChanges};

#[derive(Debug)]
struct Inner {
    next_id: i64,
    tasks: BTreeMap<i64, Task>,
}

/// Process-local store. Ids are handed out monotonically and never reused.
#[derive(Debug)]
pub struct MemoryTaskStore {
    inner: Mutex<Inner>,
}

impl Default for MemoryTaskStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryTaskStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner { next_id: 1, tasks: BTreeMap::new() }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn list(&self) -> TaskResult<Vec<Task>> {
        Ok(self.lock().tasks.values().cloned().collect())
    }

    async fn get(&self, id: i64) -> TaskResult<Option<Task>> {
        Ok(self.lock().tasks.get(&id).cloned())
    }

    async fn create(&self, task: NewTask) -> TaskResult<Task> {
        let now = Utc::now();
        let mut inner = self.lock();
        let id = inner.next_id;
        inner.next_id += 1;

        let task = Task {
            id,
            title: task.title,
            description: task.description,
            status: task.status,
            priority: task.priority,
            due_date: task.due_date,
            is_completed: task.is_completed,
            created_at: now,
            updated_at: now,
        };
        inner.tasks.insert(id, task.clone());
        Ok(task)
    }

    async fn update(&self, id: i64, changes: TaskChanges) -> TaskResult<Task> {
        let mut inner = self.lock();
        let task = inner.tasks.get_mut(&id).ok_or(TaskError::NotFound(id))?;
        changes.apply_to(task, Utc::now());
        Ok(task.clone())
    }

    async fn toggle_completion(&self, id: i64) -> TaskResult<Task> {
        let mut inner = self.lock();
        let task = inner.tasks.get_mut(&id).ok_or(TaskError::NotFound(id))?;
        task.is_completed = !task.is_completed;
        task.updated_at = Utc::now();
        Ok(task.clone())
    }

    async fn delete(&self, id: i64) -> TaskResult<()> {
        self.lock()
            .tasks
            .remove(&id)
            .map(|_| ())
            .ok_or(TaskError::NotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::task::Priority;

    fn new_task(title: &str) -> NewTask {
        NewTask {
            title: title.to_string(),
            description: String::new(),
            status: Some("pending".to_string()),
            priority: Priority::Low,
            due_date: Utc::now(),
            is_completed: false,
        }
    }

    #[tokio::test]
    async fn ids_are_never_reused() {
        let store = MemoryTaskStore::new();
        let first = store.create(new_task("one")).await.unwrap();
        store.delete(first.id).await.unwrap();
        let second = store.create(new_task("two")).await.unwrap();
        assert_ne!(first.id, second.id);
        assert!(second.id > first.id);
    }

    #[tokio::test]
    async fn list_is_in_id_order() {
        let store = MemoryTaskStore::new();
        for title in ["a", "b", "c"] {
            store.create(new_task(title)).await.unwrap();
        }
        let titles: Vec<String> = store.list().await.unwrap().into_iter().map(|t| t.title).collect();
        assert_eq!(titles, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn update_missing_does_not_create() {
        let store = MemoryTaskStore::new();
        let err = store.update(42, TaskChanges::default()).await.unwrap_err();
        assert!(matches!(err, TaskError::NotFound(42)));
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn toggle_flips_only_completion() {
        let store = MemoryTaskStore::new();
        let created = store.create(new_task("flip me")).await.unwrap();

        let toggled = store.toggle_completion(created.id).await.unwrap();
        assert!(toggled.is_completed);
        assert_eq!(toggled.title, created.title);
        assert_eq!(toggled.due_date, created.due_date);
        assert_eq!(toggled.created_at, created.created_at);

        let back = store.toggle_completion(created.id).await.unwrap();
        assert!(!back.is_completed);
    }

    #[tokio::test]
    async fn delete_twice_reports_not_found() {
        let store = MemoryTaskStore::new();
        let created = store.create(new_task("gone")).await.unwrap();
        store.delete(created.id).await.unwrap();
        assert!(matches!(store.delete(created.id).await, Err(TaskError::NotFound(_))));
    }
}
