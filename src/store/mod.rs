//! Persistence for tasks.
//!
//! `MySqlTaskStore` is the production backend. `MemoryTaskStore` backs the
//! server when no database is configured and is what the tests run against.

use std::sync::Arc;

use async_trait::async_trait;
use log::{info, warn};

use crate::config::Config;
use crate::error::TaskResult;
use crate::models::task::{NewTask, Task, TaskChanges};

pub mod memory_store;
pub mod mysql_store;

pub use memory_store::MemoryTaskStore;
pub use mysql_store::MySqlTaskStore;

#[async_trait]
pub trait TaskStore: Send + Sync {
    /// All tasks in ascending id order.
    async fn list(&self) -> TaskResult<Vec<Task>>;

    async fn get(&self, id: i64) -> TaskResult<Option<Task>>;

    async fn create(&self, task: NewTask) -> TaskResult<Task>;

    /// Applies `changes` and refreshes `updated_at`. Fails with `NotFound`
    /// and creates nothing when the id is absent.
    async fn update(&self, id: i64, changes: TaskChanges) -> TaskResult<Task>;

    /// Negates `is_completed` in one atomic step and returns the new row.
    async fn toggle_completion(&self, id: i64) -> TaskResult<Task>;

    async fn delete(&self, id: i64) -> TaskResult<()>;
}

/// Opens the store selected by `config`.
pub async fn connect(config: &Config) -> TaskResult<Arc<dyn TaskStore>> {
    match &config.database_url {
        Some(url) => {
            let store = MySqlTaskStore::connect(url, config.max_connections).await?;
            store.ensure_schema().await?;
            info!("Using MySQL task store");
            Ok(Arc::new(store))
        }
        None => {
            warn!("DATABASE_URL is not set, tasks will be kept in memory only");
            Ok(Arc::new(MemoryTaskStore::new()))
        }
    }
}
