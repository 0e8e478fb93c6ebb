use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::error;
use sqlx::mysql::{MySqlPool, MySqlPoolOptions};

use super::TaskStore;
use crate::error::{TaskError, TaskResult};
use crate::models::task::{NewTask, Priority, Task, TaskChanges};

const CREATE_TASKS_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS tasks (
        id BIGINT NOT NULL AUTO_INCREMENT PRIMARY KEY,
        title VARCHAR(100) NOT NULL,
        description TEXT NOT NULL,
        status VARCHAR(255) NULL,
        priority VARCHAR(16) NOT NULL DEFAULT 'Low',
        due_date DATETIME(3) NOT NULL,
        is_completed BOOLEAN NOT NULL DEFAULT FALSE,
        created_at DATETIME(3) NOT NULL,
        updated_at DATETIME(3) NOT NULL
    )
";

const SELECT_TASK: &str = "
    SELECT id, title, description, status, priority, due_date, is_completed, created_at, updated_at
    FROM tasks
";

#[derive(sqlx::FromRow)]
struct TaskRow {
    id: i64,
    title: String,
    description: String,
    status: Option<String>,
    priority: String,
    due_date: DateTime<Utc>,
    is_completed: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<TaskRow> for Task {
    type Error = TaskError;

    fn try_from(row: TaskRow) -> Result<Self, Self::Error> {
        let priority: Priority = row.priority.parse().map_err(|_| {
            error!("Task {} has unknown priority {:?}", row.id, row.priority);
            TaskError::CorruptRow {
                id: row.id,
                reason: format!("unknown priority {:?}", row.priority),
            }
        })?;

        Ok(Task {
            id: row.id,
            title: row.title,
            description: row.description,
            status: row.status,
            priority,
            due_date: row.due_date,
            is_completed: row.is_completed,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

pub struct MySqlTaskStore {
    pool: MySqlPool,
}

impl MySqlTaskStore {
    pub async fn connect(database_url: &str, max_connections: u32) -> TaskResult<Self> {
        let pool = MySqlPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    pub async fn ensure_schema(&self) -> TaskResult<()> {
        sqlx::query(CREATE_TASKS_TABLE).execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl TaskStore for MySqlTaskStore {
    async fn list(&self) -> TaskResult<Vec<Task>> {
        let rows = sqlx::query_as::<_, TaskRow>(&format!("{} ORDER BY id", SELECT_TASK))
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(Task::try_from).collect()
    }

    async fn get(&self, id: i64) -> TaskResult<Option<Task>> {
        let row = sqlx::query_as::<_, TaskRow>(&format!("{} WHERE id = ?", SELECT_TASK))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Task::try_from).transpose()
    }

    async fn create(&self, task: NewTask) -> TaskResult<Task> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO tasks (title, description, status, priority, due_date, is_completed, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&task.title)
        .bind(&task.description)
        .bind(&task.status)
        .bind(task.priority.as_str())
        .bind(task.due_date)
        .bind(task.is_completed)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_id() as i64;
        self.get(id).await?.ok_or(TaskError::NotFound(id))
    }

    async fn update(&self, id: i64, changes: TaskChanges) -> TaskResult<Task> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "UPDATE tasks SET
                title = COALESCE(?, title),
                description = COALESCE(?, description),
                status = COALESCE(?, status),
                priority = COALESCE(?, priority),
                due_date = COALESCE(?, due_date),
                is_completed = COALESCE(?, is_completed),
                updated_at = ?
             WHERE id = ?",
        )
        .bind(changes.title)
        .bind(changes.description)
        .bind(changes.status)
        .bind(changes.priority.map(Priority::as_str))
        .bind(changes.due_date)
        .bind(changes.is_completed)
        .bind(Utc::now())
        .bind(id)
        .execute(&mut *tx)
        .await?;

        // MySQL reports zero affected rows for no-op updates, so existence is checked by reading back.
        let row = sqlx::query_as::<_, TaskRow>(&format!("{} WHERE id = ?", SELECT_TASK))
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(TaskError::NotFound(id))?;
        tx.commit().await?;

        Task::try_from(row)
    }

    async fn toggle_completion(&self, id: i64) -> TaskResult<Task> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE tasks SET is_completed = NOT is_completed, updated_at = ? WHERE id = ?",
        )
        .bind(Utc::now())
        .bind(id)
        .execute(&mut *tx)
        .await?;
        if result.rows_affected() == 0 {
            return Err(TaskError::NotFound(id));
        }

        let row = sqlx::query_as::<_, TaskRow>(&format!("{} WHERE id = ?", SELECT_TASK))
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(TaskError::NotFound(id))?;
        tx.commit().await?;

        Task::try_from(row)
    }

    async fn delete(&self, id: i64) -> TaskResult<()> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(TaskError::NotFound(id));
        }
        Ok(())
    }
}
