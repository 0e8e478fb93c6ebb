use thiserror::Error;

/// Errors raised by the task store and the request validation layer.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("task {0} not found")]
    NotFound(i64),

    #[error("{0}")]
    Validation(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("task {id} has an invalid stored value: {reason}")]
    CorruptRow { id: i64, reason: String },
}

impl TaskError {
    pub fn validation(message: impl Into<String>) -> Self {
        TaskError::Validation(message.into())
    }
}

pub type TaskResult<T> = Result<T, TaskError>;
