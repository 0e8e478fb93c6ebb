pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod store;

pub use error::{TaskError, TaskResult};
pub use models::task::{NewTask, Priority, Task, TaskChanges};
pub use store::TaskStore;
