//! Shared helpers for the task API integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use chrono::{DateTime, Utc};
use task_tracker::routes::routes::api_configure;
use task_tracker::store::{MemoryTaskStore, TaskStore};
use task_tracker::{NewTask, Priority, Task};

pub fn memory_store() -> web::Data<dyn TaskStore> {
    let store: Arc<dyn TaskStore> = Arc::new(MemoryTaskStore::new());
    web::Data::from(store)
}

pub fn new_task(title: &str, priority: Priority, due_date: DateTime<Utc>) -> NewTask {
    NewTask {
        title: title.to_string(),
        description: format!("{} description", title),
        status: Some("pending".to_string()),
        priority,
        due_date,
        is_completed: false,
    }
}

pub async fn seed(store: &web::Data<dyn TaskStore>, title: &str, priority: Priority) -> Task {
    store
        .create(new_task(title, priority, Utc::now()))
        .await
        .expect("Failed to seed task")
}

/// Starts the API on an ephemeral port and returns its base URL.
pub fn spawn_server(store: web::Data<dyn TaskStore>) -> String {
    let server = HttpServer::new(move || App::new().app_data(store.clone()).configure(api_configure))
        .workers(1)
        .disable_signals()
        .bind(("127.0.0.1", 0))
        .expect("Failed to bind test server");
    let address = server.addrs()[0];
    actix_web::rt::spawn(server.run());
    format!("http://{}", address)
}
