use actix_web::{web, HttpResponse, Responder};
use chrono::Utc;
use log::{error, info};

use super::tasks_models::{ErrorResponse, TaskRequest, INTERNAL_ERROR, TASK_NOT_FOUND};
use crate::error::TaskError;
use crate::store::TaskStore;

// Reads an optional sign and the leading decimal digits, ignoring whatever follows
// ("12abc" and "12.5" are both 12). No leading digits means no id.
fn parse_task_id(raw: &str) -> Option<i64> {
    let raw = raw.trim_start();
    let sign_len = usize::from(raw.starts_with(['+', '-']));
    let digits_len = raw[sign_len..]
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();
    if digits_len == 0 {
        return None;
    }
    raw[..sign_len + digits_len].parse().ok()
}

fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ErrorResponse::new(TASK_NOT_FOUND))
}

fn error_response(action: &str, err: TaskError) -> HttpResponse {
    match err {
        TaskError::NotFound(id) => {
            info!("Task {} not found while trying to {}", id, action);
            not_found()
        }
        TaskError::Validation(message) => {
            info!("Rejected request to {}: {}", action, message);
            HttpResponse::BadRequest().json(ErrorResponse::new(message))
        }
        other => {
            error!("Failed to {}: {}", action, other);
            HttpResponse::InternalServerError().json(ErrorResponse::new(INTERNAL_ERROR))
        }
    }
}

// GET /tasks
pub async fn get_tasks(store: web::Data<dyn TaskStore>) -> impl Responder {
    match store.list().await {
        Ok(tasks) => {
            info!("Returning {} tasks", tasks.len());
            HttpResponse::Ok().json(tasks)
        }
        Err(e) => error_response("list tasks", e),
    }
}

// GET /tasks/{id}
pub async fn get_task(
    store: web::Data<dyn TaskStore>,
    path: web::Path<String>,
) -> impl Responder {
    let id = match parse_task_id(&path) {
        Some(id) => id,
        None => {
            info!("Invalid task id: {}", path.as_str());
            return not_found();
        }
    };

    match store.get(id).await {
        Ok(Some(task)) => HttpResponse::Ok().json(task),
        Ok(None) => {
            info!("Task {} not found", id);
            not_found()
        }
        Err(e) => error_response("fetch task", e),
    }
}

// POST /tasks
pub async fn create_task(
    store: web::Data<dyn TaskStore>,
    request: web::Json<TaskRequest>,
) -> impl Responder {
    let new_task = match request.into_inner().into_new_task(Utc::now()) {
        Ok(new_task) => new_task,
        Err(e) => return error_response("create task", e),
    };

    match store.create(new_task).await {
        Ok(task) => {
            info!("Created task {}: {}", task.id, task.title);
            HttpResponse::Created().json(task)
        }
        Err(e) => error_response("create task", e),
    }
}

// PUT /tasks/{id}
pub async fn update_task(
    store: web::Data<dyn TaskStore>,
    path: web::Path<String>,
    request: web::Json<TaskRequest>,
) -> impl Responder {
    let id = match parse_task_id(&path) {
        Some(id) => id,
        None => {
            info!("Invalid task id: {}", path.as_str());
            return not_found();
        }
    };
    let changes = match request.into_inner().into_changes() {
        Ok(changes) => changes,
        Err(e) => return error_response("update task", e),
    };

    match store.update(id, changes).await {
        Ok(task) => {
            info!("Updated task {}", task.id);
            HttpResponse::Ok().json(task)
        }
        Err(e) => error_response("update task", e),
    }
}

// PATCH /tasks/{id}/toggle
pub async fn toggle_task(
    store: web::Data<dyn TaskStore>,
    path: web::Path<String>,
) -> impl Responder {
    let id = match parse_task_id(&path) {
        Some(id) => id,
        None => {
            info!("Invalid task id: {}", path.as_str());
            return not_found();
        }
    };

    match store.toggle_completion(id).await {
        Ok(task) => {
            info!("Task {} is now {}", task.id, if task.is_completed { "completed" } else { "pending" });
            HttpResponse::Ok().json(task)
        }
        Err(e) => error_response("toggle task", e),
    }
}

// DELETE /tasks/{id}
pub async fn delete_task(
    store: web::Data<dyn TaskStore>,
    path: web::Path<String>,
) -> impl Responder {
    let id = match parse_task_id(&path) {
        Some(id) => id,
        None => {
            info!("Invalid task id: {}", path.as_str());
            return not_found();
        }
    };

    match store.delete(id).await {
        Ok(()) => {
            info!("Deleted task {}", id);
            HttpResponse::NoContent().finish()
        }
        Err(e) => error_response("delete task", e),
    }
}

#[cfg(test)]
mod tests {
    use super::parse_task_id;

    #[test]
    fn task_ids_are_base_ten_integers() {
        assert_eq!(parse_task_id("42"), Some(42));
        assert_eq!(parse_task_id("-3"), Some(-3));
        assert_eq!(parse_task_id("+7"), Some(7));
        assert_eq!(parse_task_id(" 8"), Some(8));
        assert_eq!(parse_task_id("abc"), None);
        assert_eq!(parse_task_id("-"), None);
        assert_eq!(parse_task_id(""), None);
    }

    #[test]
    fn task_ids_stop_at_first_non_digit() {
        assert_eq!(parse_task_id("12abc"), Some(12));
        assert_eq!(parse_task_id("4.5"), Some(4));
        assert_eq!(parse_task_id("1e3"), Some(1));
        assert_eq!(parse_task_id("a12"), None);
    }
}
