use actix_web::{error::InternalError, web, HttpResponse};

use super::tasks::tasks_handlers;
use super::tasks::tasks_models::ErrorResponse;

/// Mounts every route the API serves. Callers provide the store via `app_data`.
pub fn api_configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(super::index))
        .configure(tasks_configure);
}

pub fn tasks_configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/tasks")
            .app_data(json_config())
            .route("", web::get().to(tasks_handlers::get_tasks))
            .route("/", web::get().to(tasks_handlers::get_tasks))
            .route("", web::post().to(tasks_handlers::create_task))
            .route("/", web::post().to(tasks_handlers::create_task))
            .route("/{id}", web::get().to(tasks_handlers::get_task))
            .route("/{id}", web::put().to(tasks_handlers::update_task))
            .route("/{id}", web::delete().to(tasks_handlers::delete_task))
            .route("/{id}/toggle", web::patch().to(tasks_handlers::toggle_task))
    );
}

// Malformed bodies get the same `{ "error": ... }` shape as every other failure.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let message = err.to_string();
        InternalError::from_response(
            err,
            HttpResponse::BadRequest().json(ErrorResponse { error: message }),
        )
        .into()
    })
}
