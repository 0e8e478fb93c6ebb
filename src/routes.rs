use actix_web::{HttpResponse, Responder};

pub mod routes;

pub mod tasks {
    pub mod tasks_handlers;
    pub mod tasks_models;
}

pub async fn index() -> impl Responder {
    HttpResponse::Ok().body("Task Management API is running")
}
