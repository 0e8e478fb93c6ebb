use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use log::{error, info};
use std::io;

use task_tracker::config::Config;
use task_tracker::routes::routes::api_configure;
use task_tracker::store::{self, TaskStore};

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env().map_err(|e| {
        error!("Invalid configuration: {}", e);
        io::Error::new(io::ErrorKind::InvalidInput, e)
    })?;

    let store = store::connect(&config).await.map_err(|e| {
        error!("Failed to open task store: {}", e);
        io::Error::new(io::ErrorKind::Other, e)
    })?;
    let store: web::Data<dyn TaskStore> = web::Data::from(store);

    let server_address = config.server_address();
    info!("Server running at http://{}", server_address);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(Cors::permissive())
            .app_data(store.clone())
            .configure(api_configure)
    })
    .bind(server_address)?
    .run()
    .await
}
