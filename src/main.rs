use std::io;

use actix_web::middleware::Logger;
use actix_web::{App, HttpServer, web};
use tera::Tera;

use lalafo_mini::models::config::ServerConfig;
use lalafo_mini::repository::StoreRepository;
use lalafo_mini::routes::{configure, flash_messages};

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let server_config = ServerConfig::load().map_err(|e| {
        log::error!("Failed to load server config: {e}");
        io::Error::other(e.to_string())
    })?;

    let store = server_config.store.connect().map_err(|e| {
        log::error!("Failed to set up document store: {e}");
        io::Error::other(e.to_string())
    })?;
    log::info!("Using {} document store", store.backend_tag());
    let repo = web::Data::new(StoreRepository::new(store));

    let tera = Tera::new(&server_config.templates_dir).map_err(|e| {
        log::error!("Failed to parse templates: {e}");
        io::Error::other(e.to_string())
    })?;
    let tera = web::Data::new(tera);

    let message_framework = flash_messages(&server_config.secret).map_err(|e| {
        log::error!("Invalid cookie secret: {e}");
        io::Error::other(e)
    })?;

    let bind_address = (server_config.address.clone(), server_config.port);
    log::info!(
        "Starting server on http://{}:{}",
        server_config.address,
        server_config.port
    );

    HttpServer::new(move || {
        App::new()
            .wrap(message_framework.clone())
            .wrap(Logger::default())
            .app_data(repo.clone())
            .app_data(tera.clone())
            .configure(configure)
    })
    .bind(bind_address)?
    .run()
    .await
}
