use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use std::io;

use taskgate::config::Config;
use taskgate::routes::health;
use taskgate::Services;

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env().map_err(|e| {
        log::error!("invalid configuration: {}", e);
        io::Error::new(io::ErrorKind::InvalidInput, e.to_string())
    })?;

    let services = Services::from_config(&config).await.map_err(|e| {
        log::error!("startup failed: {}", e);
        io::Error::new(io::ErrorKind::Other, e.to_string())
    })?;

    log::info!("starting server at {}", config.server_url());
    HttpServer::new(move || {
        let services = services.clone();
        App::new()
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .service(health::health)
            .service(web::scope("/api").configure(move |cfg| services.configure(cfg)))
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
