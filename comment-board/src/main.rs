mod cli;

use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::Context;
use clap::Parser;
use cli::Cli;
use comment_board::config::AppConfig;
use comment_board::database::Database;
use comment_board::handlers::AppState;
use comment_board::logging::init_logging;
use comment_board::routes::{configure_routes, cors};
use std::sync::Arc;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    init_logging(&config.logging.level)?;

    tracing::info!("Starting comment board service");

    let database = Arc::new(
        Database::open(&config.database.path)
            .with_context(|| format!("Failed to open database at {:?}", config.database.path))?,
    );

    let app_state = web::Data::new(AppState {
        database: Arc::clone(&database),
    });
    let allowed_origins = config.cors.allowed_origins.clone();

    let server_addr = config.bind_address();
    tracing::info!("Starting HTTP server on {}", server_addr);

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(cors(&allowed_origins))
            .wrap(Logger::default())
            .configure(configure_routes)
    })
    .bind(&server_addr)
    .with_context(|| format!("Failed to bind HTTP server to {server_addr}"))?
    .run()
    .await
    .context("HTTP server failed")?;

    tracing::info!("HTTP server stopped");

    // Workers hold clones of the state until the server is fully torn down
    match Arc::try_unwrap(database) {
        Ok(database) => database.close()?,
        Err(_) => tracing::warn!("Database still shared at shutdown, dropping connection"),
    }

    Ok(())
}
