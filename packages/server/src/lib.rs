#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for hardhat housing.
//!
//! Serves the "Plan My Move" endpoint and job site lookups. All data access
//! goes through a [`HousingStore`]; in production that is
//! [`store::PgHousingStore`] over the Postgres metrics views.

mod handlers;
pub mod interactive;
pub mod store;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::error::InternalError;
use actix_web::{App, HttpResponse, HttpServer, middleware, web};
use hardhat_database::{db, run_migrations};
use hardhat_planner::HousingStore;
use hardhat_server_models::ApiError;

use crate::store::PgHousingStore;

/// Shared application state.
pub struct AppState {
    /// Job sites, metrics, and listings.
    pub store: Arc<dyn HousingStore>,
}

/// Turns a request extraction failure into a JSON 400.
fn bad_request<E>(err: E) -> actix_web::Error
where
    E: std::fmt::Debug + std::fmt::Display + 'static,
{
    let body = ApiError::new(err.to_string());
    InternalError::from_response(err, HttpResponse::BadRequest().json(body)).into()
}

/// Registers the `/api` routes.
///
/// Malformed query strings, JSON bodies, and path segments get the same
/// [`ApiError`] body as other 400s.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .app_data(web::QueryConfig::default().error_handler(|err, _req| bad_request(err)))
            .app_data(web::JsonConfig::default().error_handler(|err, _req| bad_request(err)))
            .app_data(web::PathConfig::default().error_handler(|err, _req| bad_request(err)))
            .route("/health", web::get().to(handlers::health))
            .route("/jobsites", web::get().to(handlers::jobsites))
            .route("/jobsites/{slug}", web::get().to(handlers::jobsite))
            .route("/jobsites/{slug}/hubs", web::get().to(handlers::jobsite_hubs))
            .route("/plan-move", web::get().to(handlers::plan_move_get))
            .route("/plan-move", web::post().to(handlers::plan_move_post)),
    );
}

/// Starts the hardhat housing API server.
///
/// Connects to Postgres (`DATABASE_URL`), runs migrations, and serves on
/// `BIND_ADDR:PORT` (default `127.0.0.1:8080`). The caller provides the
/// async runtime (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the database connection or
/// migrations fail, or if the HTTP server fails to bind.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    log::info!("Connecting to database...");
    let db_conn = db::connect_from_env()
        .await
        .map_err(|e| std::io::Error::other(format!("Failed to connect to database: {e}")))?;

    log::info!("Running migrations...");
    run_migrations(db_conn.as_ref())
        .await
        .map_err(|e| std::io::Error::other(format!("Failed to run migrations: {e}")))?;

    let state = web::Data::new(AppState {
        store: Arc::new(PgHousingStore::new(Arc::from(db_conn))),
    });

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
