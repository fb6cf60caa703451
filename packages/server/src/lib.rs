#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the Kintr admin dashboard.
//!
//! Serves read-only aggregate statistics over the `users` collection of the
//! document store. Each request reads the whole collection and runs the
//! `kintr_analytics` aggregations over it; the city reference index is
//! loaded once at startup and shared by all workers.

pub mod config;
mod handlers;

use std::path::Path;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use kintr_database::{DocumentStore, FirebaseStore, MemoryStore};
use kintr_geography::GeoIndex;

use crate::config::{ServerConfig, StoreBackend};

/// Store path of the user profile collection.
pub const USERS_PATH: &str = "users";

/// Shared application state.
pub struct AppState {
    /// Document store holding the `users` collection.
    pub store: Arc<dyn DocumentStore>,
    /// City reference index for nearest-city resolution.
    pub geo: Arc<GeoIndex>,
}

/// Registers the dashboard routes under `/api/v1`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .route("/health", web::get().to(handlers::health))
            .route("/total_users", web::get().to(handlers::total_users))
            .route("/top_locations", web::get().to(handlers::top_locations))
            .route("/top_colleges", web::get().to(handlers::top_colleges))
            .route("/user_locations", web::get().to(handlers::user_locations))
            .route("/recent_accounts", web::get().to(handlers::recent_accounts))
            .route(
                "/get_user_demographics",
                web::get().to(handlers::user_demographics),
            )
            .route("/get_all_users", web::get().to(handlers::all_users))
            .route(
                "/get_paginated_users",
                web::get().to(handlers::paginated_users),
            ),
    );
}

fn startup_error(context: &str, e: impl std::error::Error + Send + Sync + 'static) -> std::io::Error {
    log::error!("{context}: {e}");
    std::io::Error::other(e)
}

fn open_store(backend: &StoreBackend) -> std::io::Result<Arc<dyn DocumentStore>> {
    match backend {
        StoreBackend::Firebase { url, auth_token } => {
            log::info!("Using Realtime Database at {url}");
            Ok(Arc::new(FirebaseStore::new(url, auth_token.clone())))
        }
        StoreBackend::Memory { seed_path: None } => {
            log::warn!("Using an empty in-memory store");
            Ok(Arc::new(MemoryStore::new()))
        }
        StoreBackend::Memory {
            seed_path: Some(path),
        } => {
            log::info!("Seeding in-memory store from {}", path.display());
            let raw = std::fs::read_to_string(path)
                .map_err(|e| startup_error("Failed to read seed file", e))?;
            let root = serde_json::from_str(&raw)
                .map_err(|e| startup_error("Failed to parse seed file", e))?;
            Ok(Arc::new(MemoryStore::with_root(root)))
        }
    }
}

/// Loads the city reference index.
///
/// # Errors
///
/// Returns an error if the file is missing or invalid.
pub fn load_geo_index(path: &Path) -> std::io::Result<GeoIndex> {
    let geo = GeoIndex::load(path).map_err(|e| startup_error("Failed to load city index", e))?;
    if geo.city_count() == 0 {
        log::warn!("{} contains no eligible cities", path.display());
    }
    Ok(geo)
}

/// Starts the admin API server.
///
/// Reads [`ServerConfig`] from the environment, loads the city index, opens
/// the document store and serves until shut down. The caller provides the
/// async runtime (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the configuration is incomplete,
/// the city index or seed file cannot be loaded, or the HTTP server fails to
/// bind or encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let config =
        ServerConfig::from_env().map_err(|e| startup_error("Invalid configuration", e))?;

    log::info!("Loading city index...");
    let geo = load_geo_index(&config.cities_kml_path)?;
    let store = open_store(&config.store)?;

    let state = web::Data::new(AppState {
        store,
        geo: Arc::new(geo),
    });

    let ServerConfig {
        bind_addr, port, ..
    } = config;

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
