//! # Server Configuration
//!
//! This module contains the server setup and configuration for the
//! flatmatch API.

use axum::{
    Router,
    routing::{delete, get, post, put},
};
use mongodb::Database;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::AppConfig;
use crate::handlers;

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
}

/// Creates and configures the Axum application router
pub fn create_app(state: AppState) -> Router {
    // Static segments (/flats/filter, /api/users/search) take priority over
    // the parameterised routes below them.
    Router::new()
        .route("/health", get(handlers::health))
        .route("/flats", post(handlers::flats::create_flat))
        .route("/flats", get(handlers::flats::list_flats))
        .route("/flats/filter", get(handlers::flats::filter_flats))
        .route("/flats/{id}", get(handlers::flats::get_flat))
        .route("/flats/{id}", put(handlers::flats::update_flat))
        .route("/flats/{id}", delete(handlers::flats::delete_flat))
        .route("/api/users", post(handlers::users::create_user))
        .route("/api/users", get(handlers::users::list_users))
        .route("/api/users/search", get(handlers::users::search_users))
        .route("/api/users/{id}", get(handlers::users::get_user))
        .route("/api/users/{id}", put(handlers::users::update_user))
        .route("/api/users/{id}", delete(handlers::users::delete_user))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
        .merge(SwaggerUi::new("/api-docs").url("/api-docs.json", ApiDoc::openapi()))
}

/// Starts the server with the given configuration
pub async fn run_server(
    config: AppConfig,
    db: Database,
) -> Result<(), Box<dyn std::error::Error>> {
    let state = AppState { db };
    let app = create_app(state);

    // Resolve the configured bind address
    let addr = config
        .bind_addr()
        .map_err(|e| format!("Invalid server address: {}", e))?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, profile = %config.profile, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health,
        crate::handlers::flats::create_flat,
        crate::handlers::flats::list_flats,
        crate::handlers::flats::filter_flats,
        crate::handlers::flats::get_flat,
        crate::handlers::flats::update_flat,
        crate::handlers::flats::delete_flat,
        crate::handlers::users::create_user,
        crate::handlers::users::list_users,
        crate::handlers::users::search_users,
        crate::handlers::users::get_user,
        crate::handlers::users::update_user,
        crate::handlers::users::delete_user,
    ),
    components(
        schemas(
            crate::models::Flat,
            crate::models::UpdateFlat,
            crate::models::User,
            crate::models::UpdateUser,
            crate::models::Gender,
            crate::error::ErrorBody,
            crate::handlers::Confirmation,
        )
    ),
    info(
        title = "Flat Listing Service API",
        description = "API for managing flat listings and roommate profiles",
        version = env!("CARGO_PKG_VERSION"),
    )
)]
pub struct ApiDoc;
