//! Router configuration for the HTTP API.
//!
//! This module sets up all routes, middleware (CORS, compression, tracing),
//! and creates the axum router ready for serving.

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration - permissive for development, should be restricted in production
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build the API router
    let api = Router::new()
        // Projects
        .route("/projects", get(handlers::list_projects))
        .route("/projects", post(handlers::create_project))
        // Report pipeline
        .route("/projects/{project_id}/report", get(handlers::get_report))
        .route("/projects/{project_id}/builder", get(handlers::get_builder))
        // Stats records
        .route("/projects/{project_id}/stats", get(handlers::get_stats))
        .route("/projects/{project_id}/stats/{variable}", put(handlers::update_stat))
        // Catalog
        .route("/variables", get(handlers::list_variables))
        .route("/variables", post(handlers::create_variable))
        .route("/charts", get(handlers::list_charts))
        // Admin preview
        .route("/preview", get(handlers::get_preview));

    // Combine all routes
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api", api)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
