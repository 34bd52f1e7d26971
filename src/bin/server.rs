//! FanSight HTTP Server Binary
//!
//! This is the main entry point for the FanSight REST API server.
//! It initializes the repository, loads the variable registry, sets up the
//! HTTP router, and starts serving requests.
//!
//! # Usage
//!
//! ```bash
//! # Run with the local (in-memory) repository (default)
//! cargo run --bin fansight-server --features "local-repo,http-server"
//! ```
//!
//! # Environment Variables
//!
//! - `FANSIGHT_SERVER_ADDR`: Bind address (default: 0.0.0.0:8080)
//! - `FANSIGHT_REPOSITORY_TYPE`: Repository backend (default: local)
//! - `FANSIGHT_SEED_DEMO_DATA`: Seed the demo catalog and project (default: true)
//! - `RUST_LOG`: Log filter (default: info)

use std::env;
use std::net::SocketAddr;

use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use fansight_rust::db::{self, RepositoryFactory, RepositoryType};
use fansight_rust::http::{create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("Starting FanSight HTTP Server");

    // Initialize the repository from the config file, environment otherwise
    let repo_type = RepositoryType::from_env();
    let repository = match RepositoryFactory::from_default_config().await {
        Ok(repo) => {
            info!("Repository initialized from repo_config.toml");
            repo
        }
        Err(e) => {
            info!("No repository config file ({}), using environment settings", e);
            RepositoryFactory::from_env().await?
        }
    };

    // Load the variable registry: built-ins plus stored custom variables
    let registry = db::load_registry(repository.as_ref()).await?;
    info!("Variable registry loaded with {} variables", registry.list().len());

    // Create application state
    let state = AppState::new(repository, registry, repo_type.as_str());

    // Create router with all endpoints
    let app = create_router(state);

    // Determine bind address
    let addr: SocketAddr = env::var("FANSIGHT_SERVER_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:8080".to_string())
        .parse()?;

    info!("Server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    // Start the server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
