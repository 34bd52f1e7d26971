//! Application state for the HTTP server.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::db::repository::FullRepository;
use crate::registry::VariableRegistry;
use crate::services::TemplateResolver;

/// Shared application state passed to all handlers.
///
/// The registry lives behind the lock as an `Arc` snapshot: read paths clone
/// the `Arc` and calculate against that snapshot, catalog updates build a new
/// registry and swap the `Arc`, so in-flight calculations are never torn.
#[derive(Clone)]
pub struct AppState {
    /// Repository instance for persistence operations
    pub repository: Arc<dyn FullRepository>,
    /// Current variable registry snapshot
    pub registry: Arc<RwLock<Arc<VariableRegistry>>>,
    /// Template resolver carrying the hardcoded fallback template
    pub resolver: Arc<TemplateResolver>,
    /// Backend kind reported by the health endpoint
    pub backend: &'static str,
}

impl AppState {
    /// Create a new application state with the given repository and registry.
    pub fn new(
        repository: Arc<dyn FullRepository>,
        registry: VariableRegistry,
        backend: &'static str,
    ) -> Self {
        Self {
            repository,
            registry: Arc::new(RwLock::new(Arc::new(registry))),
            resolver: Arc::new(TemplateResolver::standard()),
            backend,
        }
    }

    /// Clone the current registry snapshot.
    pub async fn registry_snapshot(&self) -> Arc<VariableRegistry> {
        Arc::clone(&*self.registry.read().await)
    }
}
