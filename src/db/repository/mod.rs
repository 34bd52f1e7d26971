//! Repository traits for abstracting storage operations.
//!
//! These traits define the interface the services layer talks to, allowing
//! different implementations (in-memory, a future SQL backend) to be
//! swapped via dependency injection.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::api::{PartnerId, ProjectId, TemplateId};
use crate::models::{ChartConfig, Partner, ProjectInfo, ReportTemplate, StatsRecord, Variable};

pub mod error;

pub use error::{ErrorContext, RepositoryError, RepositoryResult};

/// Where a stored template hangs in the fallback hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateScope {
    Project(ProjectId),
    Partner(PartnerId),
    Default,
}

/// Repository trait for project and stats operations.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust and allow
/// sharing across threads.
///
/// # Error Handling
/// All methods return `RepositoryResult<T>` which wraps either the expected
/// return type or a `RepositoryError` describing what went wrong.
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    // ==================== Health & Connection ====================

    /// Check if the storage backend is healthy.
    ///
    /// # Returns
    /// - `Ok(true)` if the backend is healthy
    /// - `Ok(false)` if unhealthy but no error occurred
    /// - `Err(RepositoryError)` if an error occurred during the check
    async fn health_check(&self) -> RepositoryResult<bool>;

    // ==================== Project Operations ====================

    /// Create a project and assign it an ID.
    async fn create_project(
        &self,
        name: &str,
        partner_id: Option<PartnerId>,
        event_date: Option<DateTime<Utc>>,
    ) -> RepositoryResult<ProjectInfo>;

    /// Retrieve a project by ID.
    ///
    /// # Returns
    /// * `Ok(ProjectInfo)` - The project
    /// * `Err(RepositoryError::NotFound)` - If the project doesn't exist
    async fn get_project(&self, project_id: ProjectId) -> RepositoryResult<ProjectInfo>;

    /// List all projects.
    async fn list_projects(&self) -> RepositoryResult<Vec<ProjectInfo>>;

    /// Create a partner and assign it an ID.
    async fn create_partner(&self, name: &str) -> RepositoryResult<Partner>;

    /// Retrieve a partner by ID.
    ///
    /// # Returns
    /// * `Ok(Partner)` - The partner
    /// * `Err(RepositoryError::NotFound)` - If the partner doesn't exist
    async fn get_partner(&self, partner_id: PartnerId) -> RepositoryResult<Partner>;

    // ==================== Stats Record Operations ====================

    /// Retrieve the stats record of a project.
    ///
    /// # Returns
    /// * `Ok(Some(StatsRecord))` - The stored record
    /// * `Ok(None)` - If no record has been written yet; a missing record
    ///   is normal before an event starts, not an error
    async fn get_stats_record(
        &self,
        project_id: ProjectId,
    ) -> RepositoryResult<Option<StatsRecord>>;

    /// Replace the stats record of a project wholesale.
    ///
    /// Records are replaced, never merged: keys absent from `record` are
    /// absent after the write.
    ///
    /// # Returns
    /// * `Ok(())` - If stored
    /// * `Err(RepositoryError::NotFound)` - If the project doesn't exist
    async fn replace_stats_record(
        &self,
        project_id: ProjectId,
        record: &StatsRecord,
    ) -> RepositoryResult<()>;
}

/// Repository trait for the variable and chart catalogs.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    // ==================== Variable Operations ====================

    /// List stored custom variables.
    ///
    /// Built-in variables live in code, not storage; this returns only
    /// the user-defined ones, in insertion order.
    async fn list_variables(&self) -> RepositoryResult<Vec<Variable>>;

    /// Store a custom variable, replacing any stored variable of the same
    /// name.
    async fn store_variable(&self, variable: &Variable) -> RepositoryResult<()>;

    // ==================== Chart Configuration Operations ====================

    /// List all chart configurations in insertion order.
    async fn list_chart_configs(&self) -> RepositoryResult<Vec<ChartConfig>>;

    /// Retrieve a chart configuration by its key.
    ///
    /// # Returns
    /// * `Ok(ChartConfig)` - The configuration
    /// * `Err(RepositoryError::NotFound)` - If no chart has that key
    async fn get_chart_config(&self, chart_id: &str) -> RepositoryResult<ChartConfig>;

    /// Store a chart configuration, replacing any existing configuration
    /// with the same key.
    async fn store_chart_config(&self, chart: &ChartConfig) -> RepositoryResult<()>;
}

/// Repository trait for report templates.
///
/// Templates are stored per hierarchy level; the getters return `None`
/// when a level has nothing attached, which the resolver treats as "try
/// the next level", not as an error.
#[async_trait]
pub trait TemplateRepository: Send + Sync {
    /// Template attached directly to a project.
    async fn get_project_template(
        &self,
        project_id: ProjectId,
    ) -> RepositoryResult<Option<ReportTemplate>>;

    /// Template attached to a partner.
    async fn get_partner_template(
        &self,
        partner_id: PartnerId,
    ) -> RepositoryResult<Option<ReportTemplate>>;

    /// The single global default template.
    async fn get_default_template(&self) -> RepositoryResult<Option<ReportTemplate>>;

    /// Store a template at a hierarchy level.
    ///
    /// # Returns
    /// * `Ok(TemplateId)` - The ID assigned to the stored template
    async fn store_template(
        &self,
        template: &ReportTemplate,
        scope: TemplateScope,
    ) -> RepositoryResult<TemplateId>;
}

/// Combined repository interface covering all storage concerns.
///
/// Service orchestrators take `&dyn FullRepository` so one handle reaches
/// every operation. Any type implementing the three sub-traits gets this
/// for free.
pub trait FullRepository: ProjectRepository + CatalogRepository + TemplateRepository {}

impl<T> FullRepository for T where T: ProjectRepository + CatalogRepository + TemplateRepository {}

/// Trait objects carry no type information, so `Debug` must be provided
/// explicitly for `Result<Arc<dyn FullRepository>, _>` to be unwrappable.
impl std::fmt::Debug for dyn FullRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn FullRepository")
    }
}
