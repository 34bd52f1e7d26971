//! High-level database service layer.
//!
//! This module provides repository-agnostic database operations that work with
//! any implementation of the repository traits. These functions contain
//! business logic such as registry-aware validation, stats zero-initialization
//! and checksum-based write deduplication that should be consistent regardless
//! of the storage backend.
//!
//! # Architecture
//!
//! The database module follows a layered architecture:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Application Layer (REST API, report pipeline)          │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Service Layer (services.rs) - Business Logic           │
//! │  - Registry-aware validation of writes                   │
//! │  - Stats record zero-initialization                      │
//! │  - Checksum-based write deduplication                    │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Repository Traits (repository/) - Abstract Interface    │
//! │  - ProjectRepository (projects, partners, stats)         │
//! │  - CatalogRepository (variables, chart configs)          │
//! │  - TemplateRepository (template hierarchy slots)         │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Local Repository (in-memory)                            │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use fansight_rust::db::{services, repositories::LocalRepository};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let repo = LocalRepository::new();
//!
//!     let projects = services::list_projects(&repo).await?;
//!     println!("Found {} projects", projects.len());
//!
//!     Ok(())
//! }
//! ```

use chrono::{DateTime, Utc};
use log::{info, warn};

use super::checksum::payload_checksum;
use super::models::{
    ChartConfig, Partner, PartnerId, ProjectId, ProjectInfo, ReportTemplate, StatValue,
    StatsRecord, TemplateId, Variable,
};
use super::repository::{FullRepository, RepositoryError, RepositoryResult, TemplateScope};
use crate::formula::parse_formula;
use crate::models::{ChartType, VariableType};
use crate::registry::VariableRegistry;
use crate::services::templates::TemplateCandidates;

// ==================== Health & Connection ====================

/// Check if the storage backend is healthy.
///
/// This is a simple pass-through to the repository's health check.
///
/// # Arguments
/// * `repo` - Repository implementation
///
/// # Returns
/// * `Ok(true)` if the backend is healthy
/// * `Err` if check fails
pub async fn health_check<R: FullRepository + ?Sized>(repo: &R) -> RepositoryResult<bool> {
    repo.health_check().await
}

// ==================== Project Operations ====================

/// Create a project and initialize its statistics record.
///
/// Every non-derived numeric variable known to the registry starts at 0 so
/// the clicker and the builder have a complete record to increment from day
/// one. Text slots stay absent until someone writes them.
///
/// # Arguments
/// * `repo` - Repository implementation
/// * `registry` - Variable registry used for zero-initialization
/// * `name` - Project display name
/// * `partner_id` - Owning partner, if any
/// * `event_date` - Scheduled event date, if known
///
/// # Returns
/// * `Ok(ProjectInfo)` - The created project
/// * `Err` if validation or storage fails
pub async fn create_project<R: FullRepository + ?Sized>(
    repo: &R,
    registry: &VariableRegistry,
    name: &str,
    partner_id: Option<PartnerId>,
    event_date: Option<DateTime<Utc>>,
) -> RepositoryResult<ProjectInfo> {
    if name.trim().is_empty() {
        return Err(RepositoryError::validation("Project name must not be empty"));
    }

    let project = repo.create_project(name, partner_id, event_date).await?;

    let mut record = StatsRecord::new();
    for variable in registry.list() {
        if variable.derived || variable.var_type == VariableType::Text {
            continue;
        }
        record.set_number(variable.name.clone(), 0.0);
    }
    repo.replace_stats_record(project.id, &record).await?;

    info!(
        "Service layer: created project '{}' (id={}, {} stats fields initialized)",
        project.name,
        project.id,
        record.len()
    );

    Ok(project)
}

/// Retrieve a project by ID.
///
/// # Returns
/// * `Ok(ProjectInfo)` - The project
/// * `Err` if the project is not found or retrieval fails
pub async fn get_project<R: FullRepository + ?Sized>(
    repo: &R,
    project_id: ProjectId,
) -> RepositoryResult<ProjectInfo> {
    repo.get_project(project_id).await
}

/// List all projects.
///
/// # Returns
/// * `Ok(Vec<ProjectInfo>)` - Projects ordered by ID
/// * `Err` if query fails
pub async fn list_projects<R: FullRepository + ?Sized>(
    repo: &R,
) -> RepositoryResult<Vec<ProjectInfo>> {
    repo.list_projects().await
}

/// Create a partner.
///
/// # Returns
/// * `Ok(Partner)` - The created partner
/// * `Err` if validation or storage fails
pub async fn create_partner<R: FullRepository + ?Sized>(
    repo: &R,
    name: &str,
) -> RepositoryResult<Partner> {
    if name.trim().is_empty() {
        return Err(RepositoryError::validation("Partner name must not be empty"));
    }
    repo.create_partner(name).await
}

// ==================== Stats Record Operations ====================

/// Retrieve the statistics record of a project.
///
/// A project that exists but has no stored record yet yields an empty
/// record; a missing project is an error.
///
/// # Returns
/// * `Ok(StatsRecord)` - The stored record, or an empty one
/// * `Err` if the project is not found or retrieval fails
pub async fn get_stats_record<R: FullRepository + ?Sized>(
    repo: &R,
    project_id: ProjectId,
) -> RepositoryResult<StatsRecord> {
    repo.get_project(project_id).await?;
    Ok(repo
        .get_stats_record(project_id)
        .await?
        .unwrap_or_default())
}

/// Write one raw value into a project's statistics record.
///
/// This is the builder's save channel: validate the variable against the
/// registry, read the current record, set the one value, and replace the
/// record wholesale. A write that would not change the record is skipped.
///
/// # Arguments
/// * `repo` - Repository implementation
/// * `registry` - Variable registry the write is validated against
/// * `project_id` - Project whose record is updated
/// * `name` - Variable name (must exist, must not be derived)
/// * `value` - New raw value (must match the variable's type)
///
/// # Returns
/// * `Ok(StatsRecord)` - The record after the write
/// * `Err(RepositoryError::ValidationError)` - If the variable is unknown,
///   derived, or the value has the wrong type
pub async fn update_stat_value<R: FullRepository + ?Sized>(
    repo: &R,
    registry: &VariableRegistry,
    project_id: ProjectId,
    name: &str,
    value: StatValue,
) -> RepositoryResult<StatsRecord> {
    let variable = registry
        .resolve(name)
        .ok_or_else(|| RepositoryError::validation(format!("Unknown variable: {}", name)))?;

    if variable.derived {
        return Err(RepositoryError::validation(format!(
            "Variable {} is derived and cannot be written",
            name
        )));
    }

    let value_matches = match variable.var_type {
        VariableType::Text => matches!(value, StatValue::Text(_)),
        _ => matches!(value, StatValue::Number(_)),
    };
    if !value_matches {
        let expected = if variable.var_type == VariableType::Text {
            "text"
        } else {
            "numeric"
        };
        return Err(RepositoryError::validation(format!(
            "Variable {} expects a {} value",
            name, expected
        )));
    }

    repo.get_project(project_id).await?;

    let mut record = repo
        .get_stats_record(project_id)
        .await?
        .unwrap_or_default();
    let before = payload_checksum(&record);
    record.set(name, value);

    if payload_checksum(&record) == before {
        info!(
            "Service layer: stat {} unchanged for project {}, skipping write",
            name, project_id
        );
        return Ok(record);
    }

    repo.replace_stats_record(project_id, &record).await?;
    Ok(record)
}

// ==================== Variable Catalog Operations ====================

/// Build the live variable registry from built-ins plus stored customs.
///
/// Stored variables that no longer pass registration (for example a derived
/// formula referencing a deleted variable) are skipped with a warning; one
/// bad catalog row must not take the whole registry down.
///
/// # Returns
/// * `Ok(VariableRegistry)` - Registry ready for formula evaluation
/// * `Err` if the catalog cannot be read
pub async fn load_registry<R: FullRepository + ?Sized>(
    repo: &R,
) -> RepositoryResult<VariableRegistry> {
    let mut registry = VariableRegistry::with_builtins();

    for variable in repo.list_variables().await? {
        let name = variable.name.clone();
        if let Err(e) = registry.register(variable) {
            warn!("Service layer: skipping stored variable '{}': {}", name, e);
        }
    }

    Ok(registry)
}

/// Register a custom variable and persist it.
///
/// The registration is staged on a registry copy first so a definition the
/// registry rejects is never written to storage, and a storage failure
/// leaves the live registry untouched.
///
/// # Returns
/// * `Ok(Variable)` - The stored variable, forced `is_custom`
/// * `Err(RepositoryError::ValidationError)` - If the registry rejects it
pub async fn register_custom_variable<R: FullRepository + ?Sized>(
    repo: &R,
    registry: &mut VariableRegistry,
    mut variable: Variable,
) -> RepositoryResult<Variable> {
    variable.is_custom = true;

    let mut staged = registry.clone();
    staged
        .register(variable.clone())
        .map_err(|e| RepositoryError::validation(e.to_string()))?;

    repo.store_variable(&variable).await?;
    *registry = staged;

    info!(
        "Service layer: registered custom variable '{}' ({:?})",
        variable.name, variable.var_type
    );
    Ok(variable)
}

// ==================== Chart Catalog Operations ====================

/// List all chart configurations.
pub async fn list_chart_configs<R: FullRepository + ?Sized>(
    repo: &R,
) -> RepositoryResult<Vec<ChartConfig>> {
    repo.list_chart_configs().await
}

/// Validate and store a chart configuration.
///
/// Element counts are checked per chart type and every formula must parse.
/// Image elements carrying a direct `image_url` are exempt from formula
/// parsing; the URL wins at calculation time and the formula is never read.
///
/// # Returns
/// * `Ok(())` - Configuration stored
/// * `Err(RepositoryError::ValidationError)` - If the configuration is
///   structurally invalid or a formula does not parse
pub async fn store_chart_config<R: FullRepository + ?Sized>(
    repo: &R,
    chart: &ChartConfig,
) -> RepositoryResult<()> {
    chart
        .validate()
        .map_err(|e| RepositoryError::validation(format!("Chart {}: {}", chart.chart_id, e)))?;

    for element in &chart.elements {
        if chart.chart_type == ChartType::Image && element.image_url.is_some() {
            continue;
        }
        parse_formula(&element.formula).map_err(|e| {
            RepositoryError::validation(format!(
                "Chart {} formula '{}' does not parse: {}",
                chart.chart_id, element.formula, e
            ))
        })?;
    }

    repo.store_chart_config(chart).await
}

// ==================== Template Operations ====================

/// Validate and store a report template at a hierarchy level.
///
/// # Returns
/// * `Ok(TemplateId)` - The ID assigned to the stored template
/// * `Err(RepositoryError::ValidationError)` - If the template is invalid
pub async fn store_template<R: FullRepository + ?Sized>(
    repo: &R,
    template: &ReportTemplate,
    scope: TemplateScope,
) -> RepositoryResult<TemplateId> {
    if template.name.trim().is_empty() {
        return Err(RepositoryError::validation("Template name must not be empty"));
    }
    if template.blocks.iter().any(|b| b.chart_id.trim().is_empty()) {
        return Err(RepositoryError::validation(format!(
            "Template '{}' has a block without a chart id",
            template.name
        )));
    }

    repo.store_template(template, scope).await
}

/// Fetch the template candidates for one resolution pass.
///
/// The partner slot is only consulted when the project declares a partner.
///
/// # Returns
/// * `Ok(TemplateCandidates)` - Whatever the hierarchy has stored
/// * `Err` if a lookup fails
pub async fn fetch_template_candidates<R: FullRepository + ?Sized>(
    repo: &R,
    project: &ProjectInfo,
) -> RepositoryResult<TemplateCandidates> {
    let project_template = repo.get_project_template(project.id).await?;
    let partner_template = match project.partner_id {
        Some(partner_id) => repo.get_partner_template(partner_id).await?,
        None => None,
    };
    let default_template = repo.get_default_template().await?;

    Ok(TemplateCandidates {
        project: project_template,
        partner: partner_template,
        default: default_template,
    })
}
