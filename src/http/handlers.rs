//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the
//! service layer for validation and calculation.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use super::dto::{
    ChartListResponse, CreateProjectRequest, CreateVariableRequest, HealthResponse, ProjectDto,
    ProjectListResponse, UpdateStatRequest, VariableListResponse, VariablesQuery,
};
use super::error::AppError;
use super::state::AppState;
use crate::api::{BuilderData, PartnerId, PreviewData, ProjectId, ReportData, StatsRecord, Variable};
use crate::db::services as db_services;
use crate::registry::VariableFilter;
use crate::services::{build_builder_view, build_preview, build_project_report};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
///
/// Health check endpoint reporting service status and the active backend.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let repository = match db_services::health_check(state.repository.as_ref()).await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        backend: state.backend.to_string(),
        repository,
    }))
}

// =============================================================================
// Projects
// =============================================================================

/// GET /api/projects
///
/// List all projects.
pub async fn list_projects(State(state): State<AppState>) -> HandlerResult<ProjectListResponse> {
    let projects = db_services::list_projects(state.repository.as_ref()).await?;

    let project_dtos: Vec<ProjectDto> = projects.into_iter().map(Into::into).collect();
    let total = project_dtos.len();

    Ok(Json(ProjectListResponse {
        projects: project_dtos,
        total,
    }))
}

/// POST /api/projects
///
/// Create a project. Its stats record starts with every known stored numeric
/// variable at zero so the live tally can increment immediately.
pub async fn create_project(
    State(state): State<AppState>,
    Json(request): Json<CreateProjectRequest>,
) -> Result<(StatusCode, Json<ProjectDto>), AppError> {
    let registry = state.registry_snapshot().await;

    let project = db_services::create_project(
        state.repository.as_ref(),
        &registry,
        &request.name,
        request.partner_id.map(PartnerId::new),
        request.event_date,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(project.into())))
}

// =============================================================================
// Report Pipeline
// =============================================================================

/// GET /api/projects/{project_id}/report
///
/// Calculate the full report for a project: resolved template, calculated
/// blocks with responsive widths, payload checksum.
pub async fn get_report(
    State(state): State<AppState>,
    Path(project_id): Path<i64>,
) -> HandlerResult<ReportData> {
    let project_id = ProjectId::new(project_id);
    let registry = state.registry_snapshot().await;

    let data = build_project_report(
        state.repository.as_ref(),
        &registry,
        &state.resolver,
        project_id,
    )
    .await?;

    Ok(Json(data))
}

/// GET /api/projects/{project_id}/builder
///
/// Builder view: calculated blocks plus the editable fields behind each one.
pub async fn get_builder(
    State(state): State<AppState>,
    Path(project_id): Path<i64>,
) -> HandlerResult<BuilderData> {
    let project_id = ProjectId::new(project_id);
    let registry = state.registry_snapshot().await;

    let data = build_builder_view(
        state.repository.as_ref(),
        &registry,
        &state.resolver,
        project_id,
    )
    .await?;

    Ok(Json(data))
}

// =============================================================================
// Stats Records
// =============================================================================

/// GET /api/projects/{project_id}/stats
///
/// Raw statistics record for a project.
pub async fn get_stats(
    State(state): State<AppState>,
    Path(project_id): Path<i64>,
) -> HandlerResult<StatsRecord> {
    let record =
        db_services::get_stats_record(state.repository.as_ref(), ProjectId::new(project_id))
            .await?;

    Ok(Json(record))
}

/// PUT /api/projects/{project_id}/stats/{variable}
///
/// Write a single stat value and return the updated record. The value must
/// match a known, non-derived variable of the right type.
pub async fn update_stat(
    State(state): State<AppState>,
    Path((project_id, variable)): Path<(i64, String)>,
    Json(request): Json<UpdateStatRequest>,
) -> HandlerResult<StatsRecord> {
    let registry = state.registry_snapshot().await;

    let record = db_services::update_stat_value(
        state.repository.as_ref(),
        &registry,
        ProjectId::new(project_id),
        &variable,
        request.value,
    )
    .await?;

    Ok(Json(record))
}

// =============================================================================
// Variable Catalog
// =============================================================================

/// GET /api/variables
///
/// List the variable catalog, optionally filtered by category or flags.
pub async fn list_variables(
    State(state): State<AppState>,
    Query(query): Query<VariablesQuery>,
) -> HandlerResult<VariableListResponse> {
    let registry = state.registry_snapshot().await;

    let filter = VariableFilter {
        category: query.category,
        clicker_only: query.clicker.unwrap_or(false),
        editable_only: query.editable.unwrap_or(false),
    };
    let variables: Vec<Variable> = registry.filtered(&filter).into_iter().cloned().collect();
    let total = variables.len();

    Ok(Json(VariableListResponse { variables, total }))
}

/// POST /api/variables
///
/// Register a custom variable in the catalog and persist it. The registry
/// swap happens under the write lock so concurrent registrations cannot
/// lose each other.
pub async fn create_variable(
    State(state): State<AppState>,
    Json(request): Json<CreateVariableRequest>,
) -> Result<(StatusCode, Json<Variable>), AppError> {
    let variable = request.into_variable();

    let mut current = state.registry.write().await;
    let mut staged = (**current).clone();
    let stored =
        db_services::register_custom_variable(state.repository.as_ref(), &mut staged, variable)
            .await?;
    *current = Arc::new(staged);

    Ok((StatusCode::CREATED, Json(stored)))
}

// =============================================================================
// Chart Catalog
// =============================================================================

/// GET /api/charts
///
/// List the stored chart configurations.
pub async fn list_charts(State(state): State<AppState>) -> HandlerResult<ChartListResponse> {
    let charts = db_services::list_chart_configs(state.repository.as_ref()).await?;
    let total = charts.len();

    Ok(Json(ChartListResponse { charts, total }))
}

// =============================================================================
// Admin Preview
// =============================================================================

/// GET /api/preview
///
/// Calculate every active chart against a synthetic fully-populated record,
/// so configurations can be checked without a real event.
pub async fn get_preview(State(state): State<AppState>) -> HandlerResult<PreviewData> {
    let registry = state.registry_snapshot().await;

    let data = build_preview(state.repository.as_ref(), &registry).await?;

    Ok(Json(data))
}
