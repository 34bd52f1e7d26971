//! Data Transfer Objects for the HTTP API.
//!
//! These DTOs are used for request/response serialization in the REST API.
//! Most calculation DTOs are re-exported from the core library since they
//! already derive Serialize/Deserialize.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Re-export existing DTOs that are already serializable
pub use crate::api::{
    // Builder view
    BuilderBlock, BuilderData, EditableField,
    // Charts
    ChartConfig, ChartPayload, ChartResult, ChartSegment, ChartType, KpiValue,
    // Preview
    PreviewData, PreviewEntry,
    // Report
    ReportBlock, ReportData, ResolvedFrom,
    // Stats
    StatValue, StatsRecord,
    // Variables
    Variable, VariableFlags, VariableType,
};

/// Request body for creating a new project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProjectRequest {
    /// Display name for the project
    pub name: String,
    /// Owning partner, if any
    #[serde(default)]
    pub partner_id: Option<i64>,
    /// Scheduled event date
    #[serde(default)]
    pub event_date: Option<DateTime<Utc>>,
}

/// Project info DTO for API responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectDto {
    /// Project ID
    pub id: i64,
    /// Project name
    pub name: String,
    /// Owning partner, if any
    pub partner_id: Option<i64>,
    /// Scheduled event date
    pub event_date: Option<DateTime<Utc>>,
}

impl From<crate::api::ProjectInfo> for ProjectDto {
    fn from(info: crate::api::ProjectInfo) -> Self {
        Self {
            id: info.id.value(),
            name: info.name,
            partner_id: info.partner_id.map(|p| p.value()),
            event_date: info.event_date,
        }
    }
}

/// Project list response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectListResponse {
    /// List of projects
    pub projects: Vec<ProjectDto>,
    /// Total count
    pub total: usize,
}

/// Request body for writing a single stat value.
///
/// The value is untagged: numbers land in numeric variables, strings in text
/// variables. Type mismatches are rejected by the service layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatRequest {
    /// New value for the variable
    pub value: StatValue,
}

/// Request body for registering a custom variable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateVariableRequest {
    /// Stable key used in stats records and formulas
    pub name: String,
    /// Display label (defaults to the name)
    #[serde(default)]
    pub label: Option<String>,
    /// Value type (defaults to numeric)
    #[serde(rename = "type", default)]
    pub var_type: Option<VariableType>,
    /// Catalog category (defaults to "Custom")
    #[serde(default)]
    pub category: Option<String>,
    /// Formula, making the variable derived
    #[serde(default)]
    pub formula: Option<String>,
    /// Visibility and editability flags
    #[serde(default)]
    pub flags: VariableFlags,
}

impl CreateVariableRequest {
    /// Build the catalog entry this request describes.
    pub fn into_variable(self) -> Variable {
        let label = self.label.unwrap_or_else(|| self.name.clone());
        let var_type = self.var_type.unwrap_or(VariableType::Numeric);
        let category = self.category.unwrap_or_else(|| "Custom".to_string());

        let variable = match self.formula {
            Some(formula) => Variable::derived(self.name, label, var_type, category, formula),
            None => Variable::input(self.name, label, var_type, category),
        };
        variable.with_flags(self.flags).custom()
    }
}

/// Query parameters for the variable catalog endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VariablesQuery {
    /// Filter by catalog category
    #[serde(default)]
    pub category: Option<String>,
    /// Only variables shown in the live tally interface
    #[serde(default)]
    pub clicker: Option<bool>,
    /// Only variables editable from the manual stats form
    #[serde(default)]
    pub editable: Option<bool>,
}

/// Variable catalog response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariableListResponse {
    /// Matching catalog entries
    pub variables: Vec<Variable>,
    /// Total count
    pub total: usize,
}

/// Chart catalog response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartListResponse {
    /// Stored chart configurations
    pub charts: Vec<ChartConfig>,
    /// Total count
    pub total: usize,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status of the service
    pub status: String,
    /// Version of the API
    pub version: String,
    /// Configured backend kind
    pub backend: String,
    /// Repository connection status
    pub repository: String,
}
