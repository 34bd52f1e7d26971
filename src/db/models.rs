//! Shared data models re-exported for database layer consumers.

pub use crate::api::{PartnerId, ProjectId, TemplateId};
pub use crate::models::{
    ChartConfig, ChartResult, Partner, ProjectInfo, ReportTemplate, StatValue, StatsRecord,
    Variable,
};
