//! Public API surface for the statistics backend.
//!
//! This file consolidates the ID newtypes and the DTO types external callers
//! build against. All types derive Serialize/Deserialize for JSON
//! serialization.

pub use crate::formula::EvalOutcome;
pub use crate::formula::FormulaError;
pub use crate::models::Breakpoint;
pub use crate::models::ChartConfig;
pub use crate::models::ChartElement;
pub use crate::models::ChartPayload;
pub use crate::models::ChartResult;
pub use crate::models::ChartSegment;
pub use crate::models::ChartType;
pub use crate::models::DataBlock;
pub use crate::models::GridSettings;
pub use crate::models::KpiValue;
pub use crate::models::Partner;
pub use crate::models::ProjectInfo;
pub use crate::models::ReportTemplate;
pub use crate::models::ResolvedFrom;
pub use crate::models::StatValue;
pub use crate::models::StatsRecord;
pub use crate::models::Variable;
pub use crate::models::VariableFlags;
pub use crate::models::VariableType;
pub use crate::registry::RegistryError;
pub use crate::registry::VariableFilter;
pub use crate::registry::VariableRegistry;
pub use crate::services::BlockWidths;
pub use crate::services::BuilderBlock;
pub use crate::services::BuilderData;
pub use crate::services::ChartError;
pub use crate::services::EditableField;
pub use crate::services::PreviewData;
pub use crate::services::PreviewEntry;
pub use crate::services::ReportBlock;
pub use crate::services::ReportData;
pub use crate::services::ResolvedTemplate;
pub use crate::services::TemplateCandidates;
pub use crate::services::TemplateResolver;

use crate::define_id_type;

define_id_type!(i64, ProjectId);

define_id_type!(i64, PartnerId);

define_id_type!(i64, TemplateId);
