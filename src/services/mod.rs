//! Service layer for calculation and orchestration.
//!
//! This module contains the service layer that sits between the database
//! operations and the HTTP surface. The calculation services are pure
//! functions over already-fetched data; the `build_*` orchestrators fetch
//! from a repository and delegate to them.

pub mod builder;

pub mod charts;

pub mod layout;

pub mod preview;

pub mod report;

pub mod templates;

pub use builder::{build_builder_view, compute_builder_view, BuilderBlock, BuilderData, EditableField};
pub use charts::{
    calculate, calculate_active_charts, calculate_expanded, expand_value_chart, ChartError,
};
pub use layout::{assign_widths, width_for, BlockWidths};
pub use preview::{build_preview, compute_preview, synthetic_stats, PreviewData, PreviewEntry};
pub use report::{build_project_report, compute_report, ReportBlock, ReportData};
pub use templates::{
    resolve_report_template, ResolvedTemplate, TemplateCandidates, TemplateResolver,
};
