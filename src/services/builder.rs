//! Builder view assembly.
//!
//! The builder is the editing surface: the same blocks as the report,
//! each annotated with the raw stats fields an editor may change. Edits
//! go through the stats save channel and the view is recomputed, so the
//! numbers shown always come from the same calculation as the report.

use std::collections::HashSet;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::api::{ProjectId, TemplateId};
use crate::db::repository::{FullRepository, RepositoryError};
use crate::formula::parse_formula;
use crate::models::{ChartConfig, ChartResult, ChartType, ResolvedFrom, StatValue, StatsRecord, VariableType};
use crate::registry::VariableRegistry;
use crate::services::charts::calculate_expanded;
use crate::services::layout::{assign_widths, BlockWidths};
use crate::services::templates::{resolve_report_template, ResolvedTemplate, TemplateResolver};

/// A raw stats field an editor may change from the builder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditableField {
    pub variable: String,
    pub label: String,
    #[serde(rename = "type")]
    pub var_type: VariableType,
    /// Current stored value, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current: Option<StatValue>,
}

/// One block of the builder view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuilderBlock {
    pub block_id: i64,
    pub chart_id: String,
    pub widths: BlockWidths,
    pub results: Vec<ChartResult>,
    /// Editable inputs feeding this block's formulas, deduplicated.
    pub editable: Vec<EditableField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// The builder view for one project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuilderData {
    pub project_id: ProjectId,
    pub template_id: TemplateId,
    pub template_name: String,
    pub resolved_from: ResolvedFrom,
    pub source: String,
    pub blocks: Vec<BuilderBlock>,
}

/// Editable stored variables referenced by a chart's formulas.
///
/// Derived variables are computed, never edited, so they are excluded
/// even when their flags say otherwise.
fn editable_fields(
    chart: &ChartConfig,
    registry: &VariableRegistry,
    stats: &StatsRecord,
) -> Vec<EditableField> {
    let mut seen = HashSet::new();
    let mut fields = Vec::new();
    for element in &chart.elements {
        let Ok(expr) = parse_formula(&element.formula) else {
            continue;
        };
        for name in expr.variables() {
            if !seen.insert(name.to_string()) {
                continue;
            }
            let Some(variable) = registry.resolve(name) else {
                continue;
            };
            if variable.derived || !variable.flags.editable_in_manual {
                continue;
            }
            fields.push(EditableField {
                variable: variable.name.clone(),
                label: variable.label.clone(),
                var_type: variable.var_type,
                current: stats.get(name).cloned(),
            });
        }
    }
    fields
}

/// Assemble the builder view from already-fetched inputs.
///
/// Blocks referencing `value` composites are omitted: the builder edits
/// raw inputs and the composite adds nothing editable beyond its two
/// elements, which appear wherever those variables are charted directly.
pub fn compute_builder_view(
    project_id: ProjectId,
    resolved: &ResolvedTemplate,
    charts: &[ChartConfig],
    registry: &VariableRegistry,
    stats: &StatsRecord,
) -> BuilderData {
    let chart_index: std::collections::HashMap<&str, &ChartConfig> = charts
        .iter()
        .map(|chart| (chart.chart_id.as_str(), chart))
        .collect();

    let grid = &resolved.template.grid;
    let mut blocks = Vec::new();
    for block in resolved.template.ordered_blocks() {
        let chart = chart_index.get(block.chart_id.as_str()).copied();
        if matches!(chart, Some(c) if c.chart_type == ChartType::Value) {
            continue;
        }

        let widths = assign_widths(block, chart.map(|c| c.chart_type), grid);
        let (results, editable, error) = match chart {
            None => {
                warn!(
                    "builder block {} references unknown chart '{}'",
                    block.id, block.chart_id
                );
                (
                    Vec::new(),
                    Vec::new(),
                    Some(format!("references unknown chart '{}'", block.chart_id)),
                )
            }
            Some(chart) => {
                let editable = editable_fields(chart, registry, stats);
                match calculate_expanded(chart, registry, stats) {
                    Ok(results) => (results, editable, None),
                    Err(err) => {
                        warn!("builder block {} failed to calculate: {}", block.id, err);
                        (Vec::new(), editable, Some(err.to_string()))
                    }
                }
            }
        };

        blocks.push(BuilderBlock {
            block_id: block.id,
            chart_id: block.chart_id.clone(),
            widths,
            results,
            editable,
            error,
        });
    }

    BuilderData {
        project_id,
        template_id: resolved.template.id,
        template_name: resolved.template.name.clone(),
        resolved_from: resolved.resolved_from,
        source: resolved.source.clone(),
        blocks,
    }
}

/// Fetch everything the builder needs and assemble it.
pub async fn build_builder_view(
    repo: &dyn FullRepository,
    registry: &VariableRegistry,
    resolver: &TemplateResolver,
    project_id: ProjectId,
) -> Result<BuilderData, RepositoryError> {
    let project = repo.get_project(project_id).await?;
    let resolved = resolve_report_template(repo, resolver, &project).await?;
    let charts = repo.list_chart_configs().await?;
    let stats = repo.get_stats_record(project_id).await?.unwrap_or_default();

    Ok(compute_builder_view(
        project_id, &resolved, &charts, registry, &stats,
    ))
}
