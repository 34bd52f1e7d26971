//! Report assembly.
//!
//! Walks a resolved template's blocks in layout order, calculates each
//! referenced chart and assigns grid widths. Failures are contained per
//! block: a block whose chart is missing or broken carries an error
//! message and renders as a placeholder while its siblings proceed.

use std::collections::HashMap;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::api::{ProjectId, TemplateId};
use crate::db::checksum::payload_checksum;
use crate::db::repository::{FullRepository, RepositoryError};
use crate::models::{ChartConfig, ChartResult, ResolvedFrom, StatsRecord};
use crate::registry::VariableRegistry;
use crate::services::charts::calculate_expanded;
use crate::services::layout::{assign_widths, BlockWidths};
use crate::services::templates::{resolve_report_template, ResolvedTemplate, TemplateResolver};

/// One rendered block of a report.
///
/// `results` holds one entry for plain charts and two for expanded value
/// composites. A block with `error` set renders as a placeholder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportBlock {
    pub block_id: i64,
    pub chart_id: String,
    pub widths: BlockWidths,
    pub results: Vec<ChartResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A fully assembled report for one project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportData {
    pub project_id: ProjectId,
    pub template_id: TemplateId,
    pub template_name: String,
    pub resolved_from: ResolvedFrom,
    pub source: String,
    pub blocks: Vec<ReportBlock>,
    /// Checksum over the rendered blocks. Identical inputs produce an
    /// identical checksum, so callers can skip re-rendering unchanged
    /// reports.
    pub checksum: String,
}

/// Assemble a report from already-fetched inputs.
///
/// Pure: no I/O, deterministic for identical inputs. Template placement
/// overrides the chart `active` flag; a chart explicitly placed in a
/// block renders even when excluded from batch listings.
pub fn compute_report(
    project_id: ProjectId,
    resolved: &ResolvedTemplate,
    charts: &[ChartConfig],
    registry: &VariableRegistry,
    stats: &StatsRecord,
) -> ReportData {
    let chart_index: HashMap<&str, &ChartConfig> = charts
        .iter()
        .map(|chart| (chart.chart_id.as_str(), chart))
        .collect();

    let grid = &resolved.template.grid;
    let mut blocks = Vec::new();
    for block in resolved.template.ordered_blocks() {
        let chart = chart_index.get(block.chart_id.as_str()).copied();
        let widths = assign_widths(block, chart.map(|c| c.chart_type), grid);

        let (results, error) = match chart {
            None => {
                warn!(
                    "block {} references unknown chart '{}'",
                    block.id, block.chart_id
                );
                (
                    Vec::new(),
                    Some(format!("references unknown chart '{}'", block.chart_id)),
                )
            }
            Some(chart) => match calculate_expanded(chart, registry, stats) {
                Ok(results) => (results, None),
                Err(err) => {
                    warn!("block {} failed to calculate: {}", block.id, err);
                    (Vec::new(), Some(err.to_string()))
                }
            },
        };

        blocks.push(ReportBlock {
            block_id: block.id,
            chart_id: block.chart_id.clone(),
            widths,
            results,
            error,
        });
    }

    let checksum = payload_checksum(&blocks);
    ReportData {
        project_id,
        template_id: resolved.template.id,
        template_name: resolved.template.name.clone(),
        resolved_from: resolved.resolved_from,
        source: resolved.source.clone(),
        blocks,
        checksum,
    }
}

/// Fetch everything a report needs and assemble it.
///
/// A project without a stats record renders an empty-data report rather
/// than failing; a missing project is an error.
pub async fn build_project_report(
    repo: &dyn FullRepository,
    registry: &VariableRegistry,
    resolver: &TemplateResolver,
    project_id: ProjectId,
) -> Result<ReportData, RepositoryError> {
    let project = repo.get_project(project_id).await?;
    let resolved = resolve_report_template(repo, resolver, &project).await?;
    let charts = repo.list_chart_configs().await?;
    let stats = repo.get_stats_record(project_id).await?.unwrap_or_default();

    Ok(compute_report(
        project_id, &resolved, &charts, registry, &stats,
    ))
}
