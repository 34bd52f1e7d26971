//! Admin chart preview.
//!
//! Validates chart configurations without a real event by rendering them
//! against a synthetic, fully populated stats record. Every stored
//! variable gets a distinct non-zero value, so a correct chart never
//! shows an insufficient-data state in preview and a broken one fails
//! visibly.

use serde::{Deserialize, Serialize};

use crate::db::repository::{FullRepository, RepositoryError};
use crate::models::{ChartConfig, ChartResult, StatsRecord};
use crate::registry::VariableRegistry;
use crate::services::charts::calculate_expanded;

/// Preview of one chart configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewEntry {
    pub chart_id: String,
    pub results: Vec<ChartResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Rendered preview for the whole chart catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewData {
    pub entries: Vec<PreviewEntry>,
    /// The synthetic record the entries were rendered from.
    pub stats: StatsRecord,
}

/// A fully populated synthetic stats record.
///
/// Stored numeric variables get distinct positive values, text slots get
/// a sample string shaped like a one-row markdown table so table charts
/// pass their content check. Derived variables are left unstored and
/// compute from their formulas as usual.
pub fn synthetic_stats(registry: &VariableRegistry) -> StatsRecord {
    let mut stats = StatsRecord::new();
    for (position, variable) in registry.list().iter().filter(|v| !v.derived).enumerate() {
        if variable.is_text() {
            stats.set_text(&variable.name, format!("| {} | sample |", variable.label));
        } else {
            stats.set_number(&variable.name, ((position + 1) * 10 + position % 7) as f64);
        }
    }
    stats
}

/// Render every active chart against a synthetic record.
///
/// Calculation errors are kept in the output rather than skipped: the
/// preview exists to show an admin exactly which configuration is broken.
pub fn compute_preview(charts: &[ChartConfig], registry: &VariableRegistry) -> PreviewData {
    let stats = synthetic_stats(registry);

    let entries = charts
        .iter()
        .filter(|chart| chart.active)
        .map(|chart| match calculate_expanded(chart, registry, &stats) {
            Ok(results) => PreviewEntry {
                chart_id: chart.chart_id.clone(),
                results,
                error: None,
            },
            Err(err) => PreviewEntry {
                chart_id: chart.chart_id.clone(),
                results: Vec::new(),
                error: Some(err.to_string()),
            },
        })
        .collect();

    PreviewData { entries, stats }
}

/// Fetch the chart catalog and render the preview.
pub async fn build_preview(
    repo: &dyn FullRepository,
    registry: &VariableRegistry,
) -> Result<PreviewData, RepositoryError> {
    let charts = repo.list_chart_configs().await?;
    Ok(compute_preview(&charts, registry))
}
