//! Chart configuration and calculation result types.

use serde::{Deserialize, Serialize};

/// Closed set of chart types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    Kpi,
    Bar,
    Pie,
    Text,
    Table,
    Image,
    /// Composite: expands into one kpi and one bar sub-result at render
    /// time, never evaluated directly.
    Value,
}

impl ChartType {
    /// Full-bleed blocks span the row and ignore the content-cell width
    /// limits; only the breakpoint unit cap applies.
    pub fn is_full_bleed(&self) -> bool {
        matches!(self, ChartType::Table)
    }
}

/// One formula element of a chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartElement {
    /// Expression over statistics variables, e.g. `stats.remoteImages`.
    pub formula: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Direct image reference for image charts; takes precedence over the
    /// formula when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Rendering hint for image charts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<f64>,
}

impl ChartElement {
    pub fn new(formula: impl Into<String>) -> Self {
        Self {
            formula: formula.into(),
            label: None,
            color: None,
            image_url: None,
            aspect_ratio: None,
        }
    }

    pub fn labeled(formula: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Self::new(formula)
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

/// A stored chart recipe: type, presentation metadata and formula elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartConfig {
    /// Unique key referenced by template data blocks.
    pub chart_id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub chart_type: ChartType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
    /// Inactive charts are kept in the catalog but excluded from batch
    /// calculation and previews.
    #[serde(default = "default_active")]
    pub active: bool,
    pub elements: Vec<ChartElement>,
}

fn default_active() -> bool {
    true
}

impl ChartConfig {
    pub fn new(
        chart_id: impl Into<String>,
        title: impl Into<String>,
        chart_type: ChartType,
        elements: Vec<ChartElement>,
    ) -> Self {
        Self {
            chart_id: chart_id.into(),
            title: title.into(),
            chart_type,
            emoji: None,
            active: true,
            elements,
        }
    }

    pub fn with_emoji(mut self, emoji: impl Into<String>) -> Self {
        self.emoji = Some(emoji.into());
        self
    }

    /// Structural element-count check for the chart type.
    ///
    /// kpi/text/table/image carry exactly one element, pie/bar at least
    /// two, and the value composite exactly two (one headline, one split).
    pub fn validate(&self) -> Result<(), String> {
        let count = self.elements.len();
        match self.chart_type {
            ChartType::Kpi | ChartType::Text | ChartType::Table | ChartType::Image => {
                if count != 1 {
                    return Err(format!(
                        "{:?} chart '{}' must have exactly one element, found {}",
                        self.chart_type, self.chart_id, count
                    ));
                }
            }
            ChartType::Bar | ChartType::Pie => {
                if count < 2 {
                    return Err(format!(
                        "{:?} chart '{}' must have at least two elements, found {}",
                        self.chart_type, self.chart_id, count
                    ));
                }
            }
            ChartType::Value => {
                if count != 2 {
                    return Err(format!(
                        "value chart '{}' must have exactly two elements, found {}",
                        self.chart_id, count
                    ));
                }
            }
        }
        Ok(())
    }
}

/// KPI payload value: a number or an explicit no-data marker.
///
/// `NoData` is deliberately distinct from zero so a KPI card can render an
/// "N/A" state when the underlying variable has no value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum KpiValue {
    Number(f64),
    NoData,
}

impl KpiValue {
    pub fn number(&self) -> Option<f64> {
        match self {
            KpiValue::Number(n) => Some(*n),
            KpiValue::NoData => None,
        }
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self, KpiValue::NoData)
    }
}

/// One slice of a bar or pie payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSegment {
    pub label: String,
    pub value: f64,
    /// Share of the chart total in percent, rounded to one decimal.
    pub percentage: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Set when the element's formula could not be resolved. The segment
    /// contributes 0 to the total but still renders, flagged, so partial
    /// data stays visible.
    #[serde(default)]
    pub unavailable: bool,
}

/// Type-specific payload of a calculated chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartPayload {
    /// Single headline number or no-data marker.
    Kpi { value: KpiValue },
    /// Bar and pie charts share the segment shape.
    Segments {
        segments: Vec<ChartSegment>,
        total: f64,
    },
    /// Every segment was zero or unavailable; renderers show a hint
    /// instead of a 0%-everywhere chart. Also used when a text/table/image
    /// slot has no stored value.
    InsufficientData,
    /// Raw text passed through from a text variable.
    Text { body: String },
    /// Markdown table body; parsing is the renderer's job.
    Table { markdown: String },
    /// Image reference (URL or storage slug); never fetched here.
    Image {
        reference: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        aspect_ratio: Option<f64>,
    },
}

/// Output unit of the calculation pipeline. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartResult {
    pub chart_id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
    #[serde(rename = "type")]
    pub chart_type: ChartType,
    pub payload: ChartPayload,
}
