//! Chart calculation.
//!
//! Turns one stored chart configuration plus a stats record into a
//! renderable [`ChartResult`]. Calculation is pure: identical inputs
//! produce byte-identical output, which keeps the admin preview and the
//! real report in agreement.

use log::warn;
use thiserror::Error;

use crate::formula::{evaluate, parse_formula, Expr, FormulaError};
use crate::models::{
    ChartConfig, ChartElement, ChartPayload, ChartResult, ChartSegment, ChartType, KpiValue,
    StatsRecord, VariableType,
};
use crate::registry::VariableRegistry;

/// Errors that abort calculation of a single chart.
///
/// These surface as per-block error placeholders; sibling charts in the
/// same report are unaffected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChartError {
    #[error("chart '{chart_id}': {message}")]
    Configuration { chart_id: String, message: String },

    #[error("chart '{chart_id}': formula '{formula}' is invalid: {source}")]
    Formula {
        chart_id: String,
        formula: String,
        source: FormulaError,
    },
}

impl ChartError {
    fn configuration(chart_id: &str, message: impl Into<String>) -> Self {
        Self::Configuration {
            chart_id: chart_id.to_string(),
            message: message.into(),
        }
    }
}

/// Calculate a single chart.
///
/// `value` charts must be expanded first; invoking the calculator on one
/// directly is a configuration error, as is an element count that does not
/// match the chart type.
pub fn calculate(
    chart: &ChartConfig,
    registry: &VariableRegistry,
    stats: &StatsRecord,
) -> Result<ChartResult, ChartError> {
    if chart.chart_type == ChartType::Value {
        return Err(ChartError::configuration(
            &chart.chart_id,
            "value charts must be expanded before calculation",
        ));
    }
    chart
        .validate()
        .map_err(|message| ChartError::configuration(&chart.chart_id, message))?;

    let (subtitle, payload) = match chart.chart_type {
        ChartType::Kpi => calculate_kpi(chart, registry, stats)?,
        ChartType::Bar | ChartType::Pie => (None, calculate_segments(chart, registry, stats)?),
        ChartType::Text => (None, calculate_text(chart, registry, stats)?),
        ChartType::Table => (None, calculate_table(chart, registry, stats)?),
        ChartType::Image => (None, calculate_image(chart, registry, stats)?),
        ChartType::Value => unreachable!("rejected above"),
    };

    Ok(ChartResult {
        chart_id: chart.chart_id.clone(),
        title: chart.title.clone(),
        subtitle,
        emoji: chart.emoji.clone(),
        chart_type: chart.chart_type,
        payload,
    })
}

fn parse_element(chart_id: &str, element: &ChartElement) -> Result<Expr, ChartError> {
    parse_formula(&element.formula).map_err(|source| ChartError::Formula {
        chart_id: chart_id.to_string(),
        formula: element.formula.clone(),
        source,
    })
}

fn calculate_kpi(
    chart: &ChartConfig,
    registry: &VariableRegistry,
    stats: &StatsRecord,
) -> Result<(Option<String>, ChartPayload), ChartError> {
    let element = &chart.elements[0];
    let expr = parse_element(&chart.chart_id, element)?;

    let referenced = expr
        .as_variable()
        .and_then(|name| registry.resolve(name));
    let subtitle = element
        .label
        .clone()
        .or_else(|| referenced.map(|v| v.label.clone()));

    let value = match evaluate(&expr, registry, stats).number() {
        Some(value) => {
            // Counts never render negative; currency and percentages pass
            // through unclamped.
            let clamped = match referenced.map(|v| v.var_type) {
                Some(VariableType::Count) => value.max(0.0),
                _ => value,
            };
            KpiValue::Number(clamped)
        }
        None => KpiValue::NoData,
    };

    Ok((subtitle, ChartPayload::Kpi { value }))
}

fn segment_label(
    element: &ChartElement,
    expr: &Expr,
    registry: &VariableRegistry,
    position: usize,
) -> String {
    if let Some(label) = &element.label {
        return label.clone();
    }
    if let Some(variable) = expr.as_variable().and_then(|name| registry.resolve(name)) {
        return variable.label.clone();
    }
    format!("Series {}", position + 1)
}

fn calculate_segments(
    chart: &ChartConfig,
    registry: &VariableRegistry,
    stats: &StatsRecord,
) -> Result<ChartPayload, ChartError> {
    let mut segments = Vec::with_capacity(chart.elements.len());
    for (position, element) in chart.elements.iter().enumerate() {
        let expr = parse_element(&chart.chart_id, element)?;
        let outcome = evaluate(&expr, registry, stats);
        segments.push(ChartSegment {
            label: segment_label(element, &expr, registry, position),
            value: outcome.or_zero(),
            percentage: 0.0,
            color: element.color.clone(),
            unavailable: outcome.is_unavailable(),
        });
    }

    if segments.iter().all(|s| s.unavailable || s.value == 0.0) {
        return Ok(ChartPayload::InsufficientData);
    }

    let total: f64 = segments.iter().map(|s| s.value).sum();
    for segment in &mut segments {
        segment.percentage = if total == 0.0 {
            0.0
        } else {
            (segment.value / total * 1000.0).round() / 10.0
        };
    }

    Ok(ChartPayload::Segments { segments, total })
}

/// The stored text behind an element that references a text variable.
///
/// `Ok(None)` means the variable is valid but has no stored value yet.
fn resolve_text_reference(
    chart: &ChartConfig,
    element: &ChartElement,
    registry: &VariableRegistry,
    stats: &StatsRecord,
) -> Result<Option<String>, ChartError> {
    let expr = parse_element(&chart.chart_id, element)?;
    let name = expr.as_variable().ok_or_else(|| {
        ChartError::configuration(
            &chart.chart_id,
            "text content must reference a single variable, not an arithmetic formula",
        )
    })?;
    let variable = registry.resolve(name).ok_or_else(|| {
        ChartError::configuration(
            &chart.chart_id,
            format!("references unknown variable '{name}'"),
        )
    })?;
    if !variable.is_text() {
        return Err(ChartError::configuration(
            &chart.chart_id,
            format!("variable '{name}' is not text-typed"),
        ));
    }
    Ok(stats.text(name).map(str::to_string))
}

fn calculate_text(
    chart: &ChartConfig,
    registry: &VariableRegistry,
    stats: &StatsRecord,
) -> Result<ChartPayload, ChartError> {
    match resolve_text_reference(chart, &chart.elements[0], registry, stats)? {
        Some(body) => Ok(ChartPayload::Text { body }),
        None => Ok(ChartPayload::InsufficientData),
    }
}

fn calculate_table(
    chart: &ChartConfig,
    registry: &VariableRegistry,
    stats: &StatsRecord,
) -> Result<ChartPayload, ChartError> {
    match resolve_text_reference(chart, &chart.elements[0], registry, stats)? {
        Some(markdown) => {
            // Loose shape check only. Parsing the markdown is the
            // renderer's job.
            if !markdown.contains('|') {
                return Err(ChartError::configuration(
                    &chart.chart_id,
                    "table content has no markdown table row",
                ));
            }
            Ok(ChartPayload::Table { markdown })
        }
        None => Ok(ChartPayload::InsufficientData),
    }
}

fn calculate_image(
    chart: &ChartConfig,
    registry: &VariableRegistry,
    stats: &StatsRecord,
) -> Result<ChartPayload, ChartError> {
    let element = &chart.elements[0];

    // A direct reference on the element wins over the formula lookup.
    let reference = match &element.image_url {
        Some(url) => Some(url.clone()),
        None => resolve_text_reference(chart, element, registry, stats)?,
    };

    match reference {
        Some(reference) => Ok(ChartPayload::Image {
            reference,
            aspect_ratio: element.aspect_ratio,
        }),
        None => Ok(ChartPayload::InsufficientData),
    }
}

/// Expand a `value` chart into its kpi and bar halves.
///
/// The kpi half sums the two element formulas, so it reads no-data when
/// either side is unavailable. The bar half keeps the original elements
/// and renders partial data with unavailable flags.
pub fn expand_value_chart(chart: &ChartConfig) -> Result<[ChartConfig; 2], ChartError> {
    if chart.chart_type != ChartType::Value {
        return Err(ChartError::configuration(
            &chart.chart_id,
            "only value charts can be expanded",
        ));
    }
    chart
        .validate()
        .map_err(|message| ChartError::configuration(&chart.chart_id, message))?;

    let headline = ChartElement::new(format!(
        "({}) + ({})",
        chart.elements[0].formula, chart.elements[1].formula
    ));

    let mut kpi = ChartConfig::new(
        format!("{}-kpi", chart.chart_id),
        chart.title.clone(),
        ChartType::Kpi,
        vec![headline],
    );
    kpi.emoji = chart.emoji.clone();
    kpi.active = chart.active;

    let mut bar = ChartConfig::new(
        format!("{}-bar", chart.chart_id),
        chart.title.clone(),
        ChartType::Bar,
        chart.elements.clone(),
    );
    bar.emoji = chart.emoji.clone();
    bar.active = chart.active;

    Ok([kpi, bar])
}

/// Calculate a chart, expanding `value` composites first.
pub fn calculate_expanded(
    chart: &ChartConfig,
    registry: &VariableRegistry,
    stats: &StatsRecord,
) -> Result<Vec<ChartResult>, ChartError> {
    if chart.chart_type == ChartType::Value {
        let [kpi, bar] = expand_value_chart(chart)?;
        Ok(vec![
            calculate(&kpi, registry, stats)?,
            calculate(&bar, registry, stats)?,
        ])
    } else {
        Ok(vec![calculate(chart, registry, stats)?])
    }
}

/// Calculate every active chart, preserving input order.
///
/// A chart that fails calculation is logged and skipped; it never aborts
/// the batch.
pub fn calculate_active_charts(
    charts: &[ChartConfig],
    registry: &VariableRegistry,
    stats: &StatsRecord,
) -> Vec<ChartResult> {
    let mut results = Vec::new();
    for chart in charts.iter().filter(|c| c.active) {
        match calculate_expanded(chart, registry, stats) {
            Ok(mut chart_results) => results.append(&mut chart_results),
            Err(err) => warn!("skipping chart '{}': {}", chart.chart_id, err),
        }
    }
    results
}

#[cfg(test)]
#[path = "charts_tests.rs"]
mod charts_tests;
