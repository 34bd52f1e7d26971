//! Grid width assignment for report blocks.
//!
//! Widths are computed per breakpoint and clamped independently: a block
//! that fills six desktop units still collapses to two on mobile without
//! affecting the other breakpoints.

use serde::{Deserialize, Serialize};

use crate::models::{Breakpoint, ChartType, DataBlock, GridSettings};

/// Width of one block at each breakpoint, in layout units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockWidths {
    pub desktop: u8,
    pub tablet: u8,
    pub mobile: u8,
}

/// Default width in layout units for a chart type, before clamping.
///
/// Tables are full-bleed and take the whole row; blocks whose chart could
/// not be resolved get the widest non-full-bleed default so the error
/// placeholder stays visible.
fn default_width(chart_type: Option<ChartType>, cap: u8) -> u8 {
    match chart_type {
        Some(ChartType::Kpi) => 1,
        Some(ChartType::Text) | Some(ChartType::Pie) => 2,
        Some(ChartType::Bar) | Some(ChartType::Image) | Some(ChartType::Value) => 3,
        Some(ChartType::Table) => cap,
        None => 3,
    }
}

/// Unit limit for non-full-bleed content at a breakpoint.
///
/// Tablet rows hold at most two content cells side by side, so content is
/// limited to two units there even when the grid is configured wider.
fn content_limit(breakpoint: Breakpoint, cap: u8) -> u8 {
    match breakpoint {
        Breakpoint::Tablet => cap.min(2),
        _ => cap,
    }
}

/// Width of a block at one breakpoint.
///
/// An explicit block width wins over the chart-type default; either way
/// the result is clamped into the breakpoint's limits. Full-bleed types
/// clamp to the grid cap, everything else to the content limit, and the
/// floor is one unit.
pub fn width_for(
    block: &DataBlock,
    chart_type: Option<ChartType>,
    grid: &GridSettings,
    breakpoint: Breakpoint,
) -> u8 {
    let cap = grid.cap(breakpoint);
    let full_bleed = chart_type.map(|t| t.is_full_bleed()).unwrap_or(false);

    let requested = block.width.unwrap_or_else(|| default_width(chart_type, cap));
    let limit = if full_bleed {
        cap
    } else {
        content_limit(breakpoint, cap)
    };
    requested.min(limit).max(1)
}

/// Widths of a block at every breakpoint.
pub fn assign_widths(
    block: &DataBlock,
    chart_type: Option<ChartType>,
    grid: &GridSettings,
) -> BlockWidths {
    BlockWidths {
        desktop: width_for(block, chart_type, grid, Breakpoint::Desktop),
        tablet: width_for(block, chart_type, grid, Breakpoint::Tablet),
        mobile: width_for(block, chart_type, grid, Breakpoint::Mobile),
    }
}
