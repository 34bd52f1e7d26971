//! Report templates, grid settings and block placement.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::api::TemplateId;

/// Hard per-breakpoint unit caps. Template grid settings are bounded by
/// these regardless of what a stored document claims.
pub const DESKTOP_UNIT_CAP: u8 = 6;
pub const TABLET_UNIT_CAP: u8 = 4;
pub const MOBILE_UNIT_CAP: u8 = 2;

/// Responsive breakpoints the layout engine assigns widths for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Breakpoint {
    Desktop,
    Tablet,
    Mobile,
}

impl Breakpoint {
    pub const ALL: [Breakpoint; 3] = [Breakpoint::Desktop, Breakpoint::Tablet, Breakpoint::Mobile];
}

/// Per-breakpoint column budget of a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSettings {
    pub desktop_units: u8,
    pub tablet_units: u8,
    pub mobile_units: u8,
}

impl GridSettings {
    /// Bounds-checked constructor.
    pub fn new(desktop_units: u8, tablet_units: u8, mobile_units: u8) -> Result<Self, String> {
        if desktop_units == 0 || desktop_units > DESKTOP_UNIT_CAP {
            return Err(format!(
                "desktop units must be in 1..={}, got {}",
                DESKTOP_UNIT_CAP, desktop_units
            ));
        }
        if tablet_units == 0 || tablet_units > TABLET_UNIT_CAP {
            return Err(format!(
                "tablet units must be in 1..={}, got {}",
                TABLET_UNIT_CAP, tablet_units
            ));
        }
        if mobile_units == 0 || mobile_units > MOBILE_UNIT_CAP {
            return Err(format!(
                "mobile units must be in 1..={}, got {}",
                MOBILE_UNIT_CAP, mobile_units
            ));
        }
        Ok(Self {
            desktop_units,
            tablet_units,
            mobile_units,
        })
    }

    /// The full-width grid: 6 desktop units, 4 tablet, 2 mobile.
    pub fn standard() -> Self {
        Self {
            desktop_units: DESKTOP_UNIT_CAP,
            tablet_units: TABLET_UNIT_CAP,
            mobile_units: MOBILE_UNIT_CAP,
        }
    }

    /// Effective unit cap at a breakpoint.
    ///
    /// Stored documents may predate the current bounds, so the configured
    /// value is clamped into `1..=cap` here rather than trusted.
    pub fn cap(&self, breakpoint: Breakpoint) -> u8 {
        let (configured, cap) = match breakpoint {
            Breakpoint::Desktop => (self.desktop_units, DESKTOP_UNIT_CAP),
            Breakpoint::Tablet => (self.tablet_units, TABLET_UNIT_CAP),
            Breakpoint::Mobile => (self.mobile_units, MOBILE_UNIT_CAP),
        };
        configured.min(cap).max(1)
    }
}

impl Default for GridSettings {
    fn default() -> Self {
        Self::standard()
    }
}

/// Placement of one chart inside a template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataBlock {
    pub id: i64,
    /// References a chart configuration by key.
    pub chart_id: String,
    /// Explicit width override in layout units.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u8>,
    /// Layout position; ties keep insertion order.
    pub order: i32,
}

impl DataBlock {
    pub fn new(id: i64, chart_id: impl Into<String>, order: i32) -> Self {
        Self {
            id,
            chart_id: chart_id.into(),
            width: None,
            order,
        }
    }

    pub fn with_width(mut self, width: u8) -> Self {
        self.width = Some(width);
        self
    }
}

/// A report layout: ordered data blocks plus responsive grid settings.
///
/// Templates exist at three levels of specificity (project, partner,
/// global default); [`ReportTemplate::fallback`] is the terminal level the
/// resolver injects so resolution never comes up empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportTemplate {
    pub id: TemplateId,
    pub name: String,
    #[serde(default)]
    pub grid: GridSettings,
    pub blocks: Vec<DataBlock>,
}

impl ReportTemplate {
    pub fn new(id: TemplateId, name: impl Into<String>, blocks: Vec<DataBlock>) -> Self {
        Self {
            id,
            name: name.into(),
            grid: GridSettings::standard(),
            blocks,
        }
    }

    /// Blocks in layout order: ascending `order`, ties in insertion order.
    pub fn ordered_blocks(&self) -> Vec<&DataBlock> {
        let mut blocks: Vec<&DataBlock> = self.blocks.iter().collect();
        blocks.sort_by_key(|b| b.order);
        blocks
    }

    /// The built-in minimal template: a single attendance KPI block.
    ///
    /// Constructed once at startup and injected into the template
    /// resolver, so even a fresh install always renders something.
    pub fn fallback() -> Self {
        Self {
            id: TemplateId::new(0),
            name: "Standard report".to_string(),
            grid: GridSettings::standard(),
            blocks: vec![DataBlock::new(0, "attendance", 0)],
        }
    }
}

/// Which hierarchy level satisfied a template resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolvedFrom {
    Project,
    Partner,
    Default,
    Hardcoded,
}

impl fmt::Display for ResolvedFrom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResolvedFrom::Project => "project",
            ResolvedFrom::Partner => "partner",
            ResolvedFrom::Default => "default",
            ResolvedFrom::Hardcoded => "hardcoded",
        };
        write!(f, "{}", name)
    }
}
