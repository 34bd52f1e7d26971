//! Variable catalog types.

use serde::{Deserialize, Serialize};

/// Value type of a variable.
///
/// Drives formatting on the renderer side and clamping rules in the chart
/// calculator: counts never render negative, currency and percentages pass
/// through unclamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableType {
    Numeric,
    Percentage,
    Currency,
    Count,
    Text,
}

/// Visibility and editability flags for a variable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableFlags {
    /// Shown in the live tally ("clicker") interface.
    #[serde(default)]
    pub visible_in_clicker: bool,
    /// Editable from the manual stats form in the builder view.
    #[serde(default)]
    pub editable_in_manual: bool,
}

impl VariableFlags {
    /// Flags for a hand-counted stat: tallied live and correctable manually.
    pub fn clicker() -> Self {
        Self {
            visible_in_clicker: true,
            editable_in_manual: true,
        }
    }

    /// Flags for a platform-written stat that admins may still correct.
    pub fn manual() -> Self {
        Self {
            visible_in_clicker: false,
            editable_in_manual: true,
        }
    }
}

/// One entry of the variable catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    /// Stable key used in stats records and formulas.
    pub name: String,
    /// Display label.
    pub label: String,
    #[serde(rename = "type")]
    pub var_type: VariableType,
    /// Free-text grouping for catalog listings.
    pub category: String,
    /// Derived variables are computed from `formula` instead of stored.
    #[serde(default)]
    pub derived: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formula: Option<String>,
    #[serde(default)]
    pub flags: VariableFlags,
    /// Custom variables are user-defined. Built-ins have `is_custom == false`
    /// and their names are frozen: stored records reference them by name.
    #[serde(default)]
    pub is_custom: bool,
}

impl Variable {
    /// A plain stored variable (tallied or written by the platform).
    pub fn input(
        name: impl Into<String>,
        label: impl Into<String>,
        var_type: VariableType,
        category: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            var_type,
            category: category.into(),
            derived: false,
            formula: None,
            flags: VariableFlags::default(),
            is_custom: false,
        }
    }

    /// A derived variable computed from a formula at read time.
    pub fn derived(
        name: impl Into<String>,
        label: impl Into<String>,
        var_type: VariableType,
        category: impl Into<String>,
        formula: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            var_type,
            category: category.into(),
            derived: true,
            formula: Some(formula.into()),
            flags: VariableFlags::default(),
            is_custom: false,
        }
    }

    /// A text slot (summaries, markdown tables, image references).
    pub fn text(
        name: impl Into<String>,
        label: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self::input(name, label, VariableType::Text, category)
    }

    /// Replace the flags.
    pub fn with_flags(mut self, flags: VariableFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Mark the variable as user-defined.
    pub fn custom(mut self) -> Self {
        self.is_custom = true;
        self
    }

    /// Whether the variable holds text rather than a number.
    pub fn is_text(&self) -> bool {
        self.var_type == VariableType::Text
    }
}
