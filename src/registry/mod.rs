//! Variable registry.
//!
//! The registry is the single catalog of variables a project can record
//! and chart. It merges the built-in catalog with stored custom variables
//! and pre-parses every derived formula, so evaluation never touches the
//! parser.

use std::collections::HashMap;

use thiserror::Error;

use crate::formula::{parse_formula, Expr, FormulaError};
use crate::models::Variable;

pub mod builtins;

/// Errors raised when registering or renaming variables.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistryError {
    #[error("variable name '{name}' is invalid, names start with a letter and use letters, digits and underscores")]
    InvalidName { name: String },

    #[error("variable '{name}' has an empty label")]
    MissingLabel { name: String },

    #[error("variable '{name}' has an empty category")]
    MissingCategory { name: String },

    #[error("derived variable '{name}' has no formula")]
    MissingFormula { name: String },

    #[error("formula of variable '{name}' is invalid: {source}")]
    InvalidFormula {
        name: String,
        source: FormulaError,
    },

    #[error("variable '{name}' references unknown variable '{referenced}'")]
    UnknownReference { name: String, referenced: String },

    #[error("derived variable '{name}' references derived variable '{referenced}', derived formulas may only use stored variables")]
    DerivedReference { name: String, referenced: String },

    #[error("'{name}' is a built-in variable and cannot be replaced")]
    BuiltinConflict { name: String },

    #[error("variable '{name}' not found")]
    NotFound { name: String },

    #[error("'{name}' is a built-in variable and cannot be renamed")]
    RenameBuiltin { name: String },

    #[error("variable name '{name}' is already taken")]
    NameTaken { name: String },
}

/// Filter for catalog listings.
#[derive(Debug, Clone, Default)]
pub struct VariableFilter {
    pub category: Option<String>,
    pub clicker_only: bool,
    pub editable_only: bool,
}

impl VariableFilter {
    pub fn category(name: impl Into<String>) -> Self {
        Self {
            category: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn clicker() -> Self {
        Self {
            clicker_only: true,
            ..Default::default()
        }
    }

    pub fn editable() -> Self {
        Self {
            editable_only: true,
            ..Default::default()
        }
    }

    fn matches(&self, variable: &Variable) -> bool {
        if let Some(category) = &self.category {
            if &variable.category != category {
                return false;
            }
        }
        if self.clicker_only && !variable.flags.visible_in_clicker {
            return false;
        }
        if self.editable_only && (!variable.flags.editable_in_manual || variable.derived) {
            return false;
        }
        true
    }
}

/// Catalog of variables with pre-parsed derived formulas.
///
/// Listing order is registration order: built-ins first in catalog order,
/// custom variables after in the order they were stored. Overwriting a
/// custom variable keeps its position.
#[derive(Debug, Clone, Default)]
pub struct VariableRegistry {
    variables: Vec<Variable>,
    index: HashMap<String, usize>,
    derived: HashMap<String, Expr>,
}

impl VariableRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry pre-loaded with the built-in catalog.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for variable in builtins::catalog() {
            registry
                .register(variable)
                .expect("built-in variable catalog must be valid");
        }
        registry
    }

    /// Whether `name` is usable as a variable name.
    pub fn is_valid_name(name: &str) -> bool {
        let mut chars = name.chars();
        match chars.next() {
            Some(first) if first.is_ascii_alphabetic() => {}
            _ => return false,
        }
        chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    }

    /// Look up a variable by name.
    pub fn resolve(&self, name: &str) -> Option<&Variable> {
        self.index.get(name).map(|&i| &self.variables[i])
    }

    /// All variables in listing order.
    pub fn list(&self) -> &[Variable] {
        &self.variables
    }

    /// Variables matching a filter, in listing order.
    pub fn filtered(&self, filter: &VariableFilter) -> Vec<&Variable> {
        self.variables
            .iter()
            .filter(|v| filter.matches(v))
            .collect()
    }

    /// The pre-parsed formula of a derived variable.
    pub fn derived_expr(&self, name: &str) -> Option<&Expr> {
        self.derived.get(name)
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Register a variable, validating it first.
    ///
    /// Derived formulas must parse and may only reference stored variables
    /// that already exist, so derived expansion is at most one level deep.
    /// Registering the name of an existing custom variable replaces it in
    /// place; built-in names are frozen.
    pub fn register(&mut self, variable: Variable) -> Result<(), RegistryError> {
        if !Self::is_valid_name(&variable.name) {
            return Err(RegistryError::InvalidName {
                name: variable.name,
            });
        }
        if variable.label.trim().is_empty() {
            return Err(RegistryError::MissingLabel {
                name: variable.name,
            });
        }
        if variable.category.trim().is_empty() {
            return Err(RegistryError::MissingCategory {
                name: variable.name,
            });
        }

        let parsed = if variable.derived {
            let formula = variable
                .formula
                .as_deref()
                .ok_or_else(|| RegistryError::MissingFormula {
                    name: variable.name.clone(),
                })?;
            let expr = parse_formula(formula).map_err(|source| RegistryError::InvalidFormula {
                name: variable.name.clone(),
                source,
            })?;
            for referenced in expr.variables() {
                match self.resolve(referenced) {
                    None => {
                        return Err(RegistryError::UnknownReference {
                            name: variable.name,
                            referenced: referenced.to_string(),
                        })
                    }
                    Some(existing) if existing.derived => {
                        return Err(RegistryError::DerivedReference {
                            name: variable.name,
                            referenced: referenced.to_string(),
                        })
                    }
                    Some(_) => {}
                }
            }
            Some(expr)
        } else {
            None
        };

        match self.index.get(&variable.name).copied() {
            Some(existing) if !self.variables[existing].is_custom => {
                Err(RegistryError::BuiltinConflict {
                    name: variable.name,
                })
            }
            Some(existing) => {
                match parsed {
                    Some(expr) => {
                        self.derived.insert(variable.name.clone(), expr);
                    }
                    None => {
                        self.derived.remove(&variable.name);
                    }
                }
                self.variables[existing] = variable;
                Ok(())
            }
            None => {
                self.index
                    .insert(variable.name.clone(), self.variables.len());
                if let Some(expr) = parsed {
                    self.derived.insert(variable.name.clone(), expr);
                }
                self.variables.push(variable);
                Ok(())
            }
        }
    }

    /// Rename a custom variable.
    ///
    /// Formulas and stats records that reference the old name are left
    /// untouched: those references evaluate as unavailable until updated.
    pub fn rename(&mut self, old: &str, new: &str) -> Result<(), RegistryError> {
        let position = match self.index.get(old).copied() {
            Some(position) => position,
            None => {
                return Err(RegistryError::NotFound {
                    name: old.to_string(),
                })
            }
        };
        if !self.variables[position].is_custom {
            return Err(RegistryError::RenameBuiltin {
                name: old.to_string(),
            });
        }
        if !Self::is_valid_name(new) {
            return Err(RegistryError::InvalidName {
                name: new.to_string(),
            });
        }
        if new == old {
            return Ok(());
        }
        if self.index.contains_key(new) {
            return Err(RegistryError::NameTaken {
                name: new.to_string(),
            });
        }

        self.index.remove(old);
        self.index.insert(new.to_string(), position);
        self.variables[position].name = new.to_string();
        if let Some(expr) = self.derived.remove(old) {
            self.derived.insert(new.to_string(), expr);
        }
        Ok(())
    }
}
