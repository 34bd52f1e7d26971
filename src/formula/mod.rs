//! Formula engine.
//!
//! Formulas describe how chart values are derived from a project's stats
//! record. They are parsed once into an [`Expr`] tree when a variable or
//! chart configuration is stored, then evaluated per request without
//! re-parsing.

pub mod ast;
pub mod eval;
pub mod parser;

pub use ast::{BinaryOp, Expr};
pub use eval::{evaluate, EvalOutcome};
pub use parser::{parse_formula, FormulaError};
