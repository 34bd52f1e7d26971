//! Formula evaluation against a stats record.

use crate::models::StatsRecord;
use crate::registry::VariableRegistry;

use super::ast::{BinaryOp, Expr};

/// Result of evaluating a formula.
///
/// `Unavailable` means at least one referenced variable had no numeric
/// value. It is distinct from zero: a chart renders a missing-data state
/// for unavailable values, while zero is an answer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EvalOutcome {
    Number(f64),
    Unavailable,
}

impl EvalOutcome {
    pub fn number(&self) -> Option<f64> {
        match self {
            EvalOutcome::Number(value) => Some(*value),
            EvalOutcome::Unavailable => None,
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, EvalOutcome::Unavailable)
    }

    /// The numeric value, treating unavailable as zero.
    ///
    /// Segment charts use this so one missing series does not blank the
    /// whole chart; the segment is flagged unavailable separately.
    pub fn or_zero(&self) -> f64 {
        self.number().unwrap_or(0.0)
    }
}

/// Evaluate a parsed formula against a stats record.
///
/// Pure tree walk. Variable references resolve to the stored numeric value
/// first; derived variables without a stored value fall back to their own
/// formula, expanded one level only. References to derived variables inside
/// that expansion do not expand again, so evaluation always terminates.
/// Any arithmetic on an unavailable operand is unavailable. Division by
/// zero yields 0, never NaN or infinity.
pub fn evaluate(expr: &Expr, registry: &VariableRegistry, stats: &StatsRecord) -> EvalOutcome {
    eval_inner(expr, registry, stats, true)
}

fn eval_inner(
    expr: &Expr,
    registry: &VariableRegistry,
    stats: &StatsRecord,
    expand_derived: bool,
) -> EvalOutcome {
    match expr {
        Expr::Number(value) => EvalOutcome::Number(*value),
        Expr::Variable(name) => {
            if let Some(value) = stats.number(name) {
                return EvalOutcome::Number(value);
            }
            if expand_derived {
                if let Some(derived) = registry.derived_expr(name) {
                    return eval_inner(derived, registry, stats, false);
                }
            }
            EvalOutcome::Unavailable
        }
        Expr::Binary { op, left, right } => {
            let left = eval_inner(left, registry, stats, expand_derived);
            let right = eval_inner(right, registry, stats, expand_derived);
            match (left.number(), right.number()) {
                (Some(l), Some(r)) => EvalOutcome::Number(apply(*op, l, r)),
                _ => EvalOutcome::Unavailable,
            }
        }
        Expr::Percentage {
            numerator,
            denominator,
        } => {
            let numerator = eval_inner(numerator, registry, stats, expand_derived);
            let denominator = eval_inner(denominator, registry, stats, expand_derived);
            match (numerator.number(), denominator.number()) {
                (Some(n), Some(d)) => {
                    if d == 0.0 {
                        EvalOutcome::Number(0.0)
                    } else {
                        EvalOutcome::Number(finite_or_zero(n / d * 100.0))
                    }
                }
                _ => EvalOutcome::Unavailable,
            }
        }
    }
}

fn apply(op: BinaryOp, left: f64, right: f64) -> f64 {
    let value = match op {
        BinaryOp::Add => left + right,
        BinaryOp::Sub => left - right,
        BinaryOp::Mul => left * right,
        BinaryOp::Div => {
            if right == 0.0 {
                return 0.0;
            }
            left / right
        }
    };
    finite_or_zero(value)
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formula::parse_formula;
    use crate::models::{Variable, VariableType};

    fn registry_with_inputs() -> VariableRegistry {
        let mut registry = VariableRegistry::new();
        for name in ["approvedImages", "rejectedImages", "female", "male"] {
            registry
                .register(Variable::input(
                    name,
                    name,
                    VariableType::Count,
                    "Testing",
                ))
                .unwrap();
        }
        registry
            .register(Variable::derived(
                "approvalShare",
                "Approval share",
                VariableType::Percentage,
                "Testing",
                "percentage(stats.approvedImages, stats.approvedImages + stats.rejectedImages)",
            ))
            .unwrap();
        registry
    }

    #[test]
    fn test_evaluate_arithmetic() {
        let registry = registry_with_inputs();
        let mut stats = StatsRecord::new();
        stats.set_number("female", 180.0);
        stats.set_number("male", 220.0);

        let expr = parse_formula("stats.female + stats.male").unwrap();
        assert_eq!(
            evaluate(&expr, &registry, &stats),
            EvalOutcome::Number(400.0)
        );
    }

    #[test]
    fn test_missing_variable_is_unavailable_not_zero() {
        let registry = registry_with_inputs();
        let mut stats = StatsRecord::new();
        stats.set_number("female", 180.0);

        let expr = parse_formula("stats.female + stats.male").unwrap();
        assert_eq!(evaluate(&expr, &registry, &stats), EvalOutcome::Unavailable);
    }

    #[test]
    fn test_division_by_zero_is_zero() {
        let registry = registry_with_inputs();
        let mut stats = StatsRecord::new();
        stats.set_number("approvedImages", 10.0);
        stats.set_number("rejectedImages", 0.0);

        let expr = parse_formula("stats.approvedImages / stats.rejectedImages").unwrap();
        assert_eq!(evaluate(&expr, &registry, &stats), EvalOutcome::Number(0.0));
    }

    #[test]
    fn test_percentage_with_zero_denominator_is_zero() {
        let registry = registry_with_inputs();
        let mut stats = StatsRecord::new();
        stats.set_number("female", 0.0);
        stats.set_number("male", 0.0);

        let expr = parse_formula("percentage(stats.female, stats.female + stats.male)").unwrap();
        assert_eq!(evaluate(&expr, &registry, &stats), EvalOutcome::Number(0.0));
    }

    #[test]
    fn test_percentage_computes_share() {
        let registry = registry_with_inputs();
        let mut stats = StatsRecord::new();
        stats.set_number("female", 180.0);
        stats.set_number("male", 220.0);

        let expr = parse_formula("percentage(stats.female, stats.female + stats.male)").unwrap();
        assert_eq!(evaluate(&expr, &registry, &stats), EvalOutcome::Number(45.0));
    }

    #[test]
    fn test_derived_variable_expands_from_its_formula() {
        let registry = registry_with_inputs();
        let mut stats = StatsRecord::new();
        stats.set_number("approvedImages", 30.0);
        stats.set_number("rejectedImages", 10.0);

        let expr = parse_formula("stats.approvalShare").unwrap();
        assert_eq!(evaluate(&expr, &registry, &stats), EvalOutcome::Number(75.0));
    }

    #[test]
    fn test_stored_value_wins_over_derived_formula() {
        let registry = registry_with_inputs();
        let mut stats = StatsRecord::new();
        stats.set_number("approvedImages", 30.0);
        stats.set_number("rejectedImages", 10.0);
        stats.set_number("approvalShare", 99.0);

        let expr = parse_formula("stats.approvalShare").unwrap();
        assert_eq!(evaluate(&expr, &registry, &stats), EvalOutcome::Number(99.0));
    }

    #[test]
    fn test_text_value_does_not_count_as_number() {
        let registry = registry_with_inputs();
        let mut stats = StatsRecord::new();
        stats.set_text("female", "a lot");

        let expr = parse_formula("stats.female").unwrap();
        assert_eq!(evaluate(&expr, &registry, &stats), EvalOutcome::Unavailable);
    }

    #[test]
    fn test_unavailable_absorbs_through_percentage() {
        let registry = registry_with_inputs();
        let stats = StatsRecord::new();

        let expr = parse_formula("percentage(stats.female, stats.female + stats.male)").unwrap();
        assert!(evaluate(&expr, &registry, &stats).is_unavailable());
    }

    #[test]
    fn test_or_zero_flattens_unavailable() {
        assert_eq!(EvalOutcome::Unavailable.or_zero(), 0.0);
        assert_eq!(EvalOutcome::Number(12.5).or_zero(), 12.5);
    }
}
