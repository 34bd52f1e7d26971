//! Parsed formula expressions.

use serde::{Deserialize, Serialize};

/// Binary arithmetic operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinaryOp {
    pub fn symbol(&self) -> char {
        match self {
            BinaryOp::Add => '+',
            BinaryOp::Sub => '-',
            BinaryOp::Mul => '*',
            BinaryOp::Div => '/',
        }
    }
}

/// A parsed formula.
///
/// The grammar is deliberately closed: variable references, numeric
/// literals, the four arithmetic operators, parentheses and the
/// `percentage(numerator, denominator)` helper. No loops, no user-defined
/// functions, so evaluation cost is bounded by tree size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// Numeric literal.
    Number(f64),
    /// Reference to a statistics variable, written `stats.<name>`.
    Variable(String),
    /// Arithmetic combination of two subexpressions.
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// `percentage(numerator, denominator)`: share-of-total that degrades
    /// to 0 when the denominator is zero.
    Percentage {
        numerator: Box<Expr>,
        denominator: Box<Expr>,
    },
}

impl Expr {
    /// The variable name when the whole expression is a bare reference.
    ///
    /// Text, table and image charts require this form, and the builder
    /// view uses it to find the raw value behind an element.
    pub fn as_variable(&self) -> Option<&str> {
        match self {
            Expr::Variable(name) => Some(name),
            _ => None,
        }
    }

    /// All variable names referenced anywhere in the tree, in reference
    /// order, duplicates included.
    pub fn variables(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_variables(&mut names);
        names
    }

    fn collect_variables<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            Expr::Number(_) => {}
            Expr::Variable(name) => names.push(name),
            Expr::Binary { left, right, .. } => {
                left.collect_variables(names);
                right.collect_variables(names);
            }
            Expr::Percentage {
                numerator,
                denominator,
            } => {
                numerator.collect_variables(names);
                denominator.collect_variables(names);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_variable_only_on_bare_references() {
        let bare = Expr::Variable("remoteImages".to_string());
        assert_eq!(bare.as_variable(), Some("remoteImages"));

        let sum = Expr::Binary {
            op: BinaryOp::Add,
            left: Box::new(Expr::Variable("female".to_string())),
            right: Box::new(Expr::Variable("male".to_string())),
        };
        assert_eq!(sum.as_variable(), None);
    }

    #[test]
    fn test_variables_walks_whole_tree() {
        let expr = Expr::Percentage {
            numerator: Box::new(Expr::Variable("approvedImages".to_string())),
            denominator: Box::new(Expr::Binary {
                op: BinaryOp::Add,
                left: Box::new(Expr::Variable("approvedImages".to_string())),
                right: Box::new(Expr::Variable("rejectedImages".to_string())),
            }),
        };

        assert_eq!(
            expr.variables(),
            vec!["approvedImages", "approvedImages", "rejectedImages"]
        );
    }
}
