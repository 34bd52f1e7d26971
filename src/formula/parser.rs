//! Formula lexer and recursive-descent parser.
//!
//! Grammar:
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := factor (('*' | '/') factor)*
//! factor  := NUMBER
//!          | '-' factor
//!          | 'stats' '.' IDENT
//!          | 'percentage' '(' expr ',' expr ')'
//!          | '(' expr ')'
//! ```
//!
//! Formulas are parsed once when a variable or chart is registered and the
//! resulting [`Expr`] is reused for every evaluation.

use thiserror::Error;

use super::ast::{BinaryOp, Expr};

/// Errors produced while parsing a formula.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormulaError {
    #[error("formula is empty")]
    Empty,

    #[error("unexpected character '{ch}' at position {position}")]
    UnexpectedChar { ch: char, position: usize },

    #[error("unexpected token '{token}' at position {position}")]
    UnexpectedToken { token: String, position: usize },

    #[error("formula ended unexpectedly")]
    UnexpectedEnd,

    #[error("unknown function '{name}'")]
    UnknownFunction { name: String },

    #[error("invalid number '{text}' at position {position}")]
    InvalidNumber { text: String, position: usize },

    #[error("bare identifier '{name}' at position {position}, variable references are written stats.<name>")]
    BareIdentifier { name: String, position: usize },

    #[error("trailing input at position {position}")]
    TrailingInput { position: usize },
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Ident(String),
    Dot,
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
    Comma,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Number(n) => n.to_string(),
            Token::Ident(name) => name.clone(),
            Token::Dot => ".".to_string(),
            Token::Plus => "+".to_string(),
            Token::Minus => "-".to_string(),
            Token::Star => "*".to_string(),
            Token::Slash => "/".to_string(),
            Token::LParen => "(".to_string(),
            Token::RParen => ")".to_string(),
            Token::Comma => ",".to_string(),
        }
    }
}

fn tokenize(input: &str) -> Result<Vec<(Token, usize)>, FormulaError> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = input.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        match ch {
            c if c.is_whitespace() => i += 1,
            '+' => {
                tokens.push((Token::Plus, i));
                i += 1;
            }
            '-' => {
                tokens.push((Token::Minus, i));
                i += 1;
            }
            '*' => {
                tokens.push((Token::Star, i));
                i += 1;
            }
            '/' => {
                tokens.push((Token::Slash, i));
                i += 1;
            }
            '(' => {
                tokens.push((Token::LParen, i));
                i += 1;
            }
            ')' => {
                tokens.push((Token::RParen, i));
                i += 1;
            }
            ',' => {
                tokens.push((Token::Comma, i));
                i += 1;
            }
            '.' if i + 1 < chars.len() && chars[i + 1].is_ascii_digit() => {
                // Leading-dot number such as `.5`.
                let start = i;
                i += 1;
                while i < chars.len() && chars[i].is_ascii_digit() {
                    i += 1;
                }
                let text: String = chars[start..i].iter().collect();
                let value = text.parse::<f64>().map_err(|_| FormulaError::InvalidNumber {
                    text: text.clone(),
                    position: start,
                })?;
                tokens.push((Token::Number(value), start));
            }
            '.' => {
                tokens.push((Token::Dot, i));
                i += 1;
            }
            c if c.is_ascii_digit() => {
                let start = i;
                while i < chars.len() && chars[i].is_ascii_digit() {
                    i += 1;
                }
                if i < chars.len() && chars[i] == '.' && i + 1 < chars.len() && chars[i + 1].is_ascii_digit() {
                    i += 1;
                    while i < chars.len() && chars[i].is_ascii_digit() {
                        i += 1;
                    }
                }
                let text: String = chars[start..i].iter().collect();
                let value = text.parse::<f64>().map_err(|_| FormulaError::InvalidNumber {
                    text: text.clone(),
                    position: start,
                })?;
                tokens.push((Token::Number(value), start));
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                let text: String = chars[start..i].iter().collect();
                tokens.push((Token::Ident(text), start));
            }
            other => {
                return Err(FormulaError::UnexpectedChar {
                    ch: other,
                    position: i,
                })
            }
        }
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<(Token, usize)>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&(Token, usize)> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<(Token, usize)> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, expected: &Token) -> Result<(), FormulaError> {
        match self.advance() {
            Some((token, _)) if token == *expected => Ok(()),
            Some((token, position)) => Err(FormulaError::UnexpectedToken {
                token: token.describe(),
                position,
            }),
            None => Err(FormulaError::UnexpectedEnd),
        }
    }

    fn expr(&mut self) -> Result<Expr, FormulaError> {
        let mut left = self.term()?;
        while let Some((token, _)) = self.peek() {
            let op = match token {
                Token::Plus => BinaryOp::Add,
                Token::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.term()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn term(&mut self) -> Result<Expr, FormulaError> {
        let mut left = self.factor()?;
        while let Some((token, _)) = self.peek() {
            let op = match token {
                Token::Star => BinaryOp::Mul,
                Token::Slash => BinaryOp::Div,
                _ => break,
            };
            self.advance();
            let right = self.factor()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn factor(&mut self) -> Result<Expr, FormulaError> {
        match self.advance() {
            Some((Token::Number(value), _)) => Ok(Expr::Number(value)),
            Some((Token::Minus, _)) => {
                // Unary minus desugars to `0 - x`.
                let inner = self.factor()?;
                Ok(Expr::Binary {
                    op: BinaryOp::Sub,
                    left: Box::new(Expr::Number(0.0)),
                    right: Box::new(inner),
                })
            }
            Some((Token::LParen, _)) => {
                let inner = self.expr()?;
                self.expect(&Token::RParen)?;
                Ok(inner)
            }
            Some((Token::Ident(name), position)) => match name.as_str() {
                "stats" => {
                    self.expect(&Token::Dot)?;
                    match self.advance() {
                        Some((Token::Ident(var), _)) => Ok(Expr::Variable(var)),
                        Some((token, position)) => Err(FormulaError::UnexpectedToken {
                            token: token.describe(),
                            position,
                        }),
                        None => Err(FormulaError::UnexpectedEnd),
                    }
                }
                "percentage" => {
                    self.expect(&Token::LParen)?;
                    let numerator = self.expr()?;
                    self.expect(&Token::Comma)?;
                    let denominator = self.expr()?;
                    self.expect(&Token::RParen)?;
                    Ok(Expr::Percentage {
                        numerator: Box::new(numerator),
                        denominator: Box::new(denominator),
                    })
                }
                _ => {
                    if matches!(self.peek(), Some((Token::LParen, _))) {
                        Err(FormulaError::UnknownFunction { name })
                    } else {
                        Err(FormulaError::BareIdentifier { name, position })
                    }
                }
            },
            Some((token, position)) => Err(FormulaError::UnexpectedToken {
                token: token.describe(),
                position,
            }),
            None => Err(FormulaError::UnexpectedEnd),
        }
    }
}

/// Parse a formula string into an expression tree.
pub fn parse_formula(input: &str) -> Result<Expr, FormulaError> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err(FormulaError::Empty);
    }

    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.expr()?;

    if let Some((_, position)) = parser.peek() {
        return Err(FormulaError::TrailingInput {
            position: *position,
        });
    }

    Ok(expr)
}
