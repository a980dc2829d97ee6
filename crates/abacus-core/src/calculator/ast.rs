//! Abstract Syntax Tree for arithmetic expressions

use crate::calculator::lexer::Token;
use crate::error::EvalError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::mem;

/// AST node representing an expression
///
/// Every `BinaryOp` owns its two children, so the tree is acyclic and each
/// node has exactly one parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expression {
    /// Numeric literal
    Literal(f64),

    /// Binary operation (a + b, a / b, etc.)
    BinaryOp { left: Box<Expression>, operator: BinaryOperator, right: Box<Expression> },
}

/// Binary operators supported by the calculator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Expression {
    /// Create a literal number expression
    pub fn number(value: f64) -> Self {
        Self::Literal(value)
    }

    /// Create a binary operation
    pub fn binary(left: Expression, op: BinaryOperator, right: Expression) -> Self {
        Self::BinaryOp { left: Box::new(left), operator: op, right: Box::new(right) }
    }

    /// Height of the tree; a lone literal has depth 1
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut pending = vec![(self, 1)];

        while let Some((node, level)) = pending.pop() {
            deepest = deepest.max(level);
            if let Expression::BinaryOp { left, right, .. } = node {
                pending.push((&**left, level + 1));
                pending.push((&**right, level + 1));
            }
        }

        deepest
    }

    /// Total number of nodes in the tree
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut pending = vec![self];

        while let Some(node) = pending.pop() {
            count += 1;
            if let Expression::BinaryOp { left, right, .. } = node {
                pending.push(&**left);
                pending.push(&**right);
            }
        }

        count
    }
}

// Operator chains build trees as deep as they are long, so the tree is torn
// down with an explicit stack instead of the recursive default.
impl Drop for Expression {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        detach_children(self, &mut pending);

        while let Some(mut node) = pending.pop() {
            detach_children(&mut node, &mut pending);
        }
    }
}

fn detach_children(node: &mut Expression, pending: &mut Vec<Expression>) {
    if let Expression::BinaryOp { left, right, .. } = node {
        for child in [left, right] {
            if matches!(**child, Expression::BinaryOp { .. }) {
                pending.push(mem::replace(&mut **child, Expression::Literal(0.0)));
            }
        }
    }
}

enum Piece<'a> {
    Node(&'a Expression),
    Operator(BinaryOperator),
    Close,
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut pending = vec![Piece::Node(self)];

        while let Some(piece) = pending.pop() {
            match piece {
                Piece::Node(Expression::Literal(value)) => write!(f, "{value}")?,
                Piece::Node(Expression::BinaryOp { left, operator, right }) => {
                    f.write_str("(")?;
                    pending.push(Piece::Close);
                    pending.push(Piece::Node(&**right));
                    pending.push(Piece::Operator(*operator));
                    pending.push(Piece::Node(&**left));
                }
                Piece::Operator(operator) => write!(f, " {operator} ")?,
                Piece::Close => f.write_str(")")?,
            }
        }

        Ok(())
    }
}

impl BinaryOperator {
    /// Source symbol of the operator
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
        }
    }

    /// Get the precedence of this operator (higher = tighter binding)
    pub fn precedence(&self) -> u8 {
        match self {
            BinaryOperator::Add | BinaryOperator::Subtract => 1,
            BinaryOperator::Multiply | BinaryOperator::Divide => 2,
        }
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Operator tokens map onto operators; any other token fails with
/// [`EvalError::UnknownOperator`].
impl TryFrom<&Token> for BinaryOperator {
    type Error = EvalError;

    fn try_from(token: &Token) -> Result<Self, Self::Error> {
        match token {
            Token::Plus => Ok(BinaryOperator::Add),
            Token::Minus => Ok(BinaryOperator::Subtract),
            Token::Star => Ok(BinaryOperator::Multiply),
            Token::Slash => Ok(BinaryOperator::Divide),
            other => Err(EvalError::UnknownOperator { op: other.to_string() }),
        }
    }
}
