//! Expression evaluator
//!
//! Walks the tree in post order. The left operand is always evaluated
//! first, and its failure short-circuits the right operand.

use crate::calculator::ast::{BinaryOperator, Expression};
use crate::error::EvalError;

/// Pending work while walking the tree
enum Frame<'a> {
    /// Left operand in progress, right subtree still to visit
    Left { operator: BinaryOperator, right: &'a Expression },
    /// Left operand done, right operand in progress
    Right { operator: BinaryOperator, left: f64 },
}

/// Evaluate an expression tree to a floating point value
///
/// Uses an explicit stack, so arbitrarily long operator chains evaluate
/// without growing the call stack.
pub fn evaluate(expr: &Expression) -> Result<f64, EvalError> {
    let mut frames: Vec<Frame<'_>> = Vec::new();
    let mut node = expr;

    loop {
        let mut value = loop {
            match node {
                Expression::Literal(value) => break *value,
                Expression::BinaryOp { left, operator, right } => {
                    frames.push(Frame::Left { operator: *operator, right: &**right });
                    node = &**left;
                }
            }
        };

        loop {
            match frames.pop() {
                None => return Ok(value),
                Some(Frame::Right { operator, left }) => {
                    value = apply_binary_op(operator, left, value)?;
                }
                Some(Frame::Left { operator, right }) => {
                    frames.push(Frame::Right { operator, left: value });
                    node = right;
                    break;
                }
            }
        }
    }
}

/// Apply a binary operator to two evaluated operands
pub fn apply_binary_op(operator: BinaryOperator, left: f64, right: f64) -> Result<f64, EvalError> {
    match operator {
        BinaryOperator::Add => Ok(left + right),
        BinaryOperator::Subtract => Ok(left - right),
        BinaryOperator::Multiply => Ok(left * right),
        BinaryOperator::Divide => {
            // Exact comparison: -0.0 is zero as well.
            if right == 0.0 {
                Err(EvalError::DivisionByZero)
            } else {
                Ok(left / right)
            }
        }
    }
}
