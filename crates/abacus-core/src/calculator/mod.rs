//! Arithmetic expression engine
//!
//! The pipeline has three stages:
//! - lexer: raw string to tokens, never fails
//! - parser: tokens to an [`ast::Expression`] tree by recursive descent
//! - evaluator: post-order walk producing an `f64`

pub mod ast;
pub mod evaluator;
pub mod lexer;
pub mod parser;

use crate::error::CalculationError;
use tracing::debug;

pub use ast::{BinaryOperator, Expression};
pub use evaluator::evaluate;
pub use lexer::{Token, tokenize};
pub use parser::{parse, parse_expression};

/// Tokenize, parse and evaluate an expression in one step
pub fn calculate(source: &str) -> Result<f64, CalculationError> {
    let expr = parse_expression(source)?;
    debug!(depth = expr.depth(), node_count = expr.node_count(), "Parsed expression");
    Ok(evaluate(&expr)?)
}
