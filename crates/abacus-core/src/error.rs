//! Error types for the Abacus core
//!
//! Calculation errors ([`ParseError`], [`EvalError`] and their union
//! [`CalculationError`]) are local to a single evaluation: the service turns
//! them into the error text of an evaluation record. [`AbacusError`] is
//! reserved for operational faults that callers cannot recover from by
//! fixing their input.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors produced while turning tokens into an expression tree
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A literal candidate that is not a decimal number
    #[error("invalid number: {token}")]
    InvalidNumber { token: String },

    /// A parenthesised group without its closing `)`
    #[error("expected ')'")]
    ExpectedCloseParen,

    /// Input ended where a number or `(` was required
    #[error("unexpected end of expression")]
    UnexpectedEnd,

    /// An operator or `)` where a number or `(` was required
    #[error("unexpected token: {token}")]
    UnexpectedToken { token: String },

    /// Tokens left over after a complete expression
    #[error("unexpected trailing input: {token}")]
    TrailingInput { token: String },

    /// Parentheses nested beyond the parser's recursion limit
    #[error("expression nesting exceeds maximum depth of {limit}")]
    NestingTooDeep { limit: usize },
}

/// Errors produced while evaluating an expression tree
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    #[error("division by zero")]
    DivisionByZero,

    #[error("unknown operator: {op}")]
    UnknownOperator { op: String },
}

/// Any failure of the tokenize, parse and evaluate pipeline
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalculationError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Eval(#[from] EvalError),
}

impl CalculationError {
    /// Stable classification used for log fields and counters
    pub fn kind(&self) -> ErrorKind {
        match self {
            CalculationError::Parse(ParseError::InvalidNumber { .. }) => ErrorKind::InvalidNumber,
            CalculationError::Parse(ParseError::ExpectedCloseParen) => {
                ErrorKind::ExpectedCloseParen
            }
            CalculationError::Parse(ParseError::UnexpectedEnd) => ErrorKind::UnexpectedEnd,
            CalculationError::Parse(ParseError::UnexpectedToken { .. }) => {
                ErrorKind::UnexpectedToken
            }
            CalculationError::Parse(ParseError::TrailingInput { .. }) => ErrorKind::TrailingInput,
            CalculationError::Parse(ParseError::NestingTooDeep { .. }) => {
                ErrorKind::NestingTooDeep
            }
            CalculationError::Eval(EvalError::DivisionByZero) => ErrorKind::DivisionByZero,
            CalculationError::Eval(EvalError::UnknownOperator { .. }) => {
                ErrorKind::UnknownOperator
            }
        }
    }
}

/// Classification of calculation failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidNumber,
    ExpectedCloseParen,
    UnexpectedEnd,
    UnexpectedToken,
    TrailingInput,
    NestingTooDeep,
    DivisionByZero,
    UnknownOperator,
}

impl ErrorKind {
    pub const COUNT: usize = 8;

    /// Every kind, in declaration order
    pub const ALL: [ErrorKind; Self::COUNT] = [
        ErrorKind::InvalidNumber,
        ErrorKind::ExpectedCloseParen,
        ErrorKind::UnexpectedEnd,
        ErrorKind::UnexpectedToken,
        ErrorKind::TrailingInput,
        ErrorKind::NestingTooDeep,
        ErrorKind::DivisionByZero,
        ErrorKind::UnknownOperator,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidNumber => "invalid_number",
            ErrorKind::ExpectedCloseParen => "expected_close_paren",
            ErrorKind::UnexpectedEnd => "unexpected_end",
            ErrorKind::UnexpectedToken => "unexpected_token",
            ErrorKind::TrailingInput => "trailing_input",
            ErrorKind::NestingTooDeep => "nesting_too_deep",
            ErrorKind::DivisionByZero => "division_by_zero",
            ErrorKind::UnknownOperator => "unknown_operator",
        }
    }

    pub(crate) fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operational errors of the evaluation service
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AbacusError {
    /// A writer panicked while holding the history lock
    #[error("History store error: lock poisoned during {operation}")]
    HistoryPoisoned { operation: &'static str },
}

impl AbacusError {
    /// Get the error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            AbacusError::HistoryPoisoned { .. } => "history",
        }
    }
}

/// Result type alias for service operations
pub type AbacusResult<T> = Result<T, AbacusError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ParseError::InvalidNumber { token: "abc".into() }.to_string(),
            "invalid number: abc"
        );
        assert_eq!(ParseError::ExpectedCloseParen.to_string(), "expected ')'");
        assert_eq!(ParseError::UnexpectedEnd.to_string(), "unexpected end of expression");
        assert_eq!(EvalError::DivisionByZero.to_string(), "division by zero");
        assert_eq!(EvalError::UnknownOperator { op: "%".into() }.to_string(), "unknown operator: %");
    }

    #[test]
    fn test_calculation_error_is_transparent() {
        let err: CalculationError = EvalError::DivisionByZero.into();
        assert_eq!(err.to_string(), "division by zero");
        assert_eq!(err.kind(), ErrorKind::DivisionByZero);

        let err: CalculationError = ParseError::TrailingInput { token: ")".into() }.into();
        assert_eq!(err.kind().as_str(), "trailing_input");
    }

    #[test]
    fn test_kind_indices_follow_declaration_order() {
        for (position, kind) in ErrorKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), position);
        }
    }

    #[test]
    fn test_abacus_error_category() {
        let err = AbacusError::HistoryPoisoned { operation: "append" };
        assert_eq!(err.category(), "history");
        assert!(err.to_string().contains("append"));
    }
}
