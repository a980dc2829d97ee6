//! Core functionality for the Abacus evaluation service.
//!
//! This crate provides the arithmetic expression engine (lexer, recursive
//! descent parser and tree evaluator) together with the concurrent
//! evaluation service that records every attempt in an append-only history.

/// Expression lexer, parser, AST and evaluator
pub mod calculator;
/// Error types for calculation and service failures
pub mod error;
/// Append-only, paginated evaluation history
pub mod history;
/// Evaluation records and their wire format
pub mod record;
/// Single and batch evaluation orchestration
pub mod service;
/// Outcome counters
pub mod stats;

pub use calculator::{Expression, calculate};
pub use error::{AbacusError, AbacusResult, CalculationError, ErrorKind, EvalError, ParseError};
pub use history::{HistoryPage, HistoryStore, PageRequest};
pub use record::{EvaluationRecord, Outcome, PendingEvaluation};
pub use service::EvaluationService;
pub use stats::StatsSnapshot;
