//! Evaluation records
//!
//! A record is created as a [`PendingEvaluation`] (identity and timestamp
//! assigned up front) and completed exactly once into an immutable
//! [`EvaluationRecord`]. The [`Outcome`] enum guarantees that a record holds
//! either a result or an error, never both.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Result of a single evaluation attempt
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Success(f64),
    Failure(String),
}

/// An evaluation that has an identity but no outcome yet
#[derive(Debug, Clone)]
pub struct PendingEvaluation {
    id: String,
    expression: String,
    timestamp: DateTime<Utc>,
}

impl PendingEvaluation {
    /// Capture a fresh id and the current time for `expression`
    pub fn new(expression: impl Into<String>) -> Self {
        Self { id: Uuid::new_v4().to_string(), expression: expression.into(), timestamp: Utc::now() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn complete(self, outcome: Outcome) -> EvaluationRecord {
        EvaluationRecord {
            id: self.id,
            expression: self.expression,
            outcome,
            timestamp: self.timestamp,
        }
    }

    pub fn succeed(self, result: f64) -> EvaluationRecord {
        self.complete(Outcome::Success(result))
    }

    pub fn fail(self, error: impl ToString) -> EvaluationRecord {
        self.complete(Outcome::Failure(error.to_string()))
    }
}

/// Immutable record of one evaluation attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "RecordRepr", try_from = "RecordRepr")]
pub struct EvaluationRecord {
    id: String,
    expression: String,
    outcome: Outcome,
    timestamp: DateTime<Utc>,
}

impl EvaluationRecord {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn outcome(&self) -> &Outcome {
        &self.outcome
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Computed value, present only on success
    pub fn result(&self) -> Option<f64> {
        match self.outcome {
            Outcome::Success(value) => Some(value),
            Outcome::Failure(_) => None,
        }
    }

    /// Error description, present only on failure
    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Success(_) => None,
            Outcome::Failure(message) => Some(message),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Success(_))
    }
}

/// Wire shape: `result` and `error` are optional and mutually exclusive
#[derive(Serialize, Deserialize)]
struct RecordRepr {
    id: String,
    expression: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    result: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    timestamp: DateTime<Utc>,
}

impl From<EvaluationRecord> for RecordRepr {
    fn from(record: EvaluationRecord) -> Self {
        let (result, error) = match record.outcome {
            Outcome::Success(value) => (Some(value), None),
            Outcome::Failure(message) => (None, Some(message)),
        };

        Self { id: record.id, expression: record.expression, result, error, timestamp: record.timestamp }
    }
}

impl TryFrom<RecordRepr> for EvaluationRecord {
    type Error = String;

    fn try_from(repr: RecordRepr) -> Result<Self, Self::Error> {
        let outcome = match (repr.result, repr.error) {
            (Some(value), None) => Outcome::Success(value),
            (None, Some(message)) => Outcome::Failure(message),
            (Some(_), Some(_)) => {
                return Err(format!("record {} has both a result and an error", repr.id));
            }
            (None, None) => {
                return Err(format!("record {} has neither a result nor an error", repr.id));
            }
        };

        Ok(Self { id: repr.id, expression: repr.expression, outcome, timestamp: repr.timestamp })
    }
}
