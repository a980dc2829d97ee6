//! Evaluation service
//!
//! Orchestrates the calculator pipeline for single and batch requests and
//! records every attempt, successful or not, in the shared history.

use crate::calculator::calculate;
use crate::error::AbacusResult;
use crate::history::{HistoryPage, HistoryStore, PageRequest};
use crate::record::{EvaluationRecord, PendingEvaluation};
use crate::stats::{EvaluationStats, StatsSnapshot};
use rayon::prelude::*;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Thread-safe evaluation service, shared through `Arc`
#[derive(Debug, Default)]
pub struct EvaluationService {
    history: Arc<HistoryStore>,
    stats: EvaluationStats,
}

impl EvaluationService {
    /// Create a service with an empty history
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a service that records into an existing history store
    pub fn with_history(history: Arc<HistoryStore>) -> Self {
        Self { history, stats: EvaluationStats::new() }
    }

    pub fn history_store(&self) -> &Arc<HistoryStore> {
        &self.history
    }

    /// Evaluate one expression and append the outcome to history
    ///
    /// Calculation failures are not errors of this method: they come back
    /// as a record whose `error` is set. `Err` is reserved for history
    /// store faults.
    ///
    /// The timestamp is taken before parsing and the record is appended
    /// after evaluation, so concurrent callers may append records out of
    /// timestamp order.
    #[instrument(level = "debug", skip(self, expression), fields(expression_len = expression.len()))]
    pub fn evaluate(&self, expression: &str) -> AbacusResult<EvaluationRecord> {
        let record = self.run(expression);
        let total = self.history.append(record.clone())?;

        debug!(id = %record.id(), total, "Added evaluation to history");
        Ok(record)
    }

    /// Evaluate many expressions concurrently
    ///
    /// Each expression runs as its own task and appends its record as soon
    /// as it completes, so history order follows completion order. The
    /// returned records always line up with `expressions`.
    #[instrument(level = "debug", skip_all, fields(expression_count = expressions.len()))]
    pub fn evaluate_batch<S>(&self, expressions: &[S]) -> AbacusResult<Vec<EvaluationRecord>>
    where
        S: AsRef<str> + Sync,
    {
        info!(expression_count = expressions.len(), "Starting batch evaluation");

        let records = expressions
            .par_iter()
            .map(|expression| self.evaluate(expression.as_ref()))
            .collect::<AbacusResult<Vec<_>>>()?;

        let failed = records.iter().filter(|record| !record.is_success()).count();
        info!(result_count = records.len(), failed, "Completed batch evaluation");

        Ok(records)
    }

    /// One page of history, most recent first
    pub fn history(&self, request: PageRequest) -> AbacusResult<HistoryPage> {
        self.history.page(request)
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Run the pipeline and build the completed record
    fn run(&self, expression: &str) -> EvaluationRecord {
        // Identity and timestamp are fixed before parsing starts.
        let pending = PendingEvaluation::new(expression);

        match calculate(expression) {
            Ok(result) => {
                self.stats.record_success();
                info!(id = %pending.id(), expression, result, "Successfully evaluated expression");
                pending.succeed(result)
            }
            Err(err) => {
                let kind = err.kind();
                self.stats.record_failure(kind);
                warn!(
                    id = %pending.id(),
                    expression,
                    error_kind = %kind,
                    error = %err,
                    "Failed to evaluate expression"
                );
                pending.fail(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_service_send_sync_traits() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<EvaluationService>();
        assert_sync::<EvaluationService>();
    }

    #[test]
    fn test_successful_evaluation_is_recorded() {
        let service = EvaluationService::new();
        let record = service.evaluate("2 + 3 * 4").unwrap();

        assert_eq!(record.result(), Some(14.0));
        assert_eq!(record.error(), None);

        let page = service.history(PageRequest::default()).unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.records[0], record);
    }

    #[test]
    fn test_failed_evaluation_is_recorded() {
        let service = EvaluationService::new();
        let record = service.evaluate("5 / 0").unwrap();

        assert_eq!(record.result(), None);
        assert_eq!(record.error(), Some("division by zero"));
        assert_eq!(service.history_store().len().unwrap(), 1);
    }

    #[test]
    fn test_batch_preserves_input_order() {
        let service = EvaluationService::new();
        let records = service.evaluate_batch(&["1+1", "1/0", "2*2"]).unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].expression(), "1+1");
        assert_eq!(records[0].result(), Some(2.0));
        assert_eq!(records[1].error(), Some("division by zero"));
        assert_eq!(records[2].result(), Some(4.0));
        assert_eq!(service.history_store().len().unwrap(), 3);
    }

    #[test]
    fn test_empty_batch() {
        let service = EvaluationService::new();
        let records = service.evaluate_batch::<String>(&[]).unwrap();
        assert!(records.is_empty());
        assert!(service.history_store().is_empty().unwrap());
    }

    #[test]
    fn test_stats_track_outcomes() {
        let service = EvaluationService::new();
        service.evaluate_batch(&["1", "abc", "(1", "4/0", "2+"]).unwrap();

        let stats = service.stats();
        assert_eq!(stats.total, 5);
        assert_eq!(stats.succeeded, 1);
        assert_eq!(stats.failed, 4);
        assert_eq!(stats.by_kind[&ErrorKind::InvalidNumber], 1);
        assert_eq!(stats.by_kind[&ErrorKind::ExpectedCloseParen], 1);
        assert_eq!(stats.by_kind[&ErrorKind::DivisionByZero], 1);
        assert_eq!(stats.by_kind[&ErrorKind::UnexpectedEnd], 1);
    }

    #[test]
    fn test_shared_history_store() {
        let history = Arc::new(HistoryStore::new());
        let first = EvaluationService::with_history(Arc::clone(&history));
        let second = EvaluationService::with_history(Arc::clone(&history));

        first.evaluate("1").unwrap();
        second.evaluate("2").unwrap();

        assert_eq!(history.len().unwrap(), 2);
    }
}
