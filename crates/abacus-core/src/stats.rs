//! Outcome counters for the evaluation service

use crate::error::ErrorKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Lock-free counters of evaluation outcomes
#[derive(Debug, Default)]
pub struct EvaluationStats {
    succeeded: AtomicU64,
    failed: AtomicU64,
    by_kind: [AtomicU64; ErrorKind::COUNT],
}

/// Point-in-time copy of [`EvaluationStats`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    pub total: u64,
    pub succeeded: u64,
    pub failed: u64,
    /// Failure counts keyed by error kind; kinds never seen are omitted
    pub by_kind: BTreeMap<ErrorKind, u64>,
}

impl EvaluationStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&self) {
        self.succeeded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self, kind: ErrorKind) {
        self.failed.fetch_add(1, Ordering::Relaxed);
        self.by_kind[kind.index()].fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let succeeded = self.succeeded.load(Ordering::Relaxed);
        let failed = self.failed.load(Ordering::Relaxed);

        let by_kind = ErrorKind::ALL
            .iter()
            .filter_map(|kind| {
                let count = self.by_kind[kind.index()].load(Ordering::Relaxed);
                (count > 0).then_some((*kind, count))
            })
            .collect();

        StatsSnapshot { total: succeeded + failed, succeeded, failed, by_kind }
    }
}
