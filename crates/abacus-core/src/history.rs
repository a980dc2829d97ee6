//! Append-only evaluation history
//!
//! Records live in a `Vec` behind a reader/writer lock. Appends take the
//! write lock for a single push; reads take the read lock and copy out a
//! bounded window, so no reference into the live vector ever escapes.

use crate::error::{AbacusError, AbacusResult};
use crate::record::EvaluationRecord;
use serde::{Deserialize, Serialize};
use std::sync::RwLock;
use tracing::debug;

pub const DEFAULT_PAGE: usize = 1;
pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const MAX_PAGE_SIZE: usize = 100;

/// Validated pagination parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: usize,
    page_size: usize,
}

impl PageRequest {
    /// Clamp raw parameters: `page < 1` becomes 1 and a page size outside
    /// `1..=MAX_PAGE_SIZE` becomes [`DEFAULT_PAGE_SIZE`].
    pub fn new(page: i64, page_size: i64) -> Self {
        let page = usize::try_from(page).ok().filter(|p| *p >= 1).unwrap_or(DEFAULT_PAGE);
        let page_size = usize::try_from(page_size)
            .ok()
            .filter(|size| (1..=MAX_PAGE_SIZE).contains(size))
            .unwrap_or(DEFAULT_PAGE_SIZE);

        Self { page, page_size }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Offset of the first record of this page
    fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.page_size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: DEFAULT_PAGE, page_size: DEFAULT_PAGE_SIZE }
    }
}

/// One page of history, most recent record first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryPage {
    pub records: Vec<EvaluationRecord>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
}

/// Thread-safe, growth-only log of evaluation records
#[derive(Debug, Default)]
pub struct HistoryStore {
    records: RwLock<Vec<EvaluationRecord>>,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record and return the new history length
    pub fn append(&self, record: EvaluationRecord) -> AbacusResult<usize> {
        let mut records = self
            .records
            .write()
            .map_err(|_| AbacusError::HistoryPoisoned { operation: "append" })?;

        records.push(record);
        Ok(records.len())
    }

    pub fn len(&self) -> AbacusResult<usize> {
        let records =
            self.records.read().map_err(|_| AbacusError::HistoryPoisoned { operation: "len" })?;
        Ok(records.len())
    }

    pub fn is_empty(&self) -> AbacusResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Copy out one page in reverse insertion order
    ///
    /// A page that starts past the end is empty but still reports the
    /// current total.
    pub fn page(&self, request: PageRequest) -> AbacusResult<HistoryPage> {
        let records =
            self.records.read().map_err(|_| AbacusError::HistoryPoisoned { operation: "page" })?;

        let total = records.len();
        let window: Vec<EvaluationRecord> =
            records.iter().rev().skip(request.offset()).take(request.page_size()).cloned().collect();

        debug!(
            page = request.page(),
            page_size = request.page_size(),
            returned = window.len(),
            total,
            "Retrieved paginated history"
        );

        Ok(HistoryPage {
            records: window,
            total,
            page: request.page(),
            page_size: request.page_size(),
        })
    }

    /// Copy of the full history, oldest record first
    pub fn snapshot(&self) -> AbacusResult<Vec<EvaluationRecord>> {
        let records = self
            .records
            .read()
            .map_err(|_| AbacusError::HistoryPoisoned { operation: "snapshot" })?;
        Ok(records.clone())
    }
}
