//! Store metrics.
//!
//! Query latency is labelled by query name and outcome. Transaction endings
//! are counted separately so serialization conflicts are visible.

use metrics::{counter, histogram};
use std::time::Instant;

/// How a write transaction ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxOutcome {
    Committed,
    RolledBack,
    /// Lost a unique-key or serialization race at commit.
    Conflicted,
    Failed,
}

impl TxOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxOutcome::Committed => "committed",
            TxOutcome::RolledBack => "rolled_back",
            TxOutcome::Conflicted => "conflicted",
            TxOutcome::Failed => "failed",
        }
    }
}

pub fn record_transaction(outcome: TxOutcome) {
    counter!("planner_store_transactions_total", "outcome" => outcome.as_str()).increment(1);
}

/// Times one repository query.
///
/// ```ignore
/// let timer = QueryTimer::new("find_event_by_id");
/// let result = sqlx::query_as::<_, EventEntity>(...).fetch_optional(executor).await;
/// timer.finish(&result);
/// result
/// ```
pub struct QueryTimer {
    query: &'static str,
    start: Instant,
}

impl QueryTimer {
    pub fn new(query: &'static str) -> Self {
        Self {
            query,
            start: Instant::now(),
        }
    }

    /// Records the elapsed time, labelled by whether the query failed.
    pub fn finish<T>(self, result: &Result<T, sqlx::Error>) {
        let outcome = if result.is_ok() { "ok" } else { "error" };
        histogram!(
            "planner_store_query_duration_seconds",
            "query" => self.query,
            "outcome" => outcome
        )
        .record(self.start.elapsed().as_secs_f64());
    }
}
