//! Refresh side: fetch every source of a user, normalize, upsert, and keep
//! history bounded.

pub mod pipeline;
pub mod retention;

pub use pipeline::{ParallelIngestor, SourceReport, DEFAULT_WORKERS};
pub use retention::{RetentionSweeper, SweepOutcome};

/// Totals for one refresh of one user's sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshReport {
    pub sources: usize,
    /// Sources skipped because they could not be fetched or parsed.
    pub sources_failed: usize,
    pub items_examined: usize,
    pub items_new_or_updated: usize,
    pub sweep: SweepOutcome,
}

impl RefreshReport {
    pub fn new(sweep: SweepOutcome) -> Self {
        Self {
            sources: 0,
            sources_failed: 0,
            items_examined: 0,
            items_new_or_updated: 0,
            sweep,
        }
    }
}
