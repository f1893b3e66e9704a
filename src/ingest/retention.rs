use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Duration, Utc};

use crate::config::{ConfigError, RetentionConfig};
use crate::store::Store;

/// Result of asking the sweeper to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepOutcome {
    /// The previous sweep is more recent than the interval.
    Skipped,
    Swept(usize),
    Failed,
}

/// Deletes entries older than the horizon, at most once per interval.
///
/// The clock lives in memory, so a fresh process always sweeps on its first
/// refresh.
pub struct RetentionSweeper {
    horizon: Duration,
    interval: Duration,
    last_sweep: Mutex<Option<DateTime<Utc>>>,
}

impl RetentionSweeper {
    pub fn new(horizon: Duration, interval: Duration) -> Self {
        Self {
            horizon,
            interval,
            last_sweep: Mutex::new(None),
        }
    }

    pub fn from_config(config: &RetentionConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(config.horizon()?, config.interval()?))
    }

    pub fn last_sweep(&self) -> Option<DateTime<Utc>> {
        *self
            .last_sweep
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn sweep<S: Store + ?Sized>(&self, store: &S, now: DateTime<Utc>) -> SweepOutcome {
        if !self.claim(now) {
            return SweepOutcome::Skipped;
        }

        let Some(cutoff) = now.checked_sub_signed(self.horizon) else {
            tracing::error!(horizon = %self.horizon, %now, "Retention cutoff out of range");
            return SweepOutcome::Failed;
        };
        match store.delete_entries_before(cutoff) {
            Ok(deleted) => {
                tracing::info!(deleted, %cutoff, "Retention sweep finished");
                SweepOutcome::Swept(deleted)
            }
            Err(e) => {
                // The clock already moved; the next attempt waits a full interval.
                tracing::error!(error = %e, "Retention sweep failed");
                SweepOutcome::Failed
            }
        }
    }

    /// Checks and advances the clock under one lock so concurrent refreshes
    /// start at most one sweep.
    fn claim(&self, now: DateTime<Utc>) -> bool {
        let mut last = self
            .last_sweep
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(previous) = *last {
            if now.signed_duration_since(previous) < self.interval {
                return false;
            }
        }
        *last = Some(now);
        true
    }
}
