//! Offset bounds and delivery retry policy.

use super::ReminderDomainError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const FALLBACK_BACKOFF_SECS: u64 = 60;

/// Configurable reminder limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReminderPolicy {
    /// Smallest accepted offset before the due date.
    pub min_offset_minutes: u32,
    /// Largest accepted offset before the due date.
    pub max_offset_minutes: u32,
    /// Delivery retries allowed before a reminder is marked failed.
    pub max_retries: u32,
    /// Delay before each retry; the last entry repeats.
    pub retry_backoff_secs: Vec<u64>,
}

impl Default for ReminderPolicy {
    fn default() -> Self {
        Self {
            min_offset_minutes: 5,
            max_offset_minutes: 10_080,
            max_retries: 3,
            retry_backoff_secs: vec![60, 300, 900],
        }
    }
}

impl ReminderPolicy {
    /// Checks an offset against the configured bounds.
    ///
    /// # Errors
    ///
    /// Returns [`ReminderDomainError::OffsetOutOfRange`] outside the bounds.
    pub const fn check_offset(&self, minutes: u32) -> Result<(), ReminderDomainError> {
        if minutes < self.min_offset_minutes || minutes > self.max_offset_minutes {
            return Err(ReminderDomainError::OffsetOutOfRange {
                min: self.min_offset_minutes,
                max: self.max_offset_minutes,
                actual: minutes,
            });
        }
        Ok(())
    }

    /// Delay before retry number `attempt` (1-based).
    #[must_use]
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let index = usize::try_from(attempt.saturating_sub(1)).unwrap_or(usize::MAX);
        let secs = self
            .retry_backoff_secs
            .get(index)
            .or_else(|| self.retry_backoff_secs.last())
            .copied()
            .unwrap_or(FALLBACK_BACKOFF_SECS);
        Duration::from_secs(secs)
    }
}
