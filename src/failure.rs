//! Classification of downstream failures.
//!
//! Consumers use the classification to decide between asking the bus to
//! redeliver a message and dropping it.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

const QUOTA_INDICATORS: &[&str] = &["quota", "resource_exhausted"];
const RATE_LIMIT_INDICATORS: &[&str] = &["rate limit", "rate-limit", "too many requests"];
const TRANSIENT_INDICATORS: &[&str] = &["timeout", "timed out", "connection", "unavailable"];

#[expect(
    clippy::expect_used,
    reason = "patterns are string literals exercised by the classification tests"
)]
fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("status pattern literal should compile")
}

// Status codes only count as standalone tokens, so "5000 minutes" is not a 500.
static RATE_LIMIT_STATUS: Lazy<Regex> = Lazy::new(|| compile(r"\b429\b"));
static TRANSIENT_STATUS: Lazy<Regex> = Lazy::new(|| compile(r"\b(?:408|500|502|503|504)\b"));

/// Broad category of a failed downstream call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Usage quota exhausted.
    Quota,
    /// Throttled by the downstream.
    RateLimited,
    /// Network or server fault that may clear on its own.
    Transient,
    /// Retrying will not help.
    Permanent,
}

impl FailureKind {
    /// Classifies an HTTP status code.
    #[must_use]
    pub const fn from_status(status: u16) -> Self {
        match status {
            429 => Self::RateLimited,
            408 | 500 | 502 | 503 | 504 => Self::Transient,
            _ => Self::Permanent,
        }
    }

    /// Classifies an HTTP rejection from its status, refining a 429 into
    /// [`Self::Quota`] when the body says the quota is spent.
    ///
    /// The body never upgrades a non-retryable status.
    #[must_use]
    pub fn from_response(status: u16, body: &str) -> Self {
        match Self::from_status(status) {
            Self::RateLimited if mentions_any(&body.to_lowercase(), QUOTA_INDICATORS) => {
                Self::Quota
            }
            kind => kind,
        }
    }

    /// Classifies free-form error text.
    #[must_use]
    pub fn from_message(message: &str) -> Self {
        let lowered = message.to_lowercase();
        if mentions_any(&lowered, QUOTA_INDICATORS) {
            Self::Quota
        } else if mentions_any(&lowered, RATE_LIMIT_INDICATORS)
            || RATE_LIMIT_STATUS.is_match(&lowered)
        {
            Self::RateLimited
        } else if mentions_any(&lowered, TRANSIENT_INDICATORS)
            || TRANSIENT_STATUS.is_match(&lowered)
        {
            Self::Transient
        } else {
            Self::Permanent
        }
    }

    /// Returns `true` when a later attempt could succeed.
    #[must_use]
    pub const fn is_retryable(self) -> bool {
        !matches!(self, Self::Permanent)
    }
}

fn mentions_any(lowered: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| lowered.contains(needle))
}
