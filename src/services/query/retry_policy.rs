// src/services/query/retry_policy.rs
//
// Retry classification for remote queries.
//
// The default classifier matches the error message against
// /network request failed/i. Callers needing transport-level codes plug in
// another `ErrorClassifier`; budgets stay keyed by `ErrorKind`.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

pub const NETWORK_FAILURE_PATTERN: &str = r"(?i)network request failed";

static NETWORK_FAILURE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(NETWORK_FAILURE_PATTERN).expect("network failure pattern is a valid regex")
});

/// Structured error classes with distinct retry budgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Network,
    Validation,
    Unknown,
}

pub trait ErrorClassifier: Send + Sync {
    fn classify(&self, error: &AppError) -> ErrorKind;
}

/// Classifies purely on the rendered error message.
#[derive(Debug, Clone)]
pub struct MessagePatternClassifier {
    pattern: Regex,
}

impl MessagePatternClassifier {
    pub fn new() -> Self {
        Self {
            pattern: NETWORK_FAILURE_RE.clone(),
        }
    }

    /// Uses a different network-failure pattern.
    pub fn with_pattern(pattern: &str) -> AppResult<Self> {
        let pattern = Regex::new(pattern)
            .map_err(|e| AppError::Configuration(format!("Invalid retry pattern: {}", e)))?;
        Ok(Self { pattern })
    }

    pub fn is_network_message(&self, message: &str) -> bool {
        self.pattern.is_match(message)
    }
}

impl Default for MessagePatternClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl ErrorClassifier for MessagePatternClassifier {
    fn classify(&self, error: &AppError) -> ErrorKind {
        if self.is_network_message(&error.to_string()) {
            ErrorKind::Network
        } else {
            ErrorKind::Unknown
        }
    }
}

/// Classifies by error variant instead of message text.
#[derive(Debug, Clone, Copy, Default)]
pub struct VariantClassifier;

impl ErrorClassifier for VariantClassifier {
    fn classify(&self, error: &AppError) -> ErrorKind {
        match error {
            AppError::Network(_) => ErrorKind::Network,
            AppError::Domain(_) | AppError::Serialization(_) => ErrorKind::Validation,
            _ => ErrorKind::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub network_retries: u32,
    pub default_retries: u32,

    /// Delay before the first retry; doubles per failure
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            network_retries: 3,
            default_retries: 2,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    pub fn budget(&self, kind: ErrorKind) -> u32 {
        match kind {
            ErrorKind::Network => self.network_retries,
            ErrorKind::Validation | ErrorKind::Unknown => self.default_retries,
        }
    }

    /// `failure_count` is the number of failures before the current one.
    pub fn should_retry(&self, failure_count: u32, kind: ErrorKind) -> bool {
        failure_count < self.budget(kind)
    }

    pub fn retry_delay(&self, failure_count: u32) -> Duration {
        let factor = 2u32.saturating_pow(failure_count.min(16));
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    /// No waiting between attempts.
    pub fn immediate() -> Self {
        Self {
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            ..Self::default()
        }
    }
}
