//! Circuit breaker configuration.

use crate::config::ResilienceSettings;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Thresholds governing one circuit breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitBreakerConfig {
    /// Consecutive transient failures that trip the breaker open.
    pub failure_threshold: u32,
    /// How long the breaker rejects calls before re-admitting them.
    pub cooldown: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            cooldown: Duration::from_secs(30),
        }
    }
}

impl From<&ResilienceSettings> for CircuitBreakerConfig {
    fn from(settings: &ResilienceSettings) -> Self {
        Self {
            failure_threshold: settings.failure_threshold,
            cooldown: Duration::from_secs(settings.cooldown_seconds),
        }
    }
}
