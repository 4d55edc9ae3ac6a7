//! Registry of circuit breakers keyed by backend target identity.

use crate::resilience::{CircuitBreaker, CircuitBreakerConfig};
use dashmap::DashMap;
use std::sync::Arc;

/// Owns one [`CircuitBreaker`] per logical backend target so every call
/// site hitting the same backend shares breaker state. Constructed once at
/// startup and passed around explicitly.
#[derive(Debug)]
pub struct CircuitBreakerManager {
    breakers: DashMap<String, Arc<CircuitBreaker>>,
    config: CircuitBreakerConfig,
}

impl CircuitBreakerManager {
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            breakers: DashMap::new(),
            config,
        }
    }

    /// The breaker for a backend target, created on first use.
    pub fn breaker_for(&self, target: &str) -> Arc<CircuitBreaker> {
        self.breakers
            .entry(target.to_string())
            .or_insert_with(|| {
                Arc::new(CircuitBreaker::new(target.to_string(), self.config))
            })
            .clone()
    }

    /// Targets with a registered breaker, for health surfaces.
    pub fn targets(&self) -> Vec<String> {
        self.breakers.iter().map(|e| e.key().clone()).collect()
    }
}
