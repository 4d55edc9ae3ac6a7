//! Facade combining the breaker registry with the retry executor.

use crate::config::RelayConfig;
use crate::error::Result;
use crate::models::ExecutionConfig;
use crate::resilience::{
    execute_with_retry, CircuitBreakerConfig, CircuitBreakerManager, RetryPolicy,
};
use std::future::Future;

/// The single entry point the orchestration layer calls through. Owns the
/// breaker registry; derives each call's retry policy from its execution
/// configuration plus the runtime defaults.
pub struct ResilienceLayer {
    manager: CircuitBreakerManager,
    runtime: RelayConfig,
}

impl ResilienceLayer {
    pub fn new(runtime: RelayConfig) -> Self {
        Self {
            manager: CircuitBreakerManager::new(CircuitBreakerConfig::from(&runtime.resilience)),
            runtime,
        }
    }

    pub fn policy_for(&self, config: &ExecutionConfig) -> RetryPolicy {
        RetryPolicy::for_config(config, &self.runtime)
    }

    /// Run `operation` against `target` under the given policy, with the
    /// target's shared breaker.
    pub async fn execute<T, F, Fut>(
        &self,
        target: &str,
        policy: &RetryPolicy,
        operation: F,
    ) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let breaker = self.manager.breaker_for(target);
        execute_with_retry(&breaker, policy, target, operation).await
    }

    pub fn manager(&self) -> &CircuitBreakerManager {
        &self.manager
    }
}
