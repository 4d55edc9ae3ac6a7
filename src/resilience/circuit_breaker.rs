//! # Circuit Breaker Implementation
//!
//! Fail-fast guard that stops calling a failing backend for a cooldown
//! period. Two states: Closed (calls pass through) and Open (calls are
//! rejected immediately). The transition Closed → Open happens when
//! consecutive transient failures reach the configured threshold; the
//! first check after the cooldown window re-admits calls, transitioning
//! straight back to Closed with the counter reset.

use crate::error::{RelayError, Result};
use crate::resilience::CircuitBreakerConfig;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Instant;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Circuit breaker states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CircuitState {
    /// Normal operation, calls are allowed through.
    Closed = 0,
    /// Failure mode, calls fail fast without executing.
    Open = 1,
}

impl From<u8> for CircuitState {
    fn from(value: u8) -> Self {
        match value {
            0 => CircuitState::Closed,
            _ => CircuitState::Open,
        }
    }
}

#[derive(Debug, Default)]
struct BreakerInner {
    consecutive_failures: u32,
    opened_at: Option<Instant>,
}

/// Per-backend-target breaker. The admission check and every state change
/// go through one mutex so two callers cannot both observe a stale count
/// and race past the threshold; the atomic tag only mirrors the state for
/// cheap inspection.
#[derive(Debug)]
pub struct CircuitBreaker {
    /// Backend target identity, for logging and registry keys.
    target: String,
    state: AtomicU8,
    config: CircuitBreakerConfig,
    inner: Mutex<BreakerInner>,
}

impl CircuitBreaker {
    pub fn new(target: String, config: CircuitBreakerConfig) -> Self {
        debug!(
            target = %target,
            failure_threshold = config.failure_threshold,
            cooldown_seconds = config.cooldown.as_secs(),
            "circuit breaker initialized"
        );
        Self {
            target,
            state: AtomicU8::new(CircuitState::Closed as u8),
            config,
            inner: Mutex::new(BreakerInner::default()),
        }
    }

    pub fn state(&self) -> CircuitState {
        CircuitState::from(self.state.load(Ordering::Acquire))
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// Admission check, called before each attempt. While Open, the first
    /// check after the cooldown elapses re-admits calls and resets the
    /// breaker; earlier checks fail fast.
    pub async fn try_acquire(&self) -> Result<()> {
        let mut inner = self.inner.lock().await;
        match self.state() {
            CircuitState::Closed => Ok(()),
            CircuitState::Open => {
                let elapsed = inner.opened_at.map(|at| at.elapsed());
                match elapsed {
                    Some(elapsed) if elapsed >= self.config.cooldown => {
                        inner.consecutive_failures = 0;
                        inner.opened_at = None;
                        self.state.store(CircuitState::Closed as u8, Ordering::Release);
                        info!(
                            target = %self.target,
                            cooldown_seconds = self.config.cooldown.as_secs(),
                            "circuit breaker closed after cooldown"
                        );
                        Ok(())
                    }
                    Some(_) => Err(RelayError::CircuitOpen {
                        target: self.target.clone(),
                    }),
                    None => {
                        // Open without a timestamp should not happen; allow
                        // the call rather than wedge the target shut.
                        warn!(target = %self.target, "circuit open without opened_at timestamp");
                        Ok(())
                    }
                }
            }
        }
    }

    /// Record a successful call. Any success while Closed resets the
    /// failure counter.
    pub async fn record_success(&self) {
        let mut inner = self.inner.lock().await;
        inner.consecutive_failures = 0;
    }

    /// Record a transient failure, tripping the breaker open when the
    /// consecutive-failure threshold is reached.
    pub async fn record_failure(&self) {
        let mut inner = self.inner.lock().await;
        inner.consecutive_failures += 1;
        if self.state() == CircuitState::Closed
            && inner.consecutive_failures >= self.config.failure_threshold
        {
            inner.opened_at = Some(Instant::now());
            self.state.store(CircuitState::Open as u8, Ordering::Release);
            warn!(
                target = %self.target,
                consecutive_failures = inner.consecutive_failures,
                failure_threshold = self.config.failure_threshold,
                cooldown_seconds = self.config.cooldown.as_secs(),
                "circuit breaker opened, failing fast"
            );
        }
    }

    /// Force the circuit open (emergency isolation of a backend).
    pub async fn force_open(&self) {
        let mut inner = self.inner.lock().await;
        inner.opened_at = Some(Instant::now());
        self.state.store(CircuitState::Open as u8, Ordering::Release);
        warn!(target = %self.target, "circuit breaker forced open");
    }

    /// Force the circuit closed (emergency recovery).
    pub async fn force_closed(&self) {
        let mut inner = self.inner.lock().await;
        inner.consecutive_failures = 0;
        inner.opened_at = None;
        self.state.store(CircuitState::Closed as u8, Ordering::Release);
        warn!(target = %self.target, "circuit breaker forced closed");
    }

    /// Current consecutive-failure count, for health surfaces.
    pub async fn consecutive_failures(&self) -> u32 {
        self.inner.lock().await.consecutive_failures
    }
}
