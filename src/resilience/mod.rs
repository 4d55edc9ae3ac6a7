//! # Resilience Layer
//!
//! Fault tolerance for every outbound call the orchestration core makes:
//! bounded retries with per-attempt and global timeouts, exponential
//! backoff, and circuit breakers that fail fast while a backend is down.
//!
//! ## Architecture
//!
//! - **Circuit Breakers**: one per logical backend target, held in a
//!   [`CircuitBreakerManager`] registry constructed at startup.
//! - **Retry Executor**: wraps an operation with the configured attempt
//!   budget and timeouts; only transient failures are retried and only
//!   transient failures count toward a breaker's threshold.
//! - **Facade**: [`ResilienceLayer`] combines both so callers name a
//!   target and a policy and pass a closure.
//!
//! The breaker is deliberately two-state: Closed and Open. When the
//! cooldown elapses the first check re-admits calls and resets the
//! counter; there is no half-open probe phase.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use relay_core::resilience::{CircuitBreaker, CircuitBreakerConfig};
//! use std::time::Duration;
//!
//! # async fn example() -> relay_core::error::Result<()> {
//! let config = CircuitBreakerConfig {
//!     failure_threshold: 5,
//!     cooldown: Duration::from_secs(30),
//! };
//! let breaker = CircuitBreaker::new("reporting-db".to_string(), config);
//!
//! breaker.try_acquire().await?;
//! // ... perform the call, then record the outcome:
//! breaker.record_success().await;
//! # Ok(())
//! # }
//! ```

pub mod circuit_breaker;
pub mod config;
pub mod layer;
pub mod manager;
pub mod retry;

pub use circuit_breaker::{CircuitBreaker, CircuitState};
pub use layer::ResilienceLayer;
pub use self::config::CircuitBreakerConfig;
pub use manager::CircuitBreakerManager;
pub use retry::{execute_with_retry, RetryPolicy};
