#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Relay Core
//!
//! Orchestration core for configuration-driven service execution. Operators
//! register named services whose execution target — a stored procedure, a
//! SQL view or an HTTP endpoint — is resolved at runtime from stored
//! configuration; the result of one execution chains into parameters for
//! follow-up executions, on demand or on a cron schedule, with bounded
//! retries and circuit-breaker protection and an auditable execution tree.
//!
//! ## Architecture
//!
//! The crate is the engine only. The HTTP layer, the configuration CRUD
//! store and the scheduling daemon are external collaborators reached
//! through traits:
//!
//! - [`orchestration`] — dispatcher, continuation engine, scheduler
//!   trigger, audit trail and the [`orchestration::Orchestrator`] facade
//! - [`execution`] — the three interchangeable execution strategies
//! - [`resilience`] — retry with timeouts, backoff and circuit breakers
//! - [`transport`] — outbound SQL/HTTP seams with bundled sqlx/reqwest
//!   implementations
//! - [`store`] — configuration and audit store traits plus in-memory
//!   reference implementations
//! - [`models`] — the configuration records and the audit row
//! - [`config`] — runtime tunables
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use relay_core::config::RelayConfig;
//! use relay_core::orchestration::Orchestrator;
//! use relay_core::store::{InMemoryAuditStore, InMemoryConfigStore};
//! use std::sync::Arc;
//!
//! # struct NoDaemon;
//! # #[async_trait::async_trait]
//! # impl relay_core::orchestration::SchedulerDaemon for NoDaemon {
//! #     async fn register_periodic_trigger(&self, _: &str, _: &str, _: relay_core::orchestration::TriggerCallback) -> relay_core::error::Result<()> { Ok(()) }
//! #     async fn remove_trigger(&self, _: &str) -> relay_core::error::Result<()> { Ok(()) }
//! #     async fn list_triggers(&self, _: &str) -> relay_core::error::Result<Vec<String>> { Ok(vec![]) }
//! # }
//! # async fn example() -> relay_core::error::Result<()> {
//! let store = Arc::new(InMemoryConfigStore::new());
//! let audit = Arc::new(InMemoryAuditStore::new());
//!
//! let orchestrator = Orchestrator::with_default_transports(
//!     RelayConfig::load()?,
//!     store,
//!     audit.clone(),
//!     Arc::new(NoDaemon),
//! )?;
//!
//! let result = orchestrator
//!     .run_chain("Orders", Default::default())
//!     .await?;
//! println!("chain produced {} row(s)", result.row_count());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod execution;
pub mod logging;
pub mod models;
pub mod orchestration;
pub mod resilience;
pub mod store;
pub mod transport;
pub mod validation;

pub use self::config::RelayConfig;
pub use error::{RelayError, Result};
pub use execution::{ExecutionOutcome, ParameterMap, ResultRow};
pub use models::{
    ContinuationMapping, ExecutionConfig, ExecutionRecord, Schedule, ServiceDefinition,
    SqlProvider, TargetKind,
};
pub use orchestration::Orchestrator;
