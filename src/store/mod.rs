//! # Collaborator Stores
//!
//! The orchestration core reads configuration and appends audit rows
//! through these traits. The persistence layer itself (CRUD, soft delete,
//! restore) lives outside this crate; [`memory`] provides the reference
//! implementations used by the integration tests and examples.
//!
//! Contract: every lookup returns only non-soft-deleted rows and raises
//! [`crate::error::RelayError::NotFound`] otherwise.

pub mod memory;

use crate::error::Result;
use crate::models::{
    ContinuationMapping, ExecutionConfig, ExecutionRecord, NewExecutionRecord, Schedule,
    ServiceDefinition,
};

pub use memory::{InMemoryAuditStore, InMemoryConfigStore};

/// Read-only access to the stored service configuration.
#[async_trait::async_trait]
pub trait ConfigurationStore: Send + Sync {
    /// Resolve a service definition by its unique name.
    async fn service_by_name(&self, name: &str) -> Result<ServiceDefinition>;

    /// Resolve a service definition by id.
    async fn service_by_id(&self, id: i64) -> Result<ServiceDefinition>;

    /// All execution configurations belonging to a service, creation order.
    async fn configs_by_service(&self, service_id: i64) -> Result<Vec<ExecutionConfig>>;

    /// Resolve an execution configuration by id.
    async fn config_by_id(&self, id: i64) -> Result<ExecutionConfig>;

    /// Continuation mappings whose source is the given configuration.
    /// Empty when none are defined.
    async fn continuations_by_config(&self, config_id: i64) -> Result<Vec<ContinuationMapping>>;

    /// The schedule attached to a configuration, if any.
    async fn schedule_by_config(&self, config_id: i64) -> Result<Option<Schedule>>;

    /// Every configuration flagged for cron scheduling.
    async fn scheduled_configs(&self) -> Result<Vec<ExecutionConfig>>;
}

/// Append-only sink for execution records.
#[async_trait::async_trait]
pub trait AuditStore: Send + Sync {
    /// Persist a record and return it with its assigned id.
    async fn insert(&self, record: NewExecutionRecord) -> Result<ExecutionRecord>;
}
