//! In-memory store implementations.
//!
//! Reference implementations of [`ConfigurationStore`] and [`AuditStore`]
//! backed by process-local maps. The integration tests build their fixtures
//! on these; they also serve embedded deployments that load configuration
//! from files at startup.

use super::{AuditStore, ConfigurationStore};
use crate::error::{RelayError, Result};
use crate::models::{
    ContinuationMapping, ExecutionConfig, ExecutionRecord, NewExecutionRecord, Schedule,
    ServiceDefinition,
};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

/// Process-local [`ConfigurationStore`].
#[derive(Default)]
pub struct InMemoryConfigStore {
    services: RwLock<HashMap<i64, ServiceDefinition>>,
    configs: RwLock<HashMap<i64, ExecutionConfig>>,
    mappings: RwLock<HashMap<i64, ContinuationMapping>>,
    schedules: RwLock<HashMap<i64, Schedule>>,
}

impl InMemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_service(&self, service: ServiceDefinition) {
        self.services.write().insert(service.id, service);
    }

    pub fn insert_config(&self, config: ExecutionConfig) {
        self.configs.write().insert(config.id, config);
    }

    pub fn insert_mapping(&self, mapping: ContinuationMapping) {
        self.mappings.write().insert(mapping.id, mapping);
    }

    pub fn insert_schedule(&self, schedule: Schedule) {
        self.schedules.write().insert(schedule.id, schedule);
    }

    /// Soft-delete a service; subsequent lookups raise NotFound.
    pub fn soft_delete_service(&self, id: i64) {
        if let Some(service) = self.services.write().get_mut(&id) {
            service.deleted = true;
            service.deleted_at = Some(chrono::Utc::now());
        }
    }

    pub fn soft_delete_config(&self, id: i64) {
        if let Some(config) = self.configs.write().get_mut(&id) {
            config.deleted = true;
            config.deleted_at = Some(chrono::Utc::now());
        }
    }
}

#[async_trait::async_trait]
impl ConfigurationStore for InMemoryConfigStore {
    async fn service_by_name(&self, name: &str) -> Result<ServiceDefinition> {
        self.services
            .read()
            .values()
            .find(|s| !s.deleted && s.name == name)
            .cloned()
            .ok_or_else(|| RelayError::NotFound(format!("service '{name}'")))
    }

    async fn service_by_id(&self, id: i64) -> Result<ServiceDefinition> {
        self.services
            .read()
            .get(&id)
            .filter(|s| !s.deleted)
            .cloned()
            .ok_or_else(|| RelayError::NotFound(format!("service {id}")))
    }

    async fn configs_by_service(&self, service_id: i64) -> Result<Vec<ExecutionConfig>> {
        let mut configs: Vec<ExecutionConfig> = self
            .configs
            .read()
            .values()
            .filter(|c| !c.deleted && c.service_id == service_id)
            .cloned()
            .collect();
        configs.sort_by_key(|c| c.id);
        Ok(configs)
    }

    async fn config_by_id(&self, id: i64) -> Result<ExecutionConfig> {
        self.configs
            .read()
            .get(&id)
            .filter(|c| !c.deleted)
            .cloned()
            .ok_or_else(|| RelayError::NotFound(format!("execution config {id}")))
    }

    async fn continuations_by_config(&self, config_id: i64) -> Result<Vec<ContinuationMapping>> {
        let mut mappings: Vec<ContinuationMapping> = self
            .mappings
            .read()
            .values()
            .filter(|m| !m.deleted && m.source_config_id == config_id)
            .cloned()
            .collect();
        mappings.sort_by_key(|m| m.id);
        Ok(mappings)
    }

    async fn schedule_by_config(&self, config_id: i64) -> Result<Option<Schedule>> {
        Ok(self
            .schedules
            .read()
            .values()
            .find(|s| !s.deleted && s.config_id == config_id)
            .cloned())
    }

    async fn scheduled_configs(&self) -> Result<Vec<ExecutionConfig>> {
        let mut configs: Vec<ExecutionConfig> = self
            .configs
            .read()
            .values()
            .filter(|c| !c.deleted && c.is_scheduled)
            .cloned()
            .collect();
        configs.sort_by_key(|c| c.id);
        Ok(configs)
    }
}

/// Process-local append-only [`AuditStore`].
#[derive(Default)]
pub struct InMemoryAuditStore {
    records: RwLock<Vec<ExecutionRecord>>,
    next_id: AtomicI64,
}

impl InMemoryAuditStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
            next_id: AtomicI64::new(1),
        }
    }

    /// Snapshot of all recorded executions, insertion order.
    pub fn records(&self) -> Vec<ExecutionRecord> {
        self.records.read().clone()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

#[async_trait::async_trait]
impl AuditStore for InMemoryAuditStore {
    async fn insert(&self, record: NewExecutionRecord) -> Result<ExecutionRecord> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let record = record.with_id(id);
        self.records.write().push(record.clone());
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[tokio::test]
    async fn soft_deleted_services_are_not_found() {
        let store = InMemoryConfigStore::new();
        store.insert_service(ServiceDefinition::new(1, "Orders"));
        assert!(store.service_by_name("Orders").await.is_ok());

        store.soft_delete_service(1);
        assert!(matches!(
            store.service_by_name("Orders").await,
            Err(RelayError::NotFound(_))
        ));
        assert!(matches!(
            store.service_by_id(1).await,
            Err(RelayError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn audit_ids_are_sequential() {
        let store = InMemoryAuditStore::new();
        let record = NewExecutionRecord {
            service_id: 1,
            config_id: 1,
            triggered_by: None,
            executed_at: Utc::now(),
            duration_seconds: 0.1,
            success: true,
            error_message: None,
            parameters_json: None,
            result_json: None,
        };
        let first = store.insert(record.clone()).await.unwrap();
        let second = store.insert(record).await.unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(store.len(), 2);
    }
}
