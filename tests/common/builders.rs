//! Fixture builder assembling an orchestrator over the in-memory stores
//! and the mock strategy/daemon.

use super::mocks::{MockDaemon, MockStrategy};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use relay_core::config::RelayConfig;
use relay_core::execution::StrategyRegistry;
use relay_core::models::{
    ContinuationMapping, ExecutionConfig, Schedule, ServiceDefinition, SqlProvider, TargetKind,
};
use relay_core::orchestration::Orchestrator;
use relay_core::store::{InMemoryAuditStore, InMemoryConfigStore};
use std::sync::Arc;

pub struct Fixture {
    pub store: Arc<InMemoryConfigStore>,
    pub audit: Arc<InMemoryAuditStore>,
    pub strategy: Arc<MockStrategy>,
    pub daemon: Arc<MockDaemon>,
    next_id: i64,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            store: Arc::new(InMemoryConfigStore::new()),
            audit: Arc::new(InMemoryAuditStore::new()),
            strategy: Arc::new(MockStrategy::new()),
            daemon: Arc::new(MockDaemon::new()),
            next_id: 1,
        }
    }

    fn next_id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn add_service(&mut self, name: &str) -> i64 {
        let id = self.next_id();
        self.store.insert_service(ServiceDefinition::new(id, name));
        id
    }

    /// Register a config for a service, customized through the closure.
    pub fn add_config(
        &mut self,
        service_id: i64,
        customize: impl FnOnce(&mut ExecutionConfig),
    ) -> i64 {
        let id = self.next_id();
        let now = Utc::now();
        let mut config = ExecutionConfig {
            id,
            service_id,
            target_kind: TargetKind::StoredProcedure,
            target: "usp_run".into(),
            connection: "postgres://db/relay".into(),
            provider: SqlProvider::PostgreSql,
            parameters: IndexMap::new(),
            max_retries: 0,
            attempt_timeout_seconds: 0,
            record_executions: true,
            has_continuation: false,
            is_scheduled: false,
            default_parameters: None,
            deleted: false,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        };
        customize(&mut config);
        self.store.insert_config(config);
        id
    }

    /// Service plus config in one step; returns `(service_id, config_id)`.
    pub fn add_service_with_config(
        &mut self,
        name: &str,
        customize: impl FnOnce(&mut ExecutionConfig),
    ) -> (i64, i64) {
        let service_id = self.add_service(name);
        let config_id = self.add_config(service_id, customize);
        (service_id, config_id)
    }

    pub fn add_mapping(&mut self, source_config_id: i64, target_config_id: i64, mapping: &str) -> i64 {
        let id = self.next_id();
        self.store.insert_mapping(ContinuationMapping::new(
            id,
            source_config_id,
            target_config_id,
            mapping,
        ));
        id
    }

    pub fn add_schedule(
        &mut self,
        config_id: i64,
        cron: &str,
        starts_at: DateTime<Utc>,
        ends_at: Option<DateTime<Utc>>,
    ) -> i64 {
        let id = self.next_id();
        self.store
            .insert_schedule(Schedule::new(id, config_id, cron, starts_at, ends_at));
        id
    }

    /// Runtime config tuned for fast tests: millisecond backoff, generous
    /// breaker threshold so retry behavior is observable in isolation.
    pub fn runtime(&self) -> RelayConfig {
        let mut runtime = RelayConfig::default();
        runtime.resilience.base_delay_ms = 1;
        runtime.resilience.failure_threshold = 50;
        runtime.resilience.global_timeout_seconds = 30;
        runtime
    }

    /// Orchestrator with the mock strategy behind every target kind.
    pub fn orchestrator(&self) -> Orchestrator {
        self.orchestrator_with_runtime(self.runtime())
    }

    pub fn orchestrator_with_runtime(&self, runtime: RelayConfig) -> Orchestrator {
        let strategies = StrategyRegistry::new()
            .register(TargetKind::StoredProcedure, self.strategy.clone())
            .register(TargetKind::SqlView, self.strategy.clone())
            .register(TargetKind::Endpoint, self.strategy.clone());

        Orchestrator::new(
            runtime,
            self.store.clone(),
            self.audit.clone(),
            strategies,
            self.daemon.clone(),
        )
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}
