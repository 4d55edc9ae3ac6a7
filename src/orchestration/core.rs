//! Orchestrator facade: wires stores, transports, strategies, resilience,
//! chain engine and scheduler together, and exposes the surface the HTTP
//! layer consumes.

use crate::config::RelayConfig;
use crate::error::Result;
use crate::execution::{
    EndpointStrategy, ExecutionOutcome, ParameterMap, SqlViewStrategy, StoredProcedureStrategy,
    StrategyRegistry,
};
use crate::models::TargetKind;
use crate::orchestration::audit::AuditTrail;
use crate::orchestration::continuation::ChainEngine;
use crate::orchestration::dispatcher::Dispatcher;
use crate::orchestration::scheduler::{SchedulerDaemon, SchedulerTrigger};
use crate::resilience::ResilienceLayer;
use crate::store::{AuditStore, ConfigurationStore};
use crate::transport::{ReqwestTransport, SqlxExecutor};
use std::sync::Arc;

pub struct Orchestrator {
    dispatcher: Arc<Dispatcher>,
    engine: Arc<ChainEngine>,
    scheduler: Arc<SchedulerTrigger>,
}

impl Orchestrator {
    /// Assemble the core from explicit collaborators. Tests inject mock
    /// strategies and stores here.
    pub fn new(
        runtime: RelayConfig,
        store: Arc<dyn ConfigurationStore>,
        audit_store: Arc<dyn AuditStore>,
        strategies: StrategyRegistry,
        daemon: Arc<dyn SchedulerDaemon>,
    ) -> Self {
        let resilience = Arc::new(ResilienceLayer::new(runtime.clone()));
        let dispatcher = Arc::new(Dispatcher::new(Arc::clone(&store), strategies));
        let engine = Arc::new(ChainEngine::new(
            Arc::clone(&store),
            Arc::clone(&dispatcher),
            resilience,
            AuditTrail::new(audit_store),
            runtime.orchestration.fan_out_limit,
        ));
        let scheduler = Arc::new(SchedulerTrigger::new(
            store,
            Arc::clone(&engine),
            daemon,
            runtime.scheduler.trigger_prefix.clone(),
        ));

        Self {
            dispatcher,
            engine,
            scheduler,
        }
    }

    /// Assemble the core with the bundled sqlx and reqwest transports
    /// behind the three standard strategies.
    pub fn with_default_transports(
        runtime: RelayConfig,
        store: Arc<dyn ConfigurationStore>,
        audit_store: Arc<dyn AuditStore>,
        daemon: Arc<dyn SchedulerDaemon>,
    ) -> Result<Self> {
        let sql = Arc::new(SqlxExecutor::new(10));
        let http = Arc::new(ReqwestTransport::new(runtime.http_timeout())?);

        let strategies = StrategyRegistry::new()
            .register(
                TargetKind::StoredProcedure,
                Arc::new(StoredProcedureStrategy::new(sql.clone())),
            )
            .register(TargetKind::SqlView, Arc::new(SqlViewStrategy::new(sql)))
            .register(TargetKind::Endpoint, Arc::new(EndpointStrategy::new(http)));

        Ok(Self::new(runtime, store, audit_store, strategies, daemon))
    }

    /// Single dispatch, no chaining.
    pub async fn execute(
        &self,
        service_name: &str,
        params: &ParameterMap,
    ) -> Result<ExecutionOutcome> {
        self.dispatcher.execute(service_name, params).await
    }

    /// Single dispatch through the scalar contract.
    pub async fn execute_scalar(&self, service_name: &str, params: &ParameterMap) -> Result<u64> {
        self.dispatcher.execute_scalar(service_name, params).await
    }

    /// Full continuation chain.
    pub async fn run_chain(
        &self,
        service_name: &str,
        params: ParameterMap,
    ) -> Result<ExecutionOutcome> {
        self.engine.run_chain(service_name, params).await
    }

    /// Scheduler-invoked entry point.
    pub async fn run_scheduled(&self, config_id: i64) -> Result<()> {
        self.scheduler.run_scheduled(config_id).await
    }

    /// Administrative trigger reconciliation.
    pub async fn refresh_triggers(&self) -> Result<()> {
        self.scheduler.refresh_triggers().await
    }

    pub fn scheduler(&self) -> &Arc<SchedulerTrigger> {
        &self.scheduler
    }

    pub fn engine(&self) -> &Arc<ChainEngine> {
        &self.engine
    }
}
