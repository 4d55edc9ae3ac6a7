//! Service dispatch: resolve a name to its execution configuration,
//! validate the supplied parameters and route to the matching strategy.
//!
//! The dispatcher performs no retries; callers that want resilience invoke
//! it through [`crate::resilience::ResilienceLayer`], as the chain engine
//! does.

use crate::error::{RelayError, Result};
use crate::execution::{ExecutionOutcome, ExecutionStrategy, ParameterMap, StrategyRegistry};
use crate::models::{ExecutionConfig, ServiceDefinition};
use crate::store::ConfigurationStore;
use crate::validation::validate_parameters;
use std::sync::Arc;
use tracing::debug;

pub struct Dispatcher {
    store: Arc<dyn ConfigurationStore>,
    strategies: StrategyRegistry,
}

impl Dispatcher {
    pub fn new(store: Arc<dyn ConfigurationStore>, strategies: StrategyRegistry) -> Self {
        Self { store, strategies }
    }

    /// Resolve a service name to its definition and first live execution
    /// configuration.
    pub async fn resolve(
        &self,
        service_name: &str,
    ) -> Result<(ServiceDefinition, ExecutionConfig)> {
        let service = self.store.service_by_name(service_name).await?;
        if !service.is_available() {
            return Err(RelayError::NotFound(format!(
                "service '{service_name}' is inactive"
            )));
        }

        let config = self
            .store
            .configs_by_service(service.id)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| {
                RelayError::NotFound(format!(
                    "no execution config registered for service '{service_name}'"
                ))
            })?;

        Ok((service, config))
    }

    /// Single dispatch, no chaining: the query-shaped contract.
    pub async fn execute(
        &self,
        service_name: &str,
        params: &ParameterMap,
    ) -> Result<ExecutionOutcome> {
        let (_, config) = self.resolve(service_name).await?;
        self.execute_resolved(&config, params).await
    }

    /// Single dispatch through the scalar contract, returning the
    /// rows-affected count.
    pub async fn execute_scalar(&self, service_name: &str, params: &ParameterMap) -> Result<u64> {
        let (_, config) = self.resolve(service_name).await?;
        validate_parameters(&config.parameters, params)?;
        let strategy = self.strategy_for(&config)?;
        strategy.execute_scalar(&config, params).await
    }

    /// Execute an already-resolved configuration. Used by the chain engine
    /// so resolution happens once per hop.
    pub async fn execute_resolved(
        &self,
        config: &ExecutionConfig,
        params: &ParameterMap,
    ) -> Result<ExecutionOutcome> {
        validate_parameters(&config.parameters, params)?;
        let strategy = self.strategy_for(config)?;

        debug!(
            config_id = config.id,
            target = %config.target,
            kind = config.target_kind.as_str(),
            param_count = params.len(),
            "dispatching execution"
        );

        let rows = strategy.execute_query(config, params).await?;
        Ok(ExecutionOutcome::Rows(rows))
    }

    fn strategy_for(&self, config: &ExecutionConfig) -> Result<Arc<dyn ExecutionStrategy>> {
        self.strategies
            .strategy_for(config.target_kind)
            .ok_or_else(|| {
                RelayError::Configuration(format!(
                    "no execution strategy registered for target kind '{}'",
                    config.target_kind.as_str()
                ))
            })
    }
}
