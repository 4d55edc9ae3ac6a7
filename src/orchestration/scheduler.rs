//! Cron scheduling trigger.
//!
//! Two entry points for the external scheduling daemon: `run_scheduled`
//! fires one configuration's chain if its validity window admits now, and
//! `refresh_triggers` reconciles the daemon's registered triggers with the
//! current set of schedulable configurations.

use crate::error::{RelayError, Result};
use crate::execution::ParameterMap;
use crate::models::ExecutionConfig;
use crate::orchestration::continuation::ChainEngine;
use crate::store::ConfigurationStore;
use crate::validation::validate_cron;
use chrono::Utc;
use futures::future::BoxFuture;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Work the daemon runs when a periodic trigger fires.
pub type TriggerCallback = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

/// The external job-scheduling daemon. It owns cron evaluation and firing;
/// this crate only registers work against it.
#[async_trait::async_trait]
pub trait SchedulerDaemon: Send + Sync {
    async fn register_periodic_trigger(
        &self,
        id: &str,
        cron_expression: &str,
        callback: TriggerCallback,
    ) -> Result<()>;

    async fn remove_trigger(&self, id: &str) -> Result<()>;

    /// Ids of registered triggers whose name starts with `prefix`.
    async fn list_triggers(&self, prefix: &str) -> Result<Vec<String>>;
}

pub struct SchedulerTrigger {
    store: Arc<dyn ConfigurationStore>,
    engine: Arc<ChainEngine>,
    daemon: Arc<dyn SchedulerDaemon>,
    trigger_prefix: String,
}

impl SchedulerTrigger {
    pub fn new(
        store: Arc<dyn ConfigurationStore>,
        engine: Arc<ChainEngine>,
        daemon: Arc<dyn SchedulerDaemon>,
        trigger_prefix: String,
    ) -> Self {
        Self {
            store,
            engine,
            daemon,
            trigger_prefix,
        }
    }

    /// Fire one scheduled configuration's chain.
    ///
    /// Completes as a logged no-op when the configuration is gone, no
    /// longer flagged for scheduling, or its window excludes now; the
    /// trigger may simply be stale until the next reconciliation.
    /// Malformed stored default parameters are tolerated; every other
    /// error propagates to the daemon.
    pub async fn run_scheduled(&self, config_id: i64) -> Result<()> {
        let config = match self.store.config_by_id(config_id).await {
            Ok(config) => config,
            Err(RelayError::NotFound(_)) => {
                debug!(config_id, "scheduled config no longer exists, skipping run");
                return Ok(());
            }
            Err(failure) => return Err(failure),
        };

        if !config.is_scheduled {
            debug!(config_id, "config is no longer scheduled, skipping run");
            return Ok(());
        }

        let Some(schedule) = self.store.schedule_by_config(config_id).await? else {
            debug!(config_id, "scheduled config has no schedule, skipping run");
            return Ok(());
        };

        let now = Utc::now();
        if !schedule.is_active_at(now) {
            debug!(
                config_id,
                starts_at = %schedule.starts_at,
                "schedule window excludes now, skipping run"
            );
            return Ok(());
        }

        let params = Self::default_parameters(&config);
        let service = self.store.service_by_id(config.service_id).await?;

        info!(service = %service.name, config_id, "firing scheduled chain");
        self.engine.run_chain(&service.name, params).await?;
        Ok(())
    }

    /// Stored default parameters for a scheduled run. Malformed JSON is
    /// logged and treated as no parameters rather than blocking the run.
    fn default_parameters(config: &ExecutionConfig) -> ParameterMap {
        let Some(raw) = config.default_parameters.as_deref() else {
            return ParameterMap::new();
        };
        match serde_json::from_str::<ParameterMap>(raw) {
            Ok(params) => params,
            Err(parse_error) => {
                warn!(
                    config_id = config.id,
                    error = %parse_error,
                    "stored default parameters are not a JSON object, proceeding without parameters"
                );
                ParameterMap::new()
            }
        }
    }

    /// Reconcile the daemon's triggers with current configuration: remove
    /// every trigger carrying this system's reserved prefix, then register
    /// one per schedulable configuration with a valid schedule. Idempotent.
    pub async fn refresh_triggers(self: &Arc<Self>) -> Result<()> {
        let stale = self.daemon.list_triggers(&self.trigger_prefix).await?;
        for trigger_id in &stale {
            self.daemon.remove_trigger(trigger_id).await?;
        }

        let mut registered = 0usize;
        for config in self.store.scheduled_configs().await? {
            let Some(schedule) = self.store.schedule_by_config(config.id).await? else {
                warn!(config_id = config.id, "scheduled config has no schedule, not registering");
                continue;
            };

            if let Err(invalid) = validate_cron(&schedule.cron_expression) {
                warn!(
                    config_id = config.id,
                    cron = %schedule.cron_expression,
                    error = %invalid,
                    "invalid cron expression, not registering"
                );
                continue;
            }

            let trigger_id = format!("{}{}", self.trigger_prefix, config.id);
            self.daemon
                .register_periodic_trigger(
                    &trigger_id,
                    &schedule.cron_expression,
                    self.callback_for(config.id),
                )
                .await?;
            registered += 1;
        }

        info!(
            removed = stale.len(),
            registered, "trigger reconciliation complete"
        );
        Ok(())
    }

    fn callback_for(self: &Arc<Self>, config_id: i64) -> TriggerCallback {
        let trigger = Arc::clone(self);
        Arc::new(move || -> BoxFuture<'static, ()> {
            let trigger = Arc::clone(&trigger);
            Box::pin(async move {
                if let Err(failure) = trigger.run_scheduled(config_id).await {
                    error!(config_id, error = %failure, "scheduled chain run failed");
                }
            })
        })
    }
}
