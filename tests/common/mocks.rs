//! Mock collaborators for integration tests: a scripted execution strategy
//! and a recording scheduler daemon.

use parking_lot::Mutex;
use relay_core::error::{RelayError, Result};
use relay_core::execution::{ExecutionStrategy, ParameterMap, ResultRow};
use relay_core::models::ExecutionConfig;
use relay_core::orchestration::{SchedulerDaemon, TriggerCallback};
use std::collections::{HashMap, VecDeque};

/// One scripted reply for a configuration.
#[derive(Debug, Clone)]
pub enum MockResponse {
    Rows(Vec<ResultRow>),
    Scalar(u64),
    Transient(String),
    Broken(String),
}

/// Execution strategy that replays scripted responses per config id and
/// records every call it receives.
#[derive(Default)]
pub struct MockStrategy {
    responses: Mutex<HashMap<i64, VecDeque<MockResponse>>>,
    calls: Mutex<Vec<(i64, ParameterMap)>>,
}

impl MockStrategy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for a configuration. Responses are consumed in
    /// order; an exhausted or unscripted config returns no rows.
    pub fn script(&self, config_id: i64, response: MockResponse) {
        self.responses
            .lock()
            .entry(config_id)
            .or_default()
            .push_back(response);
    }

    /// Every `(config_id, params)` call seen so far, in arrival order.
    pub fn calls(&self) -> Vec<(i64, ParameterMap)> {
        self.calls.lock().clone()
    }

    pub fn calls_for(&self, config_id: i64) -> Vec<ParameterMap> {
        self.calls
            .lock()
            .iter()
            .filter(|(id, _)| *id == config_id)
            .map(|(_, params)| params.clone())
            .collect()
    }

    fn next_response(&self, config_id: i64) -> MockResponse {
        self.responses
            .lock()
            .get_mut(&config_id)
            .and_then(VecDeque::pop_front)
            .unwrap_or(MockResponse::Rows(vec![]))
    }
}

#[async_trait::async_trait]
impl ExecutionStrategy for MockStrategy {
    async fn execute_query(
        &self,
        config: &ExecutionConfig,
        params: &ParameterMap,
    ) -> Result<Vec<ResultRow>> {
        self.calls.lock().push((config.id, params.clone()));
        match self.next_response(config.id) {
            MockResponse::Rows(rows) => Ok(rows),
            MockResponse::Scalar(count) => Ok(vec![row(&[("rowsAffected", count.into())])]),
            MockResponse::Transient(message) => Err(RelayError::transient(message)),
            MockResponse::Broken(message) => Err(RelayError::Configuration(message)),
        }
    }

    async fn execute_scalar(&self, config: &ExecutionConfig, params: &ParameterMap) -> Result<u64> {
        self.calls.lock().push((config.id, params.clone()));
        match self.next_response(config.id) {
            MockResponse::Rows(rows) => Ok(rows.len() as u64),
            MockResponse::Scalar(count) => Ok(count),
            MockResponse::Transient(message) => Err(RelayError::transient(message)),
            MockResponse::Broken(message) => Err(RelayError::Configuration(message)),
        }
    }
}

/// Build a result row from column/value pairs.
pub fn row(pairs: &[(&str, serde_json::Value)]) -> ResultRow {
    pairs
        .iter()
        .map(|(name, value)| (name.to_string(), value.clone()))
        .collect()
}

/// Build a parameter map from name/value pairs.
pub fn params(pairs: &[(&str, serde_json::Value)]) -> ParameterMap {
    pairs
        .iter()
        .map(|(name, value)| (name.to_string(), value.clone()))
        .collect()
}

/// Scheduler daemon double that keeps registered triggers in memory so
/// tests can inspect reconciliation and fire callbacks by hand.
#[derive(Default)]
pub struct MockDaemon {
    triggers: Mutex<HashMap<String, (String, TriggerCallback)>>,
    removals: Mutex<Vec<String>>,
}

impl MockDaemon {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-register a trigger, as a previous process generation would have.
    pub fn seed_trigger(&self, id: &str, cron: &str) {
        let callback: TriggerCallback =
            std::sync::Arc::new(|| -> futures::future::BoxFuture<'static, ()> {
                Box::pin(async {})
            });
        self.triggers
            .lock()
            .insert(id.to_string(), (cron.to_string(), callback));
    }

    pub fn trigger_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.triggers.lock().keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn cron_for(&self, id: &str) -> Option<String> {
        self.triggers.lock().get(id).map(|(cron, _)| cron.clone())
    }

    pub fn removals(&self) -> Vec<String> {
        self.removals.lock().clone()
    }

    /// Fire a registered trigger's callback, as the daemon would on a cron
    /// tick.
    pub async fn fire(&self, id: &str) {
        let callback = self
            .triggers
            .lock()
            .get(id)
            .map(|(_, callback)| callback.clone());
        if let Some(callback) = callback {
            callback().await;
        }
    }
}

#[async_trait::async_trait]
impl SchedulerDaemon for MockDaemon {
    async fn register_periodic_trigger(
        &self,
        id: &str,
        cron_expression: &str,
        callback: TriggerCallback,
    ) -> Result<()> {
        self.triggers
            .lock()
            .insert(id.to_string(), (cron_expression.to_string(), callback));
        Ok(())
    }

    async fn remove_trigger(&self, id: &str) -> Result<()> {
        self.triggers.lock().remove(id);
        self.removals.lock().push(id.to_string());
        Ok(())
    }

    async fn list_triggers(&self, prefix: &str) -> Result<Vec<String>> {
        Ok(self
            .triggers
            .lock()
            .keys()
            .filter(|id| id.starts_with(prefix))
            .cloned()
            .collect())
    }
}
