//! Append-only audit trail: one record per execution hop, linked to the
//! hop that triggered it so the execution tree can be reconstructed.

use crate::error::Result;
use crate::execution::{ExecutionOutcome, ParameterMap};
use crate::models::{ExecutionConfig, NewExecutionRecord, ExecutionRecord};
use crate::store::AuditStore;
use chrono::Utc;
use std::sync::Arc;
use tracing::debug;

pub struct AuditTrail {
    store: Arc<dyn AuditStore>,
}

impl AuditTrail {
    pub fn new(store: Arc<dyn AuditStore>) -> Self {
        Self { store }
    }

    /// Persist a successful hop.
    pub async fn record_success(
        &self,
        config: &ExecutionConfig,
        params: &ParameterMap,
        outcome: &ExecutionOutcome,
        duration_seconds: f64,
        triggered_by: Option<i64>,
    ) -> Result<ExecutionRecord> {
        let record = self
            .store
            .insert(NewExecutionRecord {
                service_id: config.service_id,
                config_id: config.id,
                triggered_by,
                executed_at: Utc::now(),
                duration_seconds,
                success: true,
                error_message: None,
                parameters_json: Some(serde_json::to_string(params)?),
                result_json: Some(outcome.to_json().to_string()),
            })
            .await?;

        debug!(
            record_id = record.id,
            config_id = config.id,
            triggered_by,
            "recorded successful execution"
        );
        Ok(record)
    }

    /// Persist a failed hop: error message, no result.
    pub async fn record_failure(
        &self,
        config: &ExecutionConfig,
        params: &ParameterMap,
        error_message: &str,
        duration_seconds: f64,
        triggered_by: Option<i64>,
    ) -> Result<ExecutionRecord> {
        let record = self
            .store
            .insert(NewExecutionRecord {
                service_id: config.service_id,
                config_id: config.id,
                triggered_by,
                executed_at: Utc::now(),
                duration_seconds,
                success: false,
                error_message: Some(error_message.to_string()),
                parameters_json: Some(serde_json::to_string(params)?),
                result_json: None,
            })
            .await?;

        debug!(
            record_id = record.id,
            config_id = config.id,
            triggered_by,
            "recorded failed execution"
        );
        Ok(record)
    }
}
