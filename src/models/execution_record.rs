use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One append-only audit row per execution hop.
///
/// Records form a tree: a root execution has `triggered_by = None`, and
/// every continuation hop points back to the record of the hop that
/// triggered it. Rows are created once per hop, never mutated, never
/// deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionRecord {
    pub id: i64,
    pub service_id: i64,
    pub config_id: i64,
    /// Id of the execution record that triggered this hop, if any.
    pub triggered_by: Option<i64>,
    pub executed_at: DateTime<Utc>,
    pub duration_seconds: f64,
    pub success: bool,
    pub error_message: Option<String>,
    /// Serialized input parameter map.
    pub parameters_json: Option<String>,
    /// Serialized execution result; absent for failed hops.
    pub result_json: Option<String>,
}

/// An execution record before the audit store assigns its id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewExecutionRecord {
    pub service_id: i64,
    pub config_id: i64,
    pub triggered_by: Option<i64>,
    pub executed_at: DateTime<Utc>,
    pub duration_seconds: f64,
    pub success: bool,
    pub error_message: Option<String>,
    pub parameters_json: Option<String>,
    pub result_json: Option<String>,
}

impl NewExecutionRecord {
    /// Materialize the record with its store-assigned id.
    pub fn with_id(self, id: i64) -> ExecutionRecord {
        ExecutionRecord {
            id,
            service_id: self.service_id,
            config_id: self.config_id,
            triggered_by: self.triggered_by,
            executed_at: self.executed_at,
            duration_seconds: self.duration_seconds,
            success: self.success,
            error_message: self.error_message,
            parameters_json: self.parameters_json,
            result_json: self.result_json,
        }
    }
}
