use crate::error::{RelayError, Result};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

/// Which backend an execution configuration targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetKind {
    StoredProcedure,
    SqlView,
    Endpoint,
}

impl TargetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetKind::StoredProcedure => "stored_procedure",
            TargetKind::SqlView => "sql_view",
            TargetKind::Endpoint => "endpoint",
        }
    }
}

/// Database engine behind a SQL-backed target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SqlProvider {
    SqlServer,
    MySql,
    PostgreSql,
    Oracle,
}

impl SqlProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            SqlProvider::SqlServer => "sqlserver",
            SqlProvider::MySql => "mysql",
            SqlProvider::PostgreSql => "postgresql",
            SqlProvider::Oracle => "oracle",
        }
    }
}

/// The resolved "how to run it" record for a service: target, connection,
/// declared parameters and policy flags. Owned by the configuration store;
/// the orchestration core only reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionConfig {
    pub id: i64,
    pub service_id: i64,
    pub target_kind: TargetKind,
    /// Procedure or view name, or endpoint path.
    pub target: String,
    /// Opaque connection descriptor: a database connection string for SQL
    /// targets, a base URL for endpoint targets.
    pub connection: String,
    pub provider: SqlProvider,
    /// Declared parameter names mapped to display labels. Used both for
    /// dispatch-time validation and for documentation surfaces.
    pub parameters: IndexMap<String, String>,
    /// Maximum retry attempts for one execution. Zero means a single
    /// attempt with no retry.
    pub max_retries: u32,
    /// Per-attempt timeout in seconds. Zero disables the attempt timeout.
    pub attempt_timeout_seconds: u64,
    /// Whether executions of this config are persisted to the audit trail.
    pub record_executions: bool,
    /// Whether a completed execution continues into mapped follow-ups.
    pub has_continuation: bool,
    /// Whether this config participates in cron scheduling.
    pub is_scheduled: bool,
    /// Stored JSON object of default parameters for scheduled runs.
    pub default_parameters: Option<String>,
    pub deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ExecutionConfig {
    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_secs(self.attempt_timeout_seconds)
    }

    /// Identity of the logical backend this config calls, used to key the
    /// circuit-breaker registry so every config sharing a backend shares
    /// its breaker.
    pub fn backend_key(&self) -> String {
        match self.target_kind {
            TargetKind::Endpoint => format!("endpoint:{}", self.connection),
            _ => format!("{}:{}", self.provider.as_str(), self.connection),
        }
    }

    /// Enforce the record invariants: non-empty target and
    /// case-insensitively unique declared parameter names.
    pub fn validate(&self) -> Result<()> {
        if self.target.trim().is_empty() {
            return Err(RelayError::Validation(format!(
                "execution config {} has an empty target identifier",
                self.id
            )));
        }

        let mut seen = HashSet::new();
        for name in self.parameters.keys() {
            if !seen.insert(name.to_lowercase()) {
                return Err(RelayError::Validation(format!(
                    "execution config {} declares duplicate parameter '{name}'",
                    self.id
                )));
            }
        }
        Ok(())
    }
}
