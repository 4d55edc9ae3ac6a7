//! # Outbound Transports
//!
//! Seams to the outside world consumed by the execution strategies: a SQL
//! executor keyed by provider and an HTTP client for endpoint calls. The
//! bundled implementations ([`SqlxExecutor`], [`ReqwestTransport`]) cover
//! the common cases; deployments with other drivers supply their own trait
//! implementations.

pub mod http;
pub mod sql;

use crate::error::Result;
use crate::execution::ResultRow;
use crate::models::SqlProvider;
use serde::{Deserialize, Serialize};

pub use http::ReqwestTransport;
pub use sql::SqlxExecutor;

/// A single bindable SQL value. The relay value space is intentionally
/// narrow: string, number, boolean or null, mirroring what result rows can
/// carry back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BindValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl BindValue {
    /// Convert a JSON parameter value to its SQL binding. Empty and blank
    /// strings bind as NULL; nested structures degrade to their JSON text.
    pub fn from_json(value: &serde_json::Value) -> BindValue {
        match value {
            serde_json::Value::Null => BindValue::Null,
            serde_json::Value::Bool(b) => BindValue::Bool(*b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    BindValue::Int(i)
                } else {
                    BindValue::Float(n.as_f64().unwrap_or(0.0))
                }
            }
            serde_json::Value::String(s) => {
                if s.trim().is_empty() {
                    BindValue::Null
                } else {
                    BindValue::Text(s.clone())
                }
            }
            other => BindValue::Text(other.to_string()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, BindValue::Null)
    }
}

/// SQL text plus its ordered bind values.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlStatement {
    pub sql: String,
    pub binds: Vec<BindValue>,
}

impl SqlStatement {
    pub fn new(sql: impl Into<String>, binds: Vec<BindValue>) -> Self {
        Self {
            sql: sql.into(),
            binds,
        }
    }
}

/// Positional placeholder syntax for a provider, 0-indexed.
pub fn placeholder(provider: SqlProvider, index: usize) -> String {
    match provider {
        SqlProvider::PostgreSql => format!("${}", index + 1),
        SqlProvider::MySql => "?".to_string(),
        SqlProvider::SqlServer => format!("@P{}", index + 1),
        SqlProvider::Oracle => format!(":{}", index + 1),
    }
}

/// Executes prepared SQL against a connection descriptor.
#[async_trait::async_trait]
pub trait SqlExecutor: Send + Sync {
    /// Run a query-shaped statement and return its ordered rows.
    async fn fetch_rows(
        &self,
        connection: &str,
        provider: SqlProvider,
        statement: SqlStatement,
    ) -> Result<Vec<ResultRow>>;

    /// Run a scalar-shaped statement and return the rows-affected count.
    async fn execute(
        &self,
        connection: &str,
        provider: SqlProvider,
        statement: SqlStatement,
    ) -> Result<u64>;
}

/// Posts JSON bodies to endpoint targets.
#[async_trait::async_trait]
pub trait HttpTransport: Send + Sync {
    async fn post_json(&self, url: &str, body: &serde_json::Value) -> Result<serde_json::Value>;
}
