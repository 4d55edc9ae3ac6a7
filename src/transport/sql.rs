//! Bundled SQL executor over `sqlx`'s Any driver.
//!
//! Covers the PostgreSql and MySql providers with one pool cache keyed by
//! connection descriptor. SqlServer and Oracle have no sqlx driver;
//! deployments targeting them plug in their own [`SqlExecutor`].

use super::{BindValue, SqlExecutor, SqlStatement};
use crate::error::{RelayError, Result};
use crate::execution::ResultRow;
use crate::models::SqlProvider;
use dashmap::DashMap;
use sqlx::any::{install_default_drivers, AnyPoolOptions, AnyRow};
use sqlx::{AnyPool, Column, Row};
use std::sync::OnceLock;
use tracing::debug;

static DRIVERS_INSTALLED: OnceLock<()> = OnceLock::new();

/// `sqlx`-backed [`SqlExecutor`] with per-connection pooling.
pub struct SqlxExecutor {
    pools: DashMap<String, AnyPool>,
    max_connections: u32,
}

impl SqlxExecutor {
    pub fn new(max_connections: u32) -> Self {
        DRIVERS_INSTALLED.get_or_init(install_default_drivers);
        Self {
            pools: DashMap::new(),
            max_connections,
        }
    }

    fn ensure_supported(&self, provider: SqlProvider, connection: &str) -> Result<()> {
        let expected_scheme = match provider {
            SqlProvider::PostgreSql => "postgres",
            SqlProvider::MySql => "mysql",
            SqlProvider::SqlServer | SqlProvider::Oracle => {
                return Err(RelayError::Configuration(format!(
                    "provider '{}' is not supported by the bundled sqlx connector",
                    provider.as_str()
                )))
            }
        };
        if !connection.starts_with(expected_scheme) {
            return Err(RelayError::Configuration(format!(
                "connection descriptor does not match provider '{}'",
                provider.as_str()
            )));
        }
        Ok(())
    }

    async fn pool_for(&self, connection: &str) -> Result<AnyPool> {
        if let Some(pool) = self.pools.get(connection) {
            return Ok(pool.clone());
        }
        debug!(descriptor = redact(connection), "opening connection pool");
        let pool = AnyPoolOptions::new()
            .max_connections(self.max_connections)
            .connect(connection)
            .await
            .map_err(classify_sqlx_error)?;
        self.pools.insert(connection.to_string(), pool.clone());
        Ok(pool)
    }
}

#[async_trait::async_trait]
impl SqlExecutor for SqlxExecutor {
    async fn fetch_rows(
        &self,
        connection: &str,
        provider: SqlProvider,
        statement: SqlStatement,
    ) -> Result<Vec<ResultRow>> {
        self.ensure_supported(provider, connection)?;
        let pool = self.pool_for(connection).await?;

        let mut query = sqlx::query::<sqlx::Any>(&statement.sql);
        for bind in &statement.binds {
            query = bind_value(query, bind);
        }

        let rows = query.fetch_all(&pool).await.map_err(classify_sqlx_error)?;
        Ok(rows.iter().map(decode_row).collect())
    }

    async fn execute(
        &self,
        connection: &str,
        provider: SqlProvider,
        statement: SqlStatement,
    ) -> Result<u64> {
        self.ensure_supported(provider, connection)?;
        let pool = self.pool_for(connection).await?;

        let mut query = sqlx::query::<sqlx::Any>(&statement.sql);
        for bind in &statement.binds {
            query = bind_value(query, bind);
        }

        let done = query.execute(&pool).await.map_err(classify_sqlx_error)?;
        Ok(done.rows_affected())
    }
}

type AnyQuery<'q> = sqlx::query::Query<'q, sqlx::Any, sqlx::any::AnyArguments<'q>>;

fn bind_value<'q>(query: AnyQuery<'q>, bind: &BindValue) -> AnyQuery<'q> {
    match bind {
        BindValue::Null => query.bind(Option::<String>::None),
        BindValue::Bool(b) => query.bind(*b),
        BindValue::Int(i) => query.bind(*i),
        BindValue::Float(f) => query.bind(*f),
        BindValue::Text(s) => query.bind(s.clone()),
    }
}

fn decode_row(row: &AnyRow) -> ResultRow {
    let mut record = ResultRow::new();
    for (index, column) in row.columns().iter().enumerate() {
        record.insert(column.name().to_string(), decode_column(row, index));
    }
    record
}

/// Decode one column into the relay value space, trying the narrow types
/// first so numeric columns keep their shape.
fn decode_column(row: &AnyRow, index: usize) -> serde_json::Value {
    if let Ok(value) = row.try_get::<Option<i64>, _>(index) {
        return value.map(serde_json::Value::from).unwrap_or(serde_json::Value::Null);
    }
    if let Ok(value) = row.try_get::<Option<f64>, _>(index) {
        return value.map(serde_json::Value::from).unwrap_or(serde_json::Value::Null);
    }
    if let Ok(value) = row.try_get::<Option<bool>, _>(index) {
        return value.map(serde_json::Value::from).unwrap_or(serde_json::Value::Null);
    }
    if let Ok(value) = row.try_get::<Option<String>, _>(index) {
        return value.map(serde_json::Value::from).unwrap_or(serde_json::Value::Null);
    }
    serde_json::Value::Null
}

/// Timeouts and connectivity failures are transient; everything else is a
/// terminal configuration or statement problem.
fn classify_sqlx_error(error: sqlx::Error) -> RelayError {
    match &error {
        sqlx::Error::PoolTimedOut => RelayError::transient("connection pool timed out"),
        sqlx::Error::Io(io) => RelayError::transient(format!("database io failure: {io}")),
        sqlx::Error::PoolClosed => RelayError::transient("connection pool closed"),
        _ => RelayError::Configuration(format!("database call failed: {error}")),
    }
}

fn redact(connection: &str) -> String {
    match connection.split_once('@') {
        Some((_, host)) => format!("<credentials>@{host}"),
        None => connection.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_providers_are_configuration_errors() {
        let executor = SqlxExecutor::new(4);
        let err = executor
            .ensure_supported(SqlProvider::Oracle, "oracle://db")
            .unwrap_err();
        assert!(matches!(err, RelayError::Configuration(_)));
    }

    #[test]
    fn provider_scheme_mismatch_rejected() {
        let executor = SqlxExecutor::new(4);
        let err = executor
            .ensure_supported(SqlProvider::PostgreSql, "mysql://db/relay")
            .unwrap_err();
        assert!(matches!(err, RelayError::Configuration(_)));
        assert!(executor
            .ensure_supported(SqlProvider::PostgreSql, "postgresql://db/relay")
            .is_ok());
    }

    #[test]
    fn credentials_redacted_from_logs() {
        assert_eq!(
            redact("postgres://user:secret@db/relay"),
            "<credentials>@db/relay"
        );
    }
}
