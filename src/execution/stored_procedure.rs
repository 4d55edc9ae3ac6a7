//! Stored-procedure execution strategy.
//!
//! Builds the provider-specific invocation for the configured procedure,
//! binds each declared parameter in order and delegates to the SQL
//! transport. Blank parameter values bind as NULL.

use super::{ordered_bind_values, ExecutionStrategy, ParameterMap, ResultRow};
use crate::error::Result;
use crate::models::{ExecutionConfig, SqlProvider};
use crate::transport::{placeholder, BindValue, SqlExecutor, SqlStatement};
use crate::validation::validate_sql_identifier;
use std::sync::Arc;
use tracing::debug;

pub struct StoredProcedureStrategy {
    executor: Arc<dyn SqlExecutor>,
}

impl StoredProcedureStrategy {
    pub fn new(executor: Arc<dyn SqlExecutor>) -> Self {
        Self { executor }
    }

    fn statement(&self, config: &ExecutionConfig, params: &ParameterMap, query: bool) -> Result<SqlStatement> {
        validate_sql_identifier(&config.target)?;

        let values = ordered_bind_values(config, params);
        let binds: Vec<BindValue> = values.iter().map(|(_, v)| BindValue::from_json(v)).collect();
        let placeholders: Vec<String> = (0..binds.len())
            .map(|i| placeholder(config.provider, i))
            .collect();
        let args = placeholders.join(", ");
        let procedure = &config.target;

        let sql = match (config.provider, query) {
            (SqlProvider::PostgreSql, true) => format!("SELECT * FROM {procedure}({args})"),
            (SqlProvider::PostgreSql, false) => format!("CALL {procedure}({args})"),
            (SqlProvider::MySql, _) => format!("CALL {procedure}({args})"),
            (SqlProvider::SqlServer, _) => {
                if args.is_empty() {
                    format!("EXEC {procedure}")
                } else {
                    format!("EXEC {procedure} {args}")
                }
            }
            (SqlProvider::Oracle, true) => format!("SELECT * FROM TABLE({procedure}({args}))"),
            (SqlProvider::Oracle, false) => format!("BEGIN {procedure}({args}); END;"),
        };

        debug!(
            procedure = %config.target,
            provider = config.provider.as_str(),
            bind_count = binds.len(),
            "prepared stored procedure call"
        );
        Ok(SqlStatement::new(sql, binds))
    }
}

#[async_trait::async_trait]
impl ExecutionStrategy for StoredProcedureStrategy {
    async fn execute_query(
        &self,
        config: &ExecutionConfig,
        params: &ParameterMap,
    ) -> Result<Vec<ResultRow>> {
        let statement = self.statement(config, params, true)?;
        self.executor
            .fetch_rows(&config.connection, config.provider, statement)
            .await
    }

    async fn execute_scalar(
        &self,
        config: &ExecutionConfig,
        params: &ParameterMap,
    ) -> Result<u64> {
        let statement = self.statement(config, params, false)?;
        self.executor
            .execute(&config.connection, config.provider, statement)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TargetKind;
    use chrono::Utc;
    use indexmap::IndexMap;

    struct NoopExecutor;

    #[async_trait::async_trait]
    impl SqlExecutor for NoopExecutor {
        async fn fetch_rows(
            &self,
            _connection: &str,
            _provider: SqlProvider,
            _statement: SqlStatement,
        ) -> Result<Vec<ResultRow>> {
            Ok(vec![])
        }

        async fn execute(
            &self,
            _connection: &str,
            _provider: SqlProvider,
            _statement: SqlStatement,
        ) -> Result<u64> {
            Ok(0)
        }
    }

    fn config(provider: SqlProvider) -> ExecutionConfig {
        let now = Utc::now();
        let mut parameters = IndexMap::new();
        parameters.insert("CustomerId".to_string(), "Customer".to_string());
        parameters.insert("Status".to_string(), "Status".to_string());
        ExecutionConfig {
            id: 1,
            service_id: 1,
            target_kind: TargetKind::StoredProcedure,
            target: "usp_GetOrders".into(),
            connection: "postgres://db/relay".into(),
            provider,
            parameters,
            max_retries: 0,
            attempt_timeout_seconds: 0,
            record_executions: false,
            has_continuation: false,
            is_scheduled: false,
            default_parameters: None,
            deleted: false,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn params() -> ParameterMap {
        let mut params = ParameterMap::new();
        // Supplied out of declared order and with different casing.
        params.insert("status".into(), serde_json::json!("open"));
        params.insert("customerid".into(), serde_json::json!(42));
        params
    }

    #[test]
    fn postgres_query_syntax() {
        let strategy = StoredProcedureStrategy::new(Arc::new(NoopExecutor));
        let statement = strategy
            .statement(&config(SqlProvider::PostgreSql), &params(), true)
            .unwrap();
        assert_eq!(statement.sql, "SELECT * FROM usp_GetOrders($1, $2)");
        // Binds follow declared order, not supplied order.
        assert_eq!(statement.binds[0], BindValue::Int(42));
        assert_eq!(statement.binds[1], BindValue::Text("open".into()));
    }

    #[test]
    fn provider_call_syntax() {
        let strategy = StoredProcedureStrategy::new(Arc::new(NoopExecutor));
        let sql = |provider, query| {
            strategy
                .statement(&config(provider), &params(), query)
                .unwrap()
                .sql
        };
        assert_eq!(sql(SqlProvider::MySql, true), "CALL usp_GetOrders(?, ?)");
        assert_eq!(
            sql(SqlProvider::SqlServer, true),
            "EXEC usp_GetOrders @P1, @P2"
        );
        assert_eq!(
            sql(SqlProvider::Oracle, false),
            "BEGIN usp_GetOrders(:1, :2); END;"
        );
        assert_eq!(
            sql(SqlProvider::PostgreSql, false),
            "CALL usp_GetOrders($1, $2)"
        );
    }

    #[test]
    fn hostile_procedure_name_rejected() {
        let strategy = StoredProcedureStrategy::new(Arc::new(NoopExecutor));
        let mut cfg = config(SqlProvider::PostgreSql);
        cfg.target = "x; DROP TABLE orders".into();
        assert!(strategy.statement(&cfg, &params(), true).is_err());
    }

    #[test]
    fn blank_parameter_binds_null() {
        let strategy = StoredProcedureStrategy::new(Arc::new(NoopExecutor));
        let mut supplied = params();
        supplied.insert("Status".into(), serde_json::json!(""));
        supplied.shift_remove("status");
        let statement = strategy
            .statement(&config(SqlProvider::PostgreSql), &supplied, true)
            .unwrap();
        assert_eq!(statement.binds[1], BindValue::Null);
    }
}
