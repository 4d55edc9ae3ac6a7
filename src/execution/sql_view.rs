//! SQL-view execution strategy.
//!
//! Selects from the configured view with one equality predicate per
//! non-empty supplied parameter. Predicate order follows the declared
//! parameter order; clauses are AND-ed. Empty parameters contribute no
//! predicate rather than matching NULL.

use super::{ordered_bind_values, ExecutionStrategy, ParameterMap, ResultRow};
use crate::error::Result;
use crate::models::ExecutionConfig;
use crate::transport::{placeholder, BindValue, SqlExecutor, SqlStatement};
use crate::validation::validate_sql_identifier;
use std::sync::Arc;
use tracing::debug;

pub struct SqlViewStrategy {
    executor: Arc<dyn SqlExecutor>,
}

impl SqlViewStrategy {
    pub fn new(executor: Arc<dyn SqlExecutor>) -> Self {
        Self { executor }
    }

    fn statement(&self, config: &ExecutionConfig, params: &ParameterMap) -> Result<SqlStatement> {
        validate_sql_identifier(&config.target)?;

        let mut binds = Vec::new();
        let mut predicates = Vec::new();
        for (name, value) in ordered_bind_values(config, params) {
            let bind = BindValue::from_json(&value);
            if bind.is_null() {
                continue;
            }
            validate_sql_identifier(&name)?;
            predicates.push(format!(
                "{name} = {}",
                placeholder(config.provider, binds.len())
            ));
            binds.push(bind);
        }

        let mut sql = format!("SELECT * FROM {}", config.target);
        if !predicates.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&predicates.join(" AND "));
        }

        debug!(
            view = %config.target,
            predicate_count = predicates.len(),
            "prepared view query"
        );
        Ok(SqlStatement::new(sql, binds))
    }
}

#[async_trait::async_trait]
impl ExecutionStrategy for SqlViewStrategy {
    async fn execute_query(
        &self,
        config: &ExecutionConfig,
        params: &ParameterMap,
    ) -> Result<Vec<ResultRow>> {
        let statement = self.statement(config, params)?;
        self.executor
            .fetch_rows(&config.connection, config.provider, statement)
            .await
    }

    /// The scalar contract for a view is its matching row count.
    async fn execute_scalar(
        &self,
        config: &ExecutionConfig,
        params: &ParameterMap,
    ) -> Result<u64> {
        let rows = self.execute_query(config, params).await?;
        Ok(rows.len() as u64)
    }
}
