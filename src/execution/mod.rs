//! # Execution Strategies
//!
//! Interchangeable backends sharing one contract: given an execution
//! configuration and a parameter map, return rows or a rows-affected count.
//!
//! ## Architecture
//!
//! - [`StoredProcedureStrategy`] invokes a named procedure over the SQL
//!   transport using provider-specific call syntax.
//! - [`SqlViewStrategy`] selects from a view with AND-ed equality
//!   predicates derived from the supplied parameters.
//! - [`EndpointStrategy`] POSTs the parameters as JSON to a configured
//!   endpoint and maps the response back to rows.
//!
//! The dispatcher selects a strategy through [`StrategyRegistry`] by the
//! configuration's target kind; strategies never retry — retry and breaker
//! protection belong to [`crate::resilience`].

pub mod endpoint;
pub mod sql_view;
pub mod stored_procedure;

use crate::error::Result;
use crate::models::{ExecutionConfig, TargetKind};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

pub use endpoint::EndpointStrategy;
pub use sql_view::SqlViewStrategy;
pub use stored_procedure::StoredProcedureStrategy;

/// Caller-supplied parameters for one execution, name to JSON value.
/// Insertion order is preserved so SQL binds are deterministic.
pub type ParameterMap = IndexMap<String, serde_json::Value>;

/// One result row: column name to value, column order preserved. Values are
/// typed by the source: string, number, boolean or null.
pub type ResultRow = IndexMap<String, serde_json::Value>;

/// What an execution produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExecutionOutcome {
    /// An ordered sequence of rows from a query-shaped execution.
    Rows(Vec<ResultRow>),
    /// A rows-affected count from a scalar-shaped execution.
    RowsAffected(u64),
}

impl ExecutionOutcome {
    pub fn rows(&self) -> Option<&[ResultRow]> {
        match self {
            ExecutionOutcome::Rows(rows) => Some(rows),
            ExecutionOutcome::RowsAffected(_) => None,
        }
    }

    pub fn row_count(&self) -> usize {
        match self {
            ExecutionOutcome::Rows(rows) => rows.len(),
            ExecutionOutcome::RowsAffected(_) => 0,
        }
    }

    /// JSON rendering persisted by the audit trail.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            ExecutionOutcome::Rows(rows) => serde_json::to_value(rows).unwrap_or_default(),
            ExecutionOutcome::RowsAffected(count) => {
                serde_json::json!({ "rowsAffected": count })
            }
        }
    }
}

/// Shared contract for all execution backends.
#[async_trait::async_trait]
pub trait ExecutionStrategy: Send + Sync {
    /// Execute and return the ordered result rows.
    async fn execute_query(
        &self,
        config: &ExecutionConfig,
        params: &ParameterMap,
    ) -> Result<Vec<ResultRow>>;

    /// Execute and return the number of rows affected.
    async fn execute_scalar(&self, config: &ExecutionConfig, params: &ParameterMap)
        -> Result<u64>;
}

/// Tagged dispatch table from target kind to strategy. Built once at
/// startup; tests register mocks in place of the bundled strategies.
#[derive(Clone, Default)]
pub struct StrategyRegistry {
    strategies: HashMap<TargetKind, Arc<dyn ExecutionStrategy>>,
}

impl StrategyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, kind: TargetKind, strategy: Arc<dyn ExecutionStrategy>) -> Self {
        self.strategies.insert(kind, strategy);
        self
    }

    pub fn strategy_for(&self, kind: TargetKind) -> Option<Arc<dyn ExecutionStrategy>> {
        self.strategies.get(&kind).cloned()
    }
}

/// Resolve a supplied parameter value by declared name, case-insensitively.
pub(crate) fn lookup_param<'a>(
    params: &'a ParameterMap,
    name: &str,
) -> Option<&'a serde_json::Value> {
    params
        .get(name)
        .or_else(|| params.iter().find(|(k, _)| k.eq_ignore_ascii_case(name)).map(|(_, v)| v))
}

/// Values bound for one execution, in declared-parameter order when the
/// configuration declares parameters, otherwise in supplied order.
pub(crate) fn ordered_bind_values(
    config: &ExecutionConfig,
    params: &ParameterMap,
) -> Vec<(String, serde_json::Value)> {
    if config.parameters.is_empty() {
        return params.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
    }
    config
        .parameters
        .keys()
        .filter_map(|name| lookup_param(params, name).map(|v| (name.clone(), v.clone())))
        .collect()
}
