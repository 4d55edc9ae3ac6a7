//! HTTP-endpoint execution strategy.
//!
//! Serializes the parameter map to a JSON body, POSTs it to the URL formed
//! from the configuration's base connection and target path, and maps the
//! JSON response back to result rows.

use super::{ExecutionStrategy, ParameterMap, ResultRow};
use crate::error::{RelayError, Result};
use crate::models::ExecutionConfig;
use crate::transport::HttpTransport;
use std::sync::Arc;
use tracing::debug;

pub struct EndpointStrategy {
    transport: Arc<dyn HttpTransport>,
}

impl EndpointStrategy {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }

    fn url_for(config: &ExecutionConfig) -> Result<String> {
        let base = config.connection.trim_end_matches('/');
        if base.is_empty() {
            return Err(RelayError::Configuration(format!(
                "execution config {} has no endpoint base url",
                config.id
            )));
        }
        let path = config.target.trim_matches('/');
        Ok(format!("{base}/{path}"))
    }

    fn body_for(params: &ParameterMap) -> serde_json::Value {
        let mut body = serde_json::Map::new();
        for (name, value) in params {
            body.insert(name.clone(), value.clone());
        }
        serde_json::Value::Object(body)
    }

    /// Map a response body to rows: an array of objects becomes one row per
    /// object, a single object one row, and any scalar a one-column
    /// `value` row.
    fn rows_from(response: serde_json::Value) -> Vec<ResultRow> {
        match response {
            serde_json::Value::Null => vec![],
            serde_json::Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    serde_json::Value::Object(map) => map.into_iter().collect(),
                    other => single_value_row(other),
                })
                .collect(),
            serde_json::Value::Object(map) => vec![map.into_iter().collect()],
            other => vec![single_value_row(other)],
        }
    }
}

fn single_value_row(value: serde_json::Value) -> ResultRow {
    let mut row = ResultRow::new();
    row.insert("value".to_string(), value);
    row
}

#[async_trait::async_trait]
impl ExecutionStrategy for EndpointStrategy {
    async fn execute_query(
        &self,
        config: &ExecutionConfig,
        params: &ParameterMap,
    ) -> Result<Vec<ResultRow>> {
        let url = Self::url_for(config)?;
        debug!(config_id = config.id, %url, "dispatching endpoint call");
        let response = self.transport.post_json(&url, &Self::body_for(params)).await?;
        Ok(Self::rows_from(response))
    }

    /// A numeric response is taken as the rows-affected count; anything
    /// else counts the rows the response maps to.
    async fn execute_scalar(
        &self,
        config: &ExecutionConfig,
        params: &ParameterMap,
    ) -> Result<u64> {
        let url = Self::url_for(config)?;
        let response = self.transport.post_json(&url, &Self::body_for(params)).await?;
        if let Some(count) = response.as_u64() {
            return Ok(count);
        }
        Ok(Self::rows_from(response).len() as u64)
    }
}
