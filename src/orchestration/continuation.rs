//! Continuation chain traversal.
//!
//! A chain run executes the named service, records the hop, then follows
//! every continuation mapping declared for its configuration: the parent
//! result's fields are mapped into the target's parameters and the engine
//! recurses. Multi-row results fan out one branch per row × mapping, with
//! bounded concurrency and an independent visited set per branch for cycle
//! detection.
//!
//! Exactly two conditions end a branch quietly with the parent's result:
//! a continuation target that no longer resolves, and a cycle. Everything
//! else propagates.

use crate::error::{RelayError, Result};
use crate::execution::{ExecutionOutcome, ParameterMap, ResultRow};
use crate::models::{ContinuationMapping, ExecutionConfig};
use crate::orchestration::audit::AuditTrail;
use crate::orchestration::dispatcher::Dispatcher;
use crate::orchestration::field_mapping::FieldMapping;
use crate::resilience::ResilienceLayer;
use crate::store::ConfigurationStore;
use futures::future::BoxFuture;
use futures::StreamExt;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

pub struct ChainEngine {
    store: Arc<dyn ConfigurationStore>,
    dispatcher: Arc<Dispatcher>,
    resilience: Arc<ResilienceLayer>,
    audit: AuditTrail,
    fan_out_limit: usize,
}

/// What one continuation branch produced. `Skipped` covers the two
/// swallowed conditions (missing target, cycle).
enum BranchOutcome {
    Completed(ExecutionOutcome),
    Skipped,
}

impl ChainEngine {
    pub fn new(
        store: Arc<dyn ConfigurationStore>,
        dispatcher: Arc<Dispatcher>,
        resilience: Arc<ResilienceLayer>,
        audit: AuditTrail,
        fan_out_limit: usize,
    ) -> Self {
        Self {
            store,
            dispatcher,
            resilience,
            audit,
            fan_out_limit: fan_out_limit.max(1),
        }
    }

    /// Run the full continuation chain rooted at `service_name`.
    pub async fn run_chain(
        &self,
        service_name: &str,
        params: ParameterMap,
    ) -> Result<ExecutionOutcome> {
        let correlation_id = Uuid::new_v4();
        let span = info_span!("chain_run", service = service_name, %correlation_id);

        let mut visited = HashSet::new();
        visited.insert(service_name.to_string());

        self.run_hop(service_name.to_string(), params, None, visited)
            .instrument(span)
            .await
    }

    /// One hop: execute, audit, continue. Boxed because the continuation
    /// recursion flows back through here.
    fn run_hop(
        &self,
        service_name: String,
        params: ParameterMap,
        triggered_by: Option<i64>,
        visited: HashSet<String>,
    ) -> BoxFuture<'_, Result<ExecutionOutcome>> {
        Box::pin(async move {
            let (_, config) = self.dispatcher.resolve(&service_name).await?;
            let policy = self.resilience.policy_for(&config);
            let backend = config.backend_key();

            let started = Instant::now();
            let result = self
                .resilience
                .execute(&backend, &policy, || {
                    self.dispatcher.execute_resolved(&config, &params)
                })
                .await;
            let duration_seconds = started.elapsed().as_secs_f64();

            match result {
                Ok(outcome) => {
                    info!(
                        service = %service_name,
                        config_id = config.id,
                        rows = outcome.row_count(),
                        duration_seconds,
                        "hop completed"
                    );

                    let mut trigger_id = triggered_by;
                    if config.record_executions {
                        let record = self
                            .audit
                            .record_success(&config, &params, &outcome, duration_seconds, triggered_by)
                            .await?;
                        trigger_id = Some(record.id);
                    }

                    self.continue_chain(&service_name, &config, outcome, trigger_id, visited)
                        .await
                }
                Err(failure) => {
                    warn!(
                        service = %service_name,
                        config_id = config.id,
                        duration_seconds,
                        error = %failure,
                        "hop failed"
                    );
                    if config.record_executions {
                        // The failed hop is persisted before the error
                        // propagates; an audit failure must not mask it.
                        if let Err(audit_error) = self
                            .audit
                            .record_failure(
                                &config,
                                &params,
                                &failure.to_string(),
                                duration_seconds,
                                triggered_by,
                            )
                            .await
                        {
                            error!(
                                config_id = config.id,
                                error = %audit_error,
                                "failed to record failed execution"
                            );
                        }
                    }
                    Err(failure)
                }
            }
        })
    }

    /// Follow the continuations declared for `config`, if any.
    async fn continue_chain(
        &self,
        service_name: &str,
        config: &ExecutionConfig,
        outcome: ExecutionOutcome,
        trigger_id: Option<i64>,
        visited: HashSet<String>,
    ) -> Result<ExecutionOutcome> {
        if !config.has_continuation {
            return Ok(outcome);
        }

        let mappings = self.store.continuations_by_config(config.id).await?;
        if mappings.is_empty() {
            return Ok(outcome);
        }

        // A multi-row result fans out one derivation scope per row; a
        // scalar result continues once, deriving from a synthetic row.
        let scopes: Vec<Option<ResultRow>> = match &outcome {
            ExecutionOutcome::Rows(rows) => rows.iter().cloned().map(Some).collect(),
            ExecutionOutcome::RowsAffected(count) => {
                let mut row = ResultRow::new();
                row.insert("rowsAffected".to_string(), serde_json::json!(count));
                vec![Some(row)]
            }
        };

        let mut branches = Vec::new();
        for scope in &scopes {
            for mapping in &mappings {
                branches.push((scope.clone(), mapping.clone()));
            }
        }
        if branches.is_empty() {
            return Ok(outcome);
        }
        let single_branch = branches.len() == 1;

        let mut results: Vec<Result<BranchOutcome>> = futures::stream::iter(
            branches.into_iter().map(|(scope, mapping)| {
                let visited = visited.clone();
                async move { self.run_branch(scope, mapping, trigger_id, visited).await }
            }),
        )
        .buffer_unordered(self.fan_out_limit)
        .collect()
        .await;

        if single_branch {
            // A linear chain returns the last hop's outcome and re-raises
            // its failure to this hop's caller.
            return match results.pop() {
                Some(Ok(BranchOutcome::Completed(child))) => Ok(child),
                Some(Err(failure)) => Err(failure),
                Some(Ok(BranchOutcome::Skipped)) | None => Ok(outcome),
            };
        }

        // Fan-out: a failed branch aborts only itself; siblings ran
        // independently, so this hop reports its own outcome.
        let failed = results.iter().filter(|r| r.is_err()).count();
        for failure in results.into_iter().filter_map(Result::err) {
            error!(
                service = %service_name,
                config_id = config.id,
                error = %failure,
                "continuation branch failed"
            );
        }
        if failed > 0 {
            warn!(
                service = %service_name,
                failed,
                "continuation fan-out completed with failed branches"
            );
        }
        Ok(outcome)
    }

    /// One continuation branch: resolve the target, check for cycles,
    /// derive parameters and recurse.
    async fn run_branch(
        &self,
        scope: Option<ResultRow>,
        mapping: ContinuationMapping,
        trigger_id: Option<i64>,
        mut visited: HashSet<String>,
    ) -> Result<BranchOutcome> {
        let target_config = match self.store.config_by_id(mapping.target_config_id).await {
            Ok(config) => config,
            Err(RelayError::NotFound(_)) => {
                warn!(
                    mapping_id = mapping.id,
                    target_config_id = mapping.target_config_id,
                    "continuation target config not found, skipping mapping"
                );
                return Ok(BranchOutcome::Skipped);
            }
            Err(failure) => return Err(failure),
        };

        let target_service = match self.store.service_by_id(target_config.service_id).await {
            Ok(service) => service,
            Err(RelayError::NotFound(_)) => {
                warn!(
                    mapping_id = mapping.id,
                    service_id = target_config.service_id,
                    "continuation target service not found, skipping mapping"
                );
                return Ok(BranchOutcome::Skipped);
            }
            Err(failure) => return Err(failure),
        };

        if visited.contains(&target_service.name) {
            warn!(
                service = %target_service.name,
                mapping_id = mapping.id,
                "continuation cycle detected, stopping branch"
            );
            return Ok(BranchOutcome::Skipped);
        }

        let next_params = FieldMapping::parse(&mapping.mapping)?.derive(scope.as_ref());
        visited.insert(target_service.name.clone());

        match self
            .run_hop(target_service.name.clone(), next_params, trigger_id, visited)
            .await
        {
            Ok(child_outcome) => Ok(BranchOutcome::Completed(child_outcome)),
            Err(failure) => Err(RelayError::ChainAborted {
                service: target_service.name,
                message: failure.to_string(),
            }),
        }
    }
}
