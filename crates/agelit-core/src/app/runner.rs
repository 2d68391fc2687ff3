//! SearchRunner - one spawned worker per search.
//!
//! # Flow
//! - validate params, register the task, spawn the orchestrator
//! - a supervisor awaits the worker and writes result, error or partial result
//! - a worker that dies without returning is recorded as failed

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::orchestrator::{SearchOrchestrator, SearchOutcome};
use super::registry::TaskRegistry;
use crate::domain::{SearchError, SearchParams, TaskId};

/// Error recorded when a worker dies without returning.
pub const WORKER_PANICKED: &str = "search worker panicked";

/// Launches searches and writes their outcome back into the registry.
#[derive(Clone)]
pub struct SearchRunner {
    registry: TaskRegistry,
    orchestrator: Arc<SearchOrchestrator>,
}

impl SearchRunner {
    pub fn new(registry: TaskRegistry, orchestrator: Arc<SearchOrchestrator>) -> Self {
        Self {
            registry,
            orchestrator,
        }
    }

    pub fn registry(&self) -> &TaskRegistry {
        &self.registry
    }

    /// Register a task and start its worker.
    ///
    /// The task is in the registry when this returns, so it can be polled
    /// right away. The pipeline itself runs on a spawned tokio task; this
    /// never waits for it. Out-of-range parameters are rejected before a task
    /// is created.
    pub async fn start_search(&self, params: SearchParams) -> Result<TaskId, SearchError> {
        params.validate()?;

        let (task_id, token, reporter) = self.registry.create_task().await;
        info!(%task_id, gene = %params.gene_symbol, "search started");

        let orchestrator = Arc::clone(&self.orchestrator);
        let worker =
            tokio::spawn(async move { orchestrator.run(&params, &token, &reporter).await });

        tokio::spawn(supervise(task_id, self.registry.clone(), worker));
        Ok(task_id)
    }
}

async fn supervise(
    task_id: TaskId,
    registry: TaskRegistry,
    worker: JoinHandle<Result<SearchOutcome, SearchError>>,
) {
    match worker.await {
        Ok(Ok(outcome)) => record_outcome(task_id, &registry, outcome).await,
        Ok(Err(err)) => {
            registry.set_error(task_id, err.to_string()).await;
        }
        Err(join_err) => {
            warn!(%task_id, error = %join_err, "search worker did not finish");
            registry.set_error(task_id, WORKER_PANICKED).await;
        }
    }
}

async fn record_outcome(task_id: TaskId, registry: &TaskRegistry, outcome: SearchOutcome) {
    if outcome.cancelled {
        registry
            .attach_partial_result(task_id, outcome.findings)
            .await;
        return;
    }
    // A cancel that landed after the last checkpoint has already made the
    // task terminal; keep the findings as its partial result.
    if !registry.set_result(task_id, outcome.findings.clone()).await {
        registry
            .attach_partial_result(task_id, outcome.findings)
            .await;
    }
}
