//! SearchService - client-facing start / status / cancel.
//!
//! Ids arrive as text from clients; anything that does not parse or is not
//! in the registry is [`ServiceError::TaskNotFound`], never a status value.

use serde::{Deserialize, Serialize};

use super::registry::{TaskCounts, TaskRegistry};
use super::runner::SearchRunner;
use crate::config::SearchDefaults;
use crate::domain::{SearchParams, ServiceError, TaskId, TaskStatus, TaskView};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartResponse {
    pub task_id: TaskId,
    pub status: TaskStatus,
}

/// Acknowledgement of a cancel request, with the status after it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelResponse {
    pub task_id: TaskId,
    pub status: TaskStatus,
}

#[derive(Clone)]
pub struct SearchService {
    runner: SearchRunner,
    defaults: SearchDefaults,
}

impl SearchService {
    pub fn new(runner: SearchRunner, defaults: SearchDefaults) -> Self {
        Self { runner, defaults }
    }

    /// Parameters for `gene_symbol` with the configured defaults filled in.
    pub fn params(&self, gene_symbol: impl Into<String>) -> SearchParams {
        SearchParams::new(gene_symbol)
            .with_max_results(self.defaults.default_max_results)
            .with_top_n(self.defaults.default_top_n)
    }

    pub fn registry(&self) -> &TaskRegistry {
        self.runner.registry()
    }

    pub async fn start(&self, params: SearchParams) -> Result<StartResponse, ServiceError> {
        let task_id = self.runner.start_search(params).await?;
        Ok(StartResponse {
            task_id,
            status: TaskStatus::Pending,
        })
    }

    pub async fn status(&self, task_id: &str) -> Result<TaskView, ServiceError> {
        let id = parse_id(task_id)?;
        self.registry()
            .get_task(id)
            .await
            .ok_or_else(|| ServiceError::TaskNotFound(task_id.to_string()))
    }

    pub async fn cancel(&self, task_id: &str) -> Result<CancelResponse, ServiceError> {
        let id = parse_id(task_id)?;
        if !self.registry().cancel_task(id).await {
            return Err(ServiceError::TaskNotFound(task_id.to_string()));
        }
        // reaped between the two calls: still acknowledged as cancelled
        let status = self
            .registry()
            .get_task(id)
            .await
            .map_or(TaskStatus::Cancelled, |view| view.status);
        Ok(CancelResponse { task_id: id, status })
    }

    pub async fn counts(&self) -> TaskCounts {
        self.registry().counts().await
    }
}

fn parse_id(task_id: &str) -> Result<TaskId, ServiceError> {
    task_id
        .parse()
        .map_err(|_| ServiceError::TaskNotFound(task_id.to_string()))
}
