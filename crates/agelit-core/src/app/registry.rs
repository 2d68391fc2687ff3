//! TaskRegistry - in-memory task map.
//!
//! One map guarded by one `tokio::sync::Mutex`. Every operation locks, does
//! O(1) work on a single entry and unlocks; nothing awaits while holding the
//! lock except the lock itself.
//!
//! # Invariants
//! - A terminal status is written once; later terminal writes are refused
//! - `reap_expired` never removes a pending or running task

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Duration;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::cancel::CancellationToken;
use super::progress::ProgressReporter;
use crate::domain::{Finding, ProgressSnapshot, TaskId, TaskRecord, TaskStatus, TaskView};
use crate::ports::{Clock, IdGenerator};

struct TaskEntry {
    record: TaskRecord,
    token: CancellationToken,
}

/// Per-status task counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskCounts {
    pub pending: usize,
    pub running: usize,
    pub completed: usize,
    pub cancelled: usize,
    pub failed: usize,
}

impl TaskCounts {
    pub fn total(&self) -> usize {
        self.pending + self.running + self.completed + self.cancelled + self.failed
    }
}

/// Registry of search tasks. Cheap to clone; clones share the same map.
#[derive(Clone)]
pub struct TaskRegistry {
    tasks: Arc<Mutex<HashMap<TaskId, TaskEntry>>>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
    retention: Duration,
}

impl TaskRegistry {
    pub fn new(clock: Arc<dyn Clock>, ids: Arc<dyn IdGenerator>, retention: Duration) -> Self {
        Self {
            tasks: Arc::new(Mutex::new(HashMap::new())),
            clock,
            ids,
            retention,
        }
    }

    pub fn retention(&self) -> Duration {
        self.retention
    }

    /// Insert a pending task and hand back its token and reporter.
    pub async fn create_task(&self) -> (TaskId, CancellationToken, ProgressReporter) {
        let task_id = self.ids.generate_task_id();
        let token = CancellationToken::new();
        let record = TaskRecord::new(task_id, self.clock.now());

        self.tasks.lock().await.insert(
            task_id,
            TaskEntry {
                record,
                token: token.clone(),
            },
        );
        info!(%task_id, "task created");

        (task_id, token, ProgressReporter::new(task_id, self.clone()))
    }

    /// Point-in-time copy of a task, or `None` if the id is unknown.
    pub async fn get_task(&self, task_id: TaskId) -> Option<TaskView> {
        let tasks = self.tasks.lock().await;
        tasks.get(&task_id).map(|entry| entry.record.view())
    }

    /// Move to a payload-free status. Returns whether the change applied.
    pub async fn update_status(&self, task_id: TaskId, status: TaskStatus) -> bool {
        let now = self.clock.now();
        self.with_record(task_id, |record| record.set_status(status, now))
            .await
    }

    /// Replace the progress snapshot; marks the task running.
    ///
    /// Ignored for unknown and terminal tasks.
    pub async fn update_progress(&self, task_id: TaskId, progress: ProgressSnapshot) -> bool {
        let now = self.clock.now();
        self.with_record(task_id, |record| record.record_progress(progress, now))
            .await
    }

    pub async fn set_result(&self, task_id: TaskId, result: Vec<Finding>) -> bool {
        let now = self.clock.now();
        let count = result.len();
        let applied = self
            .with_record(task_id, |record| record.complete(result, now))
            .await;
        if applied {
            info!(%task_id, findings = count, "task completed");
        } else {
            debug!(%task_id, "result not recorded; task absent or already terminal");
        }
        applied
    }

    pub async fn set_error(&self, task_id: TaskId, message: impl Into<String>) -> bool {
        let now = self.clock.now();
        let message = message.into();
        let applied = self
            .with_record(task_id, |record| record.fail(message.clone(), now))
            .await;
        if applied {
            info!(%task_id, error = %message, "task failed");
        } else {
            debug!(%task_id, "error not recorded; task absent or already terminal");
        }
        applied
    }

    /// Store findings gathered before a cancellation was observed.
    pub async fn attach_partial_result(&self, task_id: TaskId, result: Vec<Finding>) -> bool {
        let count = result.len();
        let applied = self
            .with_record(task_id, |record| record.attach_partial_result(result))
            .await;
        if applied {
            info!(%task_id, findings = count, "partial result kept on cancelled task");
        }
        applied
    }

    /// Request cancellation. Returns whether the task exists.
    ///
    /// The token is flipped and a non-terminal task is marked cancelled
    /// immediately; a terminal task is left as it is.
    pub async fn cancel_task(&self, task_id: TaskId) -> bool {
        let now = self.clock.now();
        let mut tasks = self.tasks.lock().await;
        let Some(entry) = tasks.get_mut(&task_id) else {
            return false;
        };
        entry.token.cancel();
        if entry.record.cancel(now) {
            info!(%task_id, "task cancelled");
        }
        true
    }

    /// Evict terminal tasks last touched before `now - retention`.
    pub async fn reap_expired(&self) -> usize {
        let Some(cutoff) = self.clock.now().checked_sub_signed(self.retention) else {
            return 0;
        };
        let mut tasks = self.tasks.lock().await;
        let before = tasks.len();
        tasks.retain(|_, entry| !entry.record.is_expired(cutoff));
        before - tasks.len()
    }

    pub async fn counts(&self) -> TaskCounts {
        let tasks = self.tasks.lock().await;
        let mut counts = TaskCounts::default();
        for entry in tasks.values() {
            match entry.record.status {
                TaskStatus::Pending => counts.pending += 1,
                TaskStatus::Running => counts.running += 1,
                TaskStatus::Completed => counts.completed += 1,
                TaskStatus::Cancelled => counts.cancelled += 1,
                TaskStatus::Failed => counts.failed += 1,
            }
        }
        counts
    }

    async fn with_record<F>(&self, task_id: TaskId, f: F) -> bool
    where
        F: FnOnce(&mut TaskRecord) -> bool,
    {
        let mut tasks = self.tasks.lock().await;
        tasks
            .get_mut(&task_id)
            .map(|entry| f(&mut entry.record))
            .unwrap_or(false)
    }
}
