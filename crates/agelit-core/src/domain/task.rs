//! Task record: lifecycle state of one search.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::finding::Finding;
use super::ids::TaskId;
use super::progress::ProgressSnapshot;
use super::state::TaskStatus;

/// State of one task in the registry.
///
/// Design:
/// - This is the single source of truth for a task's lifecycle.
/// - All transitions go through methods; each returns whether it applied.
/// - The first terminal write wins. After that, `updated_at` is frozen.
#[derive(Debug, Clone)]
pub struct TaskRecord {
    pub task_id: TaskId,
    pub status: TaskStatus,
    pub progress: Option<ProgressSnapshot>,
    pub result: Option<Vec<Finding>>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TaskRecord {
    pub fn new(task_id: TaskId, now: DateTime<Utc>) -> Self {
        Self {
            task_id,
            status: TaskStatus::Pending,
            progress: None,
            result: None,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn transition(&mut self, next: TaskStatus, now: DateTime<Utc>) -> bool {
        if !self.status.can_transition_to(next) {
            return false;
        }
        self.status = next;
        self.updated_at = now;
        true
    }

    /// Replace the progress snapshot and mark the task running.
    pub fn record_progress(&mut self, progress: ProgressSnapshot, now: DateTime<Utc>) -> bool {
        if !self.transition(TaskStatus::Running, now) {
            return false;
        }
        self.progress = Some(progress);
        true
    }

    /// Move to a status that carries no payload.
    ///
    /// `Completed` and `Failed` are refused here: they are reached through
    /// [`complete`](Self::complete) and [`fail`](Self::fail) so that result
    /// and error stay in step with the status.
    pub fn set_status(&mut self, status: TaskStatus, now: DateTime<Utc>) -> bool {
        match status {
            TaskStatus::Completed | TaskStatus::Failed => false,
            other => self.transition(other, now),
        }
    }

    pub fn complete(&mut self, result: Vec<Finding>, now: DateTime<Utc>) -> bool {
        if !self.transition(TaskStatus::Completed, now) {
            return false;
        }
        self.result = Some(result);
        true
    }

    pub fn fail(&mut self, error: String, now: DateTime<Utc>) -> bool {
        if !self.transition(TaskStatus::Failed, now) {
            return false;
        }
        self.error = Some(error);
        true
    }

    pub fn cancel(&mut self, now: DateTime<Utc>) -> bool {
        self.transition(TaskStatus::Cancelled, now)
    }

    /// Store whatever the worker gathered before it noticed cancellation.
    ///
    /// Only a cancelled task without a result accepts this; `updated_at` is
    /// left untouched.
    pub fn attach_partial_result(&mut self, result: Vec<Finding>) -> bool {
        if self.status != TaskStatus::Cancelled || self.result.is_some() {
            return false;
        }
        self.result = Some(result);
        true
    }

    /// Terminal and last touched strictly before `cutoff`.
    pub fn is_expired(&self, cutoff: DateTime<Utc>) -> bool {
        self.status.is_terminal() && self.updated_at < cutoff
    }

    pub fn view(&self) -> TaskView {
        TaskView {
            task_id: self.task_id,
            status: self.status,
            progress: self.progress.clone(),
            result: self.result.clone(),
            error: self.error.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Point-in-time, serializable snapshot of a task for clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskView {
    pub task_id: TaskId,
    pub status: TaskStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<ProgressSnapshot>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Vec<Finding>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
