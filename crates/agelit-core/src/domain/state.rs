//! Task status state machine.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle status of a search task.
///
/// State transitions:
/// - Pending -> Running -> Completed
/// - Pending -> Running -> Failed
/// - Pending | Running -> Cancelled
///
/// A task may also jump straight from Pending to a terminal status (cancelled
/// before its worker reported anything, or failed before the first progress
/// update). Terminal statuses never change again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Created, worker not yet reporting.
    Pending,

    /// Worker has reported progress at least once.
    Running,

    /// Pipeline finished; result is present.
    Completed,

    /// Cancel was requested.
    Cancelled,

    /// Pipeline aborted; error is present.
    Failed,
}

impl TaskStatus {
    /// Is this a terminal status (no further transitions)?
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TaskStatus::Completed | TaskStatus::Cancelled | TaskStatus::Failed
        )
    }

    /// Whether moving from `self` to `next` is a legal transition.
    ///
    /// Re-entering the current non-terminal status is allowed (repeated
    /// progress updates keep a task `Running`).
    pub fn can_transition_to(self, next: TaskStatus) -> bool {
        match (self, next) {
            (from, _) if from.is_terminal() => false,
            (TaskStatus::Running, TaskStatus::Pending) => false,
            _ => true,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Running => "running",
            TaskStatus::Completed => "completed",
            TaskStatus::Cancelled => "cancelled",
            TaskStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
