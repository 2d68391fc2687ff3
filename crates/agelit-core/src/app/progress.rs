//! ProgressReporter - progress snapshots bound to one task.
//!
//! # Semantics
//! - Each update replaces the previous snapshot
//! - Updates for terminal or evicted tasks are dropped silently

use tracing::trace;

use super::registry::TaskRegistry;
use crate::domain::{ProgressSnapshot, TaskId};

/// Writes progress snapshots for a single task into the registry.
#[derive(Clone)]
pub struct ProgressReporter {
    task_id: TaskId,
    registry: TaskRegistry,
}

impl ProgressReporter {
    pub(crate) fn new(task_id: TaskId, registry: TaskRegistry) -> Self {
        Self { task_id, registry }
    }

    pub fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Overwrite the task's snapshot and mark it running.
    ///
    /// A task that was reaped or already reached a terminal status is left
    /// alone; this never fails.
    pub async fn update(&self, snapshot: ProgressSnapshot) {
        trace!(
            task_id = %self.task_id,
            step = snapshot.step_number,
            processed = ?snapshot.items_processed,
            "progress"
        );
        self.registry.update_progress(self.task_id, snapshot).await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Duration;

    use crate::app::TaskRegistry;
    use crate::domain::{ProgressSnapshot, TaskStatus};
    use crate::ports::{SystemClock, UlidGenerator};

    fn registry() -> TaskRegistry {
        TaskRegistry::new(
            Arc::new(SystemClock),
            Arc::new(UlidGenerator::new(SystemClock)),
            Duration::hours(1),
        )
    }

    #[tokio::test]
    async fn update_overwrites_snapshot_and_marks_running() {
        let registry = registry();
        let (id, _, reporter) = registry.create_task().await;
        assert_eq!(reporter.task_id(), id);

        reporter.update(ProgressSnapshot::new("Searching", 2, 7)).await;
        reporter
            .update(ProgressSnapshot::new("Screening", 4, 7).with_items(1, 5))
            .await;

        let view = registry.get_task(id).await.unwrap();
        assert_eq!(view.status, TaskStatus::Running);
        let progress = view.progress.unwrap();
        assert_eq!(progress.step_number, 4);
        assert_eq!(progress.items_processed, Some(1));
    }

    #[tokio::test]
    async fn update_after_cancel_is_ignored() {
        let registry = registry();
        let (id, _, reporter) = registry.create_task().await;
        registry.cancel_task(id).await;

        reporter.update(ProgressSnapshot::new("Searching", 2, 7)).await;

        let view = registry.get_task(id).await.unwrap();
        assert_eq!(view.status, TaskStatus::Cancelled);
        assert!(view.progress.is_none());
    }

    #[tokio::test]
    async fn update_for_reaped_task_is_silent() {
        let registry = TaskRegistry::new(
            Arc::new(SystemClock),
            Arc::new(UlidGenerator::new(SystemClock)),
            Duration::zero(),
        );
        let (id, _, reporter) = registry.create_task().await;
        registry.set_error(id, "gone").await;
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        assert_eq!(registry.reap_expired().await, 1);

        reporter.update(ProgressSnapshot::new("Screening", 4, 7)).await;
        assert!(registry.get_task(id).await.is_none());
    }
}
