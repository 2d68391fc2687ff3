//! Progress snapshots reported by a running search.

use serde::{Deserialize, Serialize};

/// Structured progress of one task. Replaced wholesale on every update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub current_step: String,
    pub step_number: u32,
    pub total_steps: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items_processed: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items_total: Option<usize>,

    #[serde(default)]
    pub message: String,
}

impl ProgressSnapshot {
    pub fn new(current_step: impl Into<String>, step_number: u32, total_steps: u32) -> Self {
        Self {
            current_step: current_step.into(),
            step_number,
            total_steps,
            items_processed: None,
            items_total: None,
            message: String::new(),
        }
    }

    pub fn with_items(mut self, processed: usize, total: usize) -> Self {
        self.items_processed = Some(processed);
        self.items_total = Some(total);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }
}
