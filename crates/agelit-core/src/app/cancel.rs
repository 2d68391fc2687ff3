//! CancellationToken - cooperative cancellation of one search.
//!
//! # Semantics
//! - Clones share one flag; it only ever goes from clear to set
//! - `cancel()` reports whether this call was the one that set it
//! - The pipeline reads the flag at its checkpoints and never blocks on it

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared cancel flag between one worker and any number of requesters.
///
/// Cloning shares the flag. Once set it stays set; there is no reset.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent. Returns `true` only for the call that flipped the flag.
    pub fn cancel(&self) -> bool {
        !self.cancelled.swap(true, Ordering::AcqRel)
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}
