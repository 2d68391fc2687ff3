//! App - the search application layer.
//!
//! # Components
//! - **TaskRegistry**: in-memory task map, the only shared mutable state
//! - **CancellationToken** / **ProgressReporter**: per-task handles given to a worker
//! - **ReaperLoop**: periodic eviction of old terminal tasks
//! - **SearchOrchestrator**: the seven-stage pipeline
//! - **SearchRunner**: spawns one worker per search and records its outcome
//! - **SearchService**: start / status / cancel for clients
//! - **AppBuilder**: wiring and fail-fast validation

pub mod builder;
pub mod cancel;
pub mod orchestrator;
pub mod progress;
pub mod reaper_loop;
pub mod registry;
pub mod runner;
pub mod service;

#[cfg(test)]
pub(crate) mod testing;

pub use self::builder::{App, AppBuilder, BuildError};
pub use self::cancel::CancellationToken;
pub use self::orchestrator::{
    SCORER_PANICKED, SearchOrchestrator, SearchOutcome, Stage, TOTAL_STEPS,
};
pub use self::progress::ProgressReporter;
pub use self::reaper_loop::{ReaperHandle, ReaperLoop};
pub use self::registry::{TaskCounts, TaskRegistry};
pub use self::runner::{SearchRunner, WORKER_PANICKED};
pub use self::service::{CancelResponse, SearchService, StartResponse};
