//! Error types and their classification.

use thiserror::Error;

/// Failure of an external collaborator call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollaboratorError {
    /// Network or I/O failure talking to the service.
    #[error("transport error: {0}")]
    Transport(String),

    /// The service answered, but not in the expected shape.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// The service refused or is not configured.
    #[error("service unavailable: {0}")]
    Unavailable(String),
}

/// Failure of a whole search pipeline.
///
/// The `Display` text is what a client sees as the task's `error`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SearchError {
    #[error("invalid search parameters: {0}")]
    InvalidParams(String),

    #[error("cannot build a query for gene symbol {0:?}")]
    InvalidGene(String),

    #[error("literature search failed: {0}")]
    Search(#[source] CollaboratorError),

    #[error("metadata fetch failed: {0}")]
    Fetch(#[source] CollaboratorError),
}

/// Errors of the client-facing surface.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ServiceError {
    /// Unknown (or unparseable) task id. Never conflated with a task status.
    #[error("task {0} not found")]
    TaskNotFound(String),

    #[error(transparent)]
    Rejected(#[from] SearchError),
}
