//! Domain model (ids, statuses, records, papers, verdicts, findings).
//!
//! Nothing here knows about locking, spawning or collaborators.

pub mod errors;
pub mod finding;
pub mod ids;
pub mod paper;
pub mod progress;
pub mod query;
pub mod search;
pub mod state;
pub mod task;
pub mod verdict;

pub use errors::{CollaboratorError, SearchError, ServiceError};
pub use finding::Finding;
pub use ids::{ParseTaskIdError, TaskId};
pub use paper::PaperMetadata;
pub use progress::ProgressSnapshot;
pub use query::{QueryFilters, SearchQuery};
pub use search::SearchParams;
pub use state::TaskStatus;
pub use task::{TaskRecord, TaskView};
pub use verdict::{Associations, RawAssociations, RawVerdict, RelevanceVerdict};
