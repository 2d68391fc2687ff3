//! LiteratureSearch port - the bibliographic source (PubMed or a local corpus).
//!
//! # Implementations
//! - **InMemoryCorpus**: JSON file of papers, in `impls`

use async_trait::async_trait;

use crate::domain::{CollaboratorError, PaperMetadata, SearchQuery};

/// Search and metadata fetch against a literature source.
///
/// # Contract
/// - `search` returns at most `max_results` ids in source-defined relevance
///   order; an empty list is a valid answer.
/// - `fetch` returns one record per known id, in request order. Records with
///   a missing abstract or keywords come back with empty defaults. Callers
///   batch their requests; implementations need not.
#[async_trait]
pub trait LiteratureSearch: Send + Sync {
    async fn search(
        &self,
        query: &SearchQuery,
        max_results: usize,
    ) -> Result<Vec<String>, CollaboratorError>;

    async fn fetch(&self, ids: &[String]) -> Result<Vec<PaperMetadata>, CollaboratorError>;
}
